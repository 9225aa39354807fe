//! Registry data sent in Join Game: one overworld dimension type and the
//! biomes the world generator uses.

use basalt_nbt::{Compound, Tag};

pub const OVERWORLD: &str = "minecraft:overworld";

/// Dimension type element for a world of `height` blocks starting at `min_y`.
pub fn overworld(min_y: i32, height: u32) -> Compound {
    Compound::new()
        .with("piglin_safe", false)
        .with("natural", true)
        .with("ambient_light", 0.0f32)
        .with("infiniburn", "#minecraft:infiniburn_overworld")
        .with("respawn_anchor_works", false)
        .with("has_skylight", true)
        .with("bed_works", true)
        .with("effects", OVERWORLD)
        .with("has_raids", true)
        .with("min_y", min_y)
        .with("height", height as i32)
        .with("logical_height", height as i32)
        .with("coordinate_scale", 1.0f64)
        .with("ultrawarm", false)
        .with("has_ceiling", false)
}

fn registry_entry(name: &str, id: i32, element: Compound) -> Tag {
    Compound::new()
        .with("name", name)
        .with("id", id)
        .with("element", element)
        .into()
}

fn biome(category: &str, precipitation: &str, temperature: f32, downfall: f32, sky: i32) -> Compound {
    let mood_sound = Compound::new()
        .with("tick_delay", 6000)
        .with("offset", 2.0f64)
        .with("sound", "minecraft:ambient.cave")
        .with("block_search_extent", 8);
    let effects = Compound::new()
        .with("sky_color", sky)
        .with("water_fog_color", 329011)
        .with("fog_color", 12638463)
        .with("water_color", 4159204)
        .with("mood_sound", mood_sound);
    Compound::new()
        .with("precipitation", precipitation)
        .with("temperature", temperature)
        .with("downfall", downfall)
        .with("category", category)
        .with("effects", effects)
}

/// The full dimension codec. Biome ids match `basalt_world::block`.
pub fn dimension_codec(min_y: i32, height: u32) -> Compound {
    let dimension_types = Compound::new()
        .with("type", "minecraft:dimension_type")
        .with(
            "value",
            vec![registry_entry(OVERWORLD, 0, overworld(min_y, height))],
        );
    let biomes = Compound::new()
        .with("type", "minecraft:worldgen/biome")
        .with(
            "value",
            vec![
                registry_entry(
                    "minecraft:the_void",
                    basalt_world::block::BIOME_THE_VOID as i32,
                    biome("none", "none", 0.5, 0.5, 8103167),
                ),
                registry_entry(
                    "minecraft:plains",
                    basalt_world::block::BIOME_PLAINS as i32,
                    biome("plains", "rain", 0.8, 0.4, 7907327),
                ),
            ],
        );
    Compound::new()
        .with("minecraft:dimension_type", dimension_types)
        .with("minecraft:worldgen/biome", biomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_registries() {
        let codec = dimension_codec(0, 256);
        let biomes = codec
            .get("minecraft:worldgen/biome")
            .and_then(Tag::as_compound)
            .and_then(|registry| registry.get("value"))
            .and_then(Tag::as_list)
            .unwrap();
        let names: Vec<&str> = biomes
            .iter()
            .filter_map(|entry| entry.as_compound()?.get("name")?.as_str())
            .collect();
        assert_eq!(names, vec!["minecraft:the_void", "minecraft:plains"]);

        let overworld = codec
            .get("minecraft:dimension_type")
            .and_then(Tag::as_compound)
            .and_then(|registry| registry.get("value"))
            .and_then(Tag::as_list)
            .and_then(|entries| entries[0].as_compound())
            .and_then(|entry| entry.get("element"))
            .and_then(Tag::as_compound)
            .unwrap();
        assert_eq!(overworld.get("height").and_then(Tag::as_i32), Some(256));
        assert_eq!(overworld.get("min_y").and_then(Tag::as_i32), Some(0));
    }
}
