use basalt_world::World;
use std::collections::HashSet;

/// Chunks to send and to forget after the view moved.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ViewChange {
    /// Nearest first.
    pub load: Vec<(i32, i32)>,
    pub unload: Vec<(i32, i32)>,
}

impl ViewChange {
    pub fn is_empty(&self) -> bool {
        self.load.is_empty() && self.unload.is_empty()
    }
}

/// The chunk columns a client currently holds.
#[derive(Debug)]
pub struct ChunkView {
    center: Option<(i32, i32)>,
    distance: i32,
    loaded: HashSet<(i32, i32)>,
}

impl ChunkView {
    pub fn new(distance: u8) -> Self {
        Self {
            center: None,
            distance: distance as i32,
            loaded: HashSet::new(),
        }
    }

    pub fn center(&self) -> Option<(i32, i32)> {
        self.center
    }

    pub fn distance(&self) -> i32 {
        self.distance
    }

    pub fn is_loaded(&self, chunk: (i32, i32)) -> bool {
        self.loaded.contains(&chunk)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Returns whether the distance changed.
    pub fn set_distance(&mut self, distance: u8) -> bool {
        let distance = distance as i32;
        if distance == self.distance {
            return false;
        }
        self.distance = distance;
        true
    }

    /// Recentres the view and records the chunks that entered and left it.
    pub fn move_to(&mut self, center: (i32, i32)) -> ViewChange {
        self.center = Some(center);
        let wanted = World::chunks_in_view(center, self.distance);

        let mut unload: Vec<(i32, i32)> = self
            .loaded
            .iter()
            .filter(|(x, z)| {
                (x - center.0).abs() > self.distance || (z - center.1).abs() > self.distance
            })
            .copied()
            .collect();
        unload.sort_unstable();
        for chunk in &unload {
            self.loaded.remove(chunk);
        }

        let load: Vec<(i32, i32)> = wanted
            .into_iter()
            .filter(|chunk| self.loaded.insert(*chunk))
            .collect();

        ViewChange { load, unload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_loads_everything() {
        let mut view = ChunkView::new(2);
        assert_eq!(view.center(), None);
        let change = view.move_to((0, 0));
        assert_eq!(change.load.len(), 25);
        assert_eq!(change.load[0], (0, 0));
        assert!(change.unload.is_empty());
        assert_eq!(view.loaded_count(), 25);
    }

    #[test]
    fn test_step_loads_one_row() {
        let mut view = ChunkView::new(2);
        view.move_to((0, 0));
        let change = view.move_to((1, 0));
        assert_eq!(change.load.len(), 5);
        assert!(change.load.iter().all(|(x, _)| *x == 3));
        assert_eq!(change.unload, vec![(-2, -2), (-2, -1), (-2, 0), (-2, 1), (-2, 2)]);
        assert_eq!(view.loaded_count(), 25);
        assert!(!view.is_loaded((-2, 0)));
    }

    #[test]
    fn test_same_center_is_empty() {
        let mut view = ChunkView::new(3);
        view.move_to((5, -5));
        assert!(view.move_to((5, -5)).is_empty());
    }

    #[test]
    fn test_shrinking_distance_unloads_ring() {
        let mut view = ChunkView::new(3);
        view.move_to((0, 0));
        assert!(view.set_distance(2));
        assert!(!view.set_distance(2));
        let change = view.move_to((0, 0));
        assert!(change.load.is_empty());
        assert_eq!(change.unload.len(), 49 - 25);
    }
}
