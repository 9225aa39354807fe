//! Named Binary Tag encoding, as embedded in Join Game and Chunk Data packets.

mod compound;
mod tag;

pub use compound::Compound;
pub use tag::{Tag, MAX_DEPTH};

use std::io::Write;

use basalt_common::Result;

/// Encodes `root` as a named root compound.
pub fn to_bytes(name: &str, root: &Compound) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_root(&mut bytes, name, root)?;
    Ok(bytes)
}

pub fn write_root<W: Write>(writer: &mut W, name: &str, root: &Compound) -> Result<()> {
    Tag::Compound(root.clone()).write_named(writer, name)
}
