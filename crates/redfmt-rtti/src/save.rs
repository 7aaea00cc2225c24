//! Save game block lists.
//!
//! Save blocks that hold a variable number of sub-blocks store a `u32` count
//! followed by the sub-blocks back to back. The block catalog is left to the
//! caller through [`SaveBlock`].

use redfmt_common::BinaryReader;
use tracing::trace;

use crate::{Result, SerializationContext, StringTable, TypedClass};

/// A block that can appear in a save block list.
pub trait SaveBlock: Sized {
    /// Name of the block, used in diagnostics.
    const BLOCK_NAME: &'static str;

    /// Read one block.
    fn read_block(
        reader: &mut BinaryReader<'_>,
        strings: &dyn StringTable,
        context: &SerializationContext,
    ) -> Result<Self>;
}

/// Read a counted list of blocks.
pub fn read_block_list<B: SaveBlock>(
    reader: &mut BinaryReader<'_>,
    strings: &dyn StringTable,
    context: &SerializationContext,
) -> Result<Vec<B>> {
    let count = reader.read_u32()?;
    trace!(block = B::BLOCK_NAME, count, "reading block list");

    let mut blocks = Vec::with_capacity((count as usize).min(reader.remaining()));
    for _ in 0..count {
        blocks.push(B::read_block(reader, strings, context)?);
    }
    Ok(blocks)
}

/// A block that is a single property stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectBlock<T>(pub T);

impl<T: TypedClass + Default> SaveBlock for ObjectBlock<T> {
    const BLOCK_NAME: &'static str = T::TYPE_NAME;

    fn read_block(
        reader: &mut BinaryReader<'_>,
        strings: &dyn StringTable,
        context: &SerializationContext,
    ) -> Result<Self> {
        context.decode_new(reader, strings).map(ObjectBlock)
    }
}
