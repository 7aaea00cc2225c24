//! Property chunk framing.
//!
//! A property stream is a sequence of chunks, each a 10-byte header followed
//! by its payload, ended by a lone `name_id` of zero:
//!
//! | Field      | Type  | Notes                                  |
//! |------------|-------|----------------------------------------|
//! | `name_id`  | `i16` | String index of the property name      |
//! | `type_id`  | `i16` | String index of the property type name |
//! | `reserved` | `i16` | Always `-1`                            |
//! | `size`     | `u32` | Payload length plus 4                  |

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use redfmt_common::BinaryReader;

use crate::{Error, Result};

/// `name_id` value that ends a property stream.
pub const TERMINATOR: i16 = 0;

/// Required value of the header's reserved field.
pub const RESERVED: i16 = -1;

/// The `size` field counts itself.
const SIZE_FIELD_LEN: u32 = 4;

/// A validated chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub name_id: i16,
    pub type_id: i16,
    pub size: u32,
}

impl ChunkHeader {
    /// Number of payload bytes following the header.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.size.saturating_sub(SIZE_FIELD_LEN) as usize
    }

    /// Read the reserved and size fields that follow the two indices.
    ///
    /// Fails before touching the payload when either field is invalid.
    pub(crate) fn read_rest(
        reader: &mut BinaryReader<'_>,
        name_id: i16,
        type_id: i16,
    ) -> Result<Self> {
        let reserved = reader.read_i16()?;
        if reserved != RESERVED {
            return Err(Error::MalformedChunk { name_id, reserved });
        }

        let size = reader.read_u32()?;
        if size < SIZE_FIELD_LEN {
            return Err(Error::MalformedSize { name_id, size });
        }

        Ok(Self {
            name_id,
            type_id,
            size,
        })
    }
}

/// One chunk of a property stream, borrowing its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChunk<'a> {
    pub header: ChunkHeader,
    pub payload: &'a [u8],
}

impl<'a> PropertyChunk<'a> {
    /// Read the next chunk, or `None` at the terminator.
    ///
    /// Names are not resolved; use this to walk a stream without a target type.
    pub fn read(reader: &mut BinaryReader<'a>) -> Result<Option<Self>> {
        let name_id = reader.read_i16()?;
        if name_id == TERMINATOR {
            return Ok(None);
        }

        let type_id = reader.read_i16()?;
        let header = ChunkHeader::read_rest(reader, name_id, type_id)?;
        let payload = reader.read_bytes(header.payload_len())?;

        Ok(Some(Self { header, payload }))
    }

    /// Write a chunk with the given indices and payload.
    pub fn write<W: Write>(
        writer: &mut W,
        name_id: i16,
        type_id: i16,
        payload: &[u8],
    ) -> Result<()> {
        let size = u32::try_from(payload.len())
            .ok()
            .and_then(|len| len.checked_add(SIZE_FIELD_LEN))
            .ok_or(Error::PayloadTooLarge(payload.len()))?;

        writer.write_i16::<LittleEndian>(name_id)?;
        writer.write_i16::<LittleEndian>(type_id)?;
        writer.write_i16::<LittleEndian>(RESERVED)?;
        writer.write_u32::<LittleEndian>(size)?;
        writer.write_all(payload)?;
        Ok(())
    }

    /// Write the stream terminator.
    pub fn write_terminator<W: Write>(writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(TERMINATOR)?;
        Ok(())
    }
}
