//! LZF block codec for packed resources.
//!
//! Resource blobs stored in pack archives are compressed with a small,
//! very fast LZ77 variant (LZF). A compressed block is a plain sequence of
//! literal runs and back-references: it carries no length header and no
//! checksum, so the decompressed size must be known from the container.
//!
//! # Stream format
//!
//! | Control byte | Meaning |
//! |--------------|---------|
//! | `000LLLLL` | literal run of `L + 1` bytes (1..=32), copied verbatim |
//! | `LLLOOOOO` + `oooooooo` | match of `L + 2` bytes, `L` in 1..=6 |
//! | `111OOOOO` + `eeeeeeee` + `oooooooo` | match of `e + 9` bytes |
//!
//! The 13-bit offset `OOOOOoooooooo` counts backwards from the byte before
//! the current output position, so offset `0` repeats the previous byte.
//!
//! # Example
//!
//! ```
//! use redfmt_lzf::{decompress, Compressor};
//!
//! let input = b"abcabcabcabcabcabcabcabcabcabc";
//! let mut compressor = Compressor::new();
//!
//! let mut output = vec![0u8; input.len()];
//! match compressor.compress(input, &mut output) {
//!     Ok(len) => {
//!         let restored = decompress(&output[..len], input.len())?;
//!         assert_eq!(restored, input);
//!     }
//!     Err(e) if e.is_insufficient_capacity() => {
//!         // Store the block uncompressed instead.
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), redfmt_lzf::Error>(())
//! ```

mod compress;
mod decompress;
mod error;

pub use compress::{compress, compress_to_vec, Compressor};
pub use decompress::{decompress, decompress_into};
pub use error::{Error, Result};

/// Number of bits in a hash table index.
pub const HASH_LOG: u32 = 14;

/// Number of slots in the compressor hash table.
pub const HASH_SIZE: usize = 1 << HASH_LOG;

/// Longest literal run a single control byte can describe.
pub const MAX_LITERAL: usize = 1 << 5;

/// Back-references must point less than this many bytes behind.
pub const MAX_OFFSET: usize = 1 << 13;

/// Longest match a single back-reference can describe.
pub const MAX_REFERENCE: usize = (1 << 8) + (1 << 3);
