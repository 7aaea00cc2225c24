//! Redfmt - RED engine resource decoding library.
//!
//! This crate provides a unified interface to the redfmt library ecosystem
//! for working with RED engine game files.
//!
//! # Crates
//!
//! - [`redfmt_common`] - Common utilities (bounded binary reading)
//! - [`redfmt_lzf`] - LZF block compression for pack archives
//! - [`redfmt_rtti`] - Property stream decoding onto typed objects
//!
//! # Example
//!
//! ```
//! use redfmt::prelude::*;
//!
//! let data = vec![7u8; 256];
//! let mut compressor = Compressor::new();
//!
//! let packed = compressor.compress_to_vec(&data, data.len())?;
//! assert!(packed.len() < data.len());
//! assert_eq!(decompress(&packed, data.len())?, data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use redfmt_common as common;
pub use redfmt_lzf as lzf;
pub use redfmt_rtti as rtti;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use redfmt_common::BinaryReader;
    pub use redfmt_lzf::{decompress, Compressor};
    pub use redfmt_rtti::{
        read_block_list, setter, FromValue, NameTable, PropertyChunk, SaveBlock,
        SerializationContext, SerializerKind, StringTable, TypeBuilder, TypedClass, Value,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
