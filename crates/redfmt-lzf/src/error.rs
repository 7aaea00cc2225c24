//! Error types for the LZF codec.

use thiserror::Error;

/// Errors that can occur when compressing or decompressing LZF blocks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The compressed form does not fit in the output buffer.
    ///
    /// This is an expected outcome for incompressible data; callers usually
    /// fall back to storing the block uncompressed.
    #[error("compressed data does not fit in {capacity} bytes")]
    InsufficientCapacity { capacity: usize },

    /// The compressed stream ends in the middle of a control sequence.
    #[error("compressed stream truncated at offset {offset}")]
    Truncated { offset: usize },

    /// Decompressed data would not fit in the output buffer.
    #[error("decompressed data exceeds output buffer of {capacity} bytes")]
    OutputOverflow { capacity: usize },

    /// A back-reference points before the start of the output.
    #[error("back-reference at offset {offset} reaches {distance} bytes behind {position}")]
    BadBackReference {
        offset: usize,
        distance: usize,
        position: usize,
    },

    /// Decompressed size differs from the size the container declared.
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl Error {
    /// Check if compression simply ran out of output budget.
    pub fn is_insufficient_capacity(&self) -> bool {
        matches!(self, Error::InsufficientCapacity { .. })
    }
}

/// Result type for LZF operations.
pub type Result<T> = std::result::Result<T, Error>;
