//! Error types for property deserialization.

use thiserror::Error;

/// Errors that can occur when decoding typed resource objects.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (usually a read past the end of the stream).
    #[error("{0}")]
    Common(#[from] redfmt_common::Error),

    /// A chunk header's reserved field was not -1.
    #[error("malformed property chunk (name #{name_id}): reserved field is {reserved}, expected -1")]
    MalformedChunk { name_id: i16, reserved: i16 },

    /// A chunk header declared a size smaller than the size field itself.
    #[error("malformed property chunk (name #{name_id}): size {size} is smaller than 4")]
    MalformedSize { name_id: i16, size: u32 },

    /// A serializer consumed a different number of bytes than the chunk declared.
    #[error("{class}.{property}: chunk declared {declared} payload bytes but {consumed} were consumed")]
    TrailingData {
        class: &'static str,
        property: String,
        declared: usize,
        consumed: usize,
    },

    /// The target type has no property with this name.
    #[error("{class} does not contain a property '{property}' ({type_name})")]
    UnknownProperty {
        class: &'static str,
        property: String,
        type_name: String,
    },

    /// A wire string named no member of the enum.
    #[error("'{enum_name}' does not contain a definition for '{member}'")]
    UnknownEnumMember {
        enum_name: &'static str,
        member: String,
    },

    /// An array header's reserved field was not -1.
    #[error("malformed array of {element_type}: reserved field is {reserved}, expected -1")]
    MalformedArray { element_type: String, reserved: i16 },

    /// A type's property table is invalid. This is a programming error.
    #[error("invalid property table for {class}: {reason}")]
    ConstructionDefect { class: &'static str, reason: String },

    /// The operation is not implemented for this serializer kind.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A string index could not be resolved.
    #[error("string index {index} out of range (table size: {count})")]
    StringIndexOutOfRange { index: i16, count: usize },

    /// A name table has no free 16-bit index left.
    #[error("name table is full")]
    NameTableFull,

    /// A name has no index in the string table, so it cannot be written.
    #[error("name '{0}' is not in the string table")]
    NameNotInTable(String),

    /// A decoded value does not fit the field or serializer it was given to.
    #[error("value mismatch: expected {expected}, got {actual}")]
    ValueMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An encoded payload is too large for a chunk's 32-bit size field.
    #[error("payload of {0} bytes is too large for a property chunk")]
    PayloadTooLarge(usize),
}

/// Result type for property deserialization.
pub type Result<T> = std::result::Result<T, Error>;
