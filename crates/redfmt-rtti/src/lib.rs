//! Metadata-driven property deserializer for RED engine resources.
//!
//! Resource objects are stored as a stream of property chunks. Each chunk
//! names a property through the resource's string table and carries a
//! payload whose layout depends on the property's serializer kind. This crate
//! decodes such streams onto Rust types that declare their properties up
//! front.
//!
//! # Quick Start
//!
//! ```
//! use redfmt_common::BinaryReader;
//! use redfmt_rtti::{
//!     setter, NameTable, PropertyChunk, SerializationContext, SerializerKind, StringTable,
//!     TypeBuilder, TypedClass,
//! };
//!
//! #[derive(Default)]
//! struct CEntity {
//!     appearance: String,
//! }
//!
//! impl TypedClass for CEntity {
//!     const TYPE_NAME: &'static str = "CEntity";
//!
//!     fn register(builder: &mut TypeBuilder<Self>) {
//!         builder.property("Appearance", SerializerKind::CNAME, setter!(appearance));
//!     }
//! }
//!
//! let strings = NameTable::from_names(["Appearance", "CName", "witcher_default"])?;
//!
//! let mut data = Vec::new();
//! let value = strings.find_string("witcher_default").unwrap();
//! PropertyChunk::write(&mut data, 1, 2, &value.to_le_bytes())?;
//! PropertyChunk::write_terminator(&mut data)?;
//!
//! let context = SerializationContext::new();
//! let entity: CEntity = context.decode_new(&mut BinaryReader::new(&data), &strings)?;
//! assert_eq!(entity.appearance, "witcher_default");
//! # Ok::<(), redfmt_rtti::Error>(())
//! ```
//!
//! # Architecture
//!
//! - **Strings** ([`StringTable`], [`NameTable`]): index to text resolution
//! - **Registry** ([`TypedClass`], [`TypeMetadata`]): per-type property tables
//! - **Serializers** ([`SerializerKind`]): payload decoders for each kind
//! - **Framing** ([`PropertyChunk`]): chunk headers and the stream terminator
//! - **Decoding** ([`SerializationContext`]): the chunk loop and metadata cache
//! - **Save blocks** ([`read_block_list`]): counted block lists

pub mod chunk;
mod context;
mod enums;
mod error;
mod kind;
mod registry;
mod save;
mod strings;
pub mod value;

pub use chunk::{ChunkHeader, PropertyChunk};
pub use context::SerializationContext;
pub use enums::{EnumDescriptor, EnumType};
pub use error::{Error, Result};
pub use kind::{PrimitiveKind, SerializerKind};
pub use registry::{PropertyInfo, Setter, TypeBuilder, TypeMetadata, TypedClass};
pub use save::{read_block_list, ObjectBlock, SaveBlock};
pub use strings::{NameTable, StringTable};
pub use value::{ArrayValue, EnumValue, FromValue, IdTag, Value};
