//! Serialization context and the object decoder.

use std::any::{Any, TypeId};
use std::sync::Arc;

use hashbrown::HashMap as FastHashMap;
use parking_lot::RwLock;
use redfmt_common::BinaryReader;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use tracing::{debug, trace};

use crate::chunk::{ChunkHeader, TERMINATOR};
use crate::{Error, Result, StringTable, TypeMetadata, TypedClass};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

type MetadataCache = FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Owns the per-type metadata cache used while decoding.
///
/// Metadata is built on first use of a type and shared afterwards. The cache
/// is safe to use from several threads; concurrent first use of a type may
/// build its table twice, but only one copy is kept.
#[derive(Default)]
pub struct SerializationContext {
    types: RwLock<MetadataCache>,
}

impl SerializationContext {
    /// Create a context with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the property table for `T`, building it on first use.
    pub fn metadata<T: TypedClass>(&self) -> Result<Arc<TypeMetadata<T>>> {
        let key = TypeId::of::<T>();

        if let Some(entry) = self.types.read().get(&key) {
            return downcast(entry.clone());
        }

        let built = TypeMetadata::<T>::build()?;
        debug!(
            class = T::TYPE_NAME,
            properties = built.len(),
            "registered type metadata"
        );

        let entry = self
            .types
            .write()
            .entry(key)
            .or_insert_with(|| Arc::new(built) as Arc<dyn Any + Send + Sync>)
            .clone();
        downcast(entry)
    }

    /// Number of types with cached metadata.
    pub fn cached_types(&self) -> usize {
        self.types.read().len()
    }

    /// Decode a property stream onto `target`.
    ///
    /// Reads chunks until the terminator and leaves `reader` just past it.
    /// On error, properties decoded before the failing chunk keep their new
    /// values.
    pub fn decode_object<T: TypedClass>(
        &self,
        reader: &mut BinaryReader<'_>,
        strings: &dyn StringTable,
        target: &mut T,
    ) -> Result<()> {
        let metadata = self.metadata::<T>()?;

        loop {
            let name_id = reader.read_i16()?;
            if name_id == TERMINATOR {
                return Ok(());
            }
            let name = strings.resolve_string(name_id)?;

            let type_id = reader.read_i16()?;
            let type_name = strings.resolve_string(type_id)?;

            let header = ChunkHeader::read_rest(reader, name_id, type_id)?;
            let mut payload = reader.sub_reader(header.payload_len())?;

            let property = metadata.get(name).ok_or_else(|| Error::UnknownProperty {
                class: T::TYPE_NAME,
                property: name.to_string(),
                type_name: type_name.to_string(),
            })?;

            let declared = payload.len();
            let value = property
                .kind()
                .decode(&mut payload, strings)
                .map_err(|e| overrun(e, T::TYPE_NAME, name, declared))?;
            property.assign(target, value)?;

            if !payload.is_empty() {
                return Err(Error::TrailingData {
                    class: T::TYPE_NAME,
                    property: name.to_string(),
                    declared,
                    consumed: payload.position(),
                });
            }

            trace!(
                class = T::TYPE_NAME,
                property = name,
                type_name,
                size = declared,
                "decoded property"
            );
        }
    }

    /// Decode a property stream into a fresh `T`.
    pub fn decode_new<T: TypedClass + Default>(
        &self,
        reader: &mut BinaryReader<'_>,
        strings: &dyn StringTable,
    ) -> Result<T> {
        let mut target = T::default();
        self.decode_object(reader, strings, &mut target)?;
        Ok(target)
    }
}

impl std::fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializationContext")
            .field("cached_types", &self.cached_types())
            .finish()
    }
}

fn downcast<T: TypedClass>(entry: Arc<dyn Any + Send + Sync>) -> Result<Arc<TypeMetadata<T>>> {
    entry
        .downcast::<TypeMetadata<T>>()
        .map_err(|_| Error::ConstructionDefect {
            class: T::TYPE_NAME,
            reason: "cached metadata has the wrong type".to_string(),
        })
}

/// A serializer that runs off the end of its payload consumed more than the
/// chunk declared.
fn overrun(error: Error, class: &'static str, property: &str, declared: usize) -> Error {
    match error {
        Error::Common(redfmt_common::Error::UnexpectedEof { needed, available }) => {
            Error::TrailingData {
                class,
                property: property.to_string(),
                declared,
                consumed: declared - available + needed,
            }
        }
        other => other,
    }
}
