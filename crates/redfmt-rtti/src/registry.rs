//! Type registry.
//!
//! Each decodable type declares its serializable properties once, through
//! [`TypedClass::register`]. The resulting [`TypeMetadata`] maps wire
//! property names to a serializer kind and a setter that stores the decoded
//! value on the target.
//!
//! # Example
//!
//! ```
//! use redfmt_rtti::{setter, SerializerKind, TypeBuilder, TypeMetadata, TypedClass};
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
//!         builder
//!             .property("Appearance", SerializerKind::CNAME, setter!(appearance))
//!             .description("Appearance template name");
//!     }
//! }
//!
//! let metadata = TypeMetadata::<CEntity>::build()?;
//! assert_eq!(metadata.len(), 1);
//! assert_eq!(metadata.description("Appearance"), Some("Appearance template name"));
//! # Ok::<(), redfmt_rtti::Error>(())
//! ```

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

use crate::{Error, Result, SerializerKind, Value};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Stores a decoded value on a property of `T`.
pub type Setter<T> = fn(&mut T, Value) -> Result<()>;

/// A type whose properties can be decoded from a property stream.
pub trait TypedClass: Sized + 'static {
    /// Name of the type, used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Declare the serializable properties. Fields not declared here are
    /// never touched by decoding.
    fn register(builder: &mut TypeBuilder<Self>);
}

/// One serializable property.
pub struct PropertyInfo<T> {
    name: &'static str,
    kind: SerializerKind,
    description: Option<&'static str>,
    setter: Setter<T>,
}

impl<T> PropertyInfo<T> {
    /// Wire name of the property.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Serializer kind used to decode the payload.
    pub fn kind(&self) -> &SerializerKind {
        &self.kind
    }

    /// Optional descriptive text.
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Store `value` on `target`.
    pub fn assign(&self, target: &mut T, value: Value) -> Result<()> {
        (self.setter)(target, value)
    }
}

impl<T> std::fmt::Debug for PropertyInfo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Collects property declarations for one type.
///
/// Declaration mistakes are recorded rather than returned so that
/// [`TypedClass::register`] stays infallible; [`TypeMetadata::build`] reports
/// the first one.
pub struct TypeBuilder<T> {
    properties: Vec<PropertyInfo<T>>,
    index: FxHashMap<&'static str, usize>,
    defect: Option<String>,
}

impl<T> TypeBuilder<T> {
    fn new() -> Self {
        Self {
            properties: Vec::new(),
            index: FxHashMap::default(),
            defect: None,
        }
    }

    /// Declare a property.
    pub fn property(
        &mut self,
        name: &'static str,
        kind: SerializerKind,
        setter: Setter<T>,
    ) -> &mut Self {
        if name.is_empty() {
            self.record_defect(format!(
                "property #{} has an empty name",
                self.properties.len()
            ));
            return self;
        }

        if self.index.contains_key(name) {
            self.record_defect(format!("duplicate property '{}'", name));
            return self;
        }

        self.index.insert(name, self.properties.len());
        self.properties.push(PropertyInfo {
            name,
            kind,
            description: None,
            setter,
        });
        self
    }

    /// Attach a description to the most recently declared property.
    pub fn description(&mut self, text: &'static str) -> &mut Self {
        match self.properties.last_mut() {
            Some(property) => property.description = Some(text),
            None => self.record_defect("description given before any property".to_string()),
        }
        self
    }

    fn record_defect(&mut self, reason: String) {
        if self.defect.is_none() {
            self.defect = Some(reason);
        }
    }
}

/// Immutable property table for one type.
pub struct TypeMetadata<T> {
    properties: Vec<PropertyInfo<T>>,
    index: FxHashMap<&'static str, usize>,
}

impl<T: TypedClass> TypeMetadata<T> {
    /// Build the table by running `T`'s registration.
    ///
    /// Fails with [`Error::ConstructionDefect`] for an empty or duplicate
    /// property name.
    pub fn build() -> Result<Self> {
        let mut builder = TypeBuilder::new();
        T::register(&mut builder);

        if let Some(reason) = builder.defect {
            return Err(Error::ConstructionDefect {
                class: T::TYPE_NAME,
                reason,
            });
        }

        Ok(Self {
            properties: builder.properties,
            index: builder.index,
        })
    }
}

impl<T> TypeMetadata<T> {
    /// Look up a property by wire name.
    pub fn get(&self, name: &str) -> Option<&PropertyInfo<T>> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    /// Description of a property, if it has one.
    pub fn description(&self, name: &str) -> Option<&'static str> {
        self.get(name).and_then(|p| p.description)
    }

    /// Iterate properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyInfo<T>> {
        self.properties.iter()
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if no properties are declared.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T> std::fmt::Debug for TypeMetadata<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.properties.iter()).finish()
    }
}

/// Build a [`Setter`] that converts the decoded value into a field's type.
///
/// ```
/// # use redfmt_rtti::{setter, Setter, Value};
/// struct Door {
///     locked: bool,
/// }
///
/// let set: Setter<Door> = setter!(locked);
/// let mut door = Door { locked: false };
/// set(&mut door, Value::Bool(true))?;
/// assert!(door.locked);
/// # Ok::<(), redfmt_rtti::Error>(())
/// ```
#[macro_export]
macro_rules! setter {
    ($field:ident) => {
        |target, value| {
            target.$field = $crate::FromValue::from_value(value)?;
            Ok(())
        }
    };
}
