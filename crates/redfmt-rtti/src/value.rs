//! Decoded property values.
//!
//! Every serializer decodes into a [`Value`]; the target type's property
//! table then converts it into the field's Rust type through [`FromValue`].

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{EnumType, Error, Result};

/// A value decoded from a property payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// Name resolved through the string table.
    Name(String),
    /// Member of a declared enum.
    Enum(EnumValue),
    /// Two-word identifier tag.
    IdTag(IdTag),
    /// Ordered sequence of elements.
    Array(ArrayValue),
}

/// A resolved enum member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumValue {
    /// Name of the enum type.
    pub enum_name: &'static str,
    /// Name of the member.
    pub member: &'static str,
}

/// Fixed two-field identifier tag.
///
/// Read positionally with no name or type indirection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct IdTag {
    pub unknown0: u32,
    pub unknown1: u32,
}

/// A decoded array.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArrayValue {
    /// Element type name as written on the wire. Not checked against the
    /// element serializer.
    pub element_type: String,
    /// Decoded elements, in wire order.
    pub elements: Vec<Value>,
}

impl Value {
    /// Short name of this value's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int8(_) => "Int8",
            Value::UInt8(_) => "UInt8",
            Value::Int16(_) => "Int16",
            Value::UInt16(_) => "UInt16",
            Value::Int32(_) => "Int32",
            Value::UInt32(_) => "UInt32",
            Value::Int64(_) => "Int64",
            Value::UInt64(_) => "UInt64",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Name(_) => "Name",
            Value::Enum(_) => "Enum",
            Value::IdTag(_) => "IdTag",
            Value::Array(_) => "Array",
        }
    }

    /// Try to get this value as a name.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Name(s) => Some(s),
            Value::Enum(e) => Some(e.member),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::UInt8(v) => Some(*v as i64),
            Value::UInt16(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    #[inline]
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Name(s) => write!(f, "{}", s),
            Value::Enum(e) => write!(f, "{}::{}", e.enum_name, e.member),
            Value::IdTag(t) => write!(f, "IdTag({:#010x}, {:#010x})", t.unknown0, t.unknown1),
            Value::Array(a) => write!(f, "Array<{}>[{}]", a.element_type, a.elements.len()),
        }
    }
}

/// Conversion from a decoded [`Value`] into a field type.
pub trait FromValue: Sized {
    /// Convert, failing with [`Error::ValueMismatch`] on the wrong kind.
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch(stringify!($variant), &other)),
                    }
                }
            }
        )+
    };
}

impl_from_value! {
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => Name,
    IdTag => IdTag,
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Some)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(array) => array.elements.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("Array", &other)),
        }
    }
}

/// Convert an enum value into a declared enum type.
///
/// Used by the [`red_enum!`](crate::red_enum) expansion.
pub fn enum_from_value<T: EnumType>(value: Value) -> Result<T> {
    let descriptor = T::descriptor();
    match value {
        Value::Enum(e) if e.enum_name == descriptor.name => {
            T::from_member(e.member).ok_or_else(|| Error::UnknownEnumMember {
                enum_name: descriptor.name,
                member: e.member.to_string(),
            })
        }
        other => Err(mismatch(descriptor.name, &other)),
    }
}

fn mismatch(expected: &'static str, actual: &Value) -> Error {
    Error::ValueMismatch {
        expected,
        actual: actual.kind_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_conversion() {
        assert_eq!(i32::from_value(Value::Int32(-7)).unwrap(), -7);
        assert_eq!(
            String::from_value(Value::Name("Appearance".into())).unwrap(),
            "Appearance"
        );
        assert_eq!(Option::<u8>::from_value(Value::UInt8(3)).unwrap(), Some(3));
    }

    #[test]
    fn test_wrong_kind_is_mismatch() {
        let err = i32::from_value(Value::UInt32(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::ValueMismatch {
                expected: "Int32",
                actual: "UInt32"
            }
        ));
    }

    #[test]
    fn test_array_conversion_drops_element_type() {
        let value = Value::Array(ArrayValue {
            element_type: "Int32".into(),
            elements: vec![Value::Int32(1), Value::Int32(2)],
        });
        assert_eq!(Vec::<i32>::from_value(value).unwrap(), vec![1, 2]);

        let mixed = Value::Array(ArrayValue {
            element_type: "Int32".into(),
            elements: vec![Value::Int32(1), Value::Bool(true)],
        });
        assert!(Vec::<i32>::from_value(mixed).is_err());
    }

    #[test]
    fn test_display() {
        let tag = Value::IdTag(IdTag {
            unknown0: 1,
            unknown1: 0xDEADBEEF,
        });
        assert_eq!(tag.to_string(), "IdTag(0x00000001, 0xdeadbeef)");
        assert_eq!(Value::Name("x".into()).as_str(), Some("x"));
        assert_eq!(Value::UInt16(9).as_i64(), Some(9));
    }
}
