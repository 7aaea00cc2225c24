//! Serializer kinds.
//!
//! A property's serializer kind decides how its chunk payload is decoded.
//! The set is closed: fixed-width primitives and names, enums decoded by
//! member name, identifier tags, and arrays wrapping another kind.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use redfmt_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::{
    ArrayValue, EnumDescriptor, EnumType, EnumValue, Error, IdTag, Result, StringTable, Value,
};

/// Primitive payload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// One byte, non-zero is true.
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// 16-bit string table index.
    CName,
}

impl PrimitiveKind {
    /// Size in bytes of the encoded value.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::CName => 2,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
        }
    }

    /// Get the string name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::CName => "CName",
        }
    }

    fn decode(&self, reader: &mut BinaryReader<'_>, strings: &dyn StringTable) -> Result<Value> {
        Ok(match self {
            Self::Bool => Value::Bool(reader.read_bool()?),
            Self::Int8 => Value::Int8(reader.read_i8()?),
            Self::UInt8 => Value::UInt8(reader.read_u8()?),
            Self::Int16 => Value::Int16(reader.read_i16()?),
            Self::UInt16 => Value::UInt16(reader.read_u16()?),
            Self::Int32 => Value::Int32(reader.read_i32()?),
            Self::UInt32 => Value::UInt32(reader.read_u32()?),
            Self::Int64 => Value::Int64(reader.read_i64()?),
            Self::UInt64 => Value::UInt64(reader.read_u64()?),
            Self::Float => Value::Float(reader.read_f32()?),
            Self::Double => Value::Double(reader.read_f64()?),
            Self::CName => Value::Name(read_name(reader, strings)?.to_string()),
        })
    }

    fn encode<W: Write>(
        &self,
        writer: &mut W,
        value: &Value,
        strings: &dyn StringTable,
    ) -> Result<()> {
        match (self, value) {
            (Self::Bool, Value::Bool(v)) => writer.write_u8(*v as u8)?,
            (Self::Int8, Value::Int8(v)) => writer.write_i8(*v)?,
            (Self::UInt8, Value::UInt8(v)) => writer.write_u8(*v)?,
            (Self::Int16, Value::Int16(v)) => writer.write_i16::<LittleEndian>(*v)?,
            (Self::UInt16, Value::UInt16(v)) => writer.write_u16::<LittleEndian>(*v)?,
            (Self::Int32, Value::Int32(v)) => writer.write_i32::<LittleEndian>(*v)?,
            (Self::UInt32, Value::UInt32(v)) => writer.write_u32::<LittleEndian>(*v)?,
            (Self::Int64, Value::Int64(v)) => writer.write_i64::<LittleEndian>(*v)?,
            (Self::UInt64, Value::UInt64(v)) => writer.write_u64::<LittleEndian>(*v)?,
            (Self::Float, Value::Float(v)) => writer.write_f32::<LittleEndian>(*v)?,
            (Self::Double, Value::Double(v)) => writer.write_f64::<LittleEndian>(*v)?,
            (Self::CName, Value::Name(name)) => write_name(writer, name, strings)?,
            (_, other) => {
                return Err(Error::ValueMismatch {
                    expected: self.as_str(),
                    actual: other.kind_name(),
                })
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a property payload is decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializerKind {
    /// Direct fixed-width read or a name index.
    Primitive(PrimitiveKind),
    /// One name that must be a member of the enum.
    Enum(&'static EnumDescriptor),
    /// Two positional `u32` words.
    IdTag,
    /// Count, element type name, reserved marker, then `count` elements.
    Array(Box<SerializerKind>),
}

impl SerializerKind {
    pub const BOOL: Self = Self::Primitive(PrimitiveKind::Bool);
    pub const INT8: Self = Self::Primitive(PrimitiveKind::Int8);
    pub const UINT8: Self = Self::Primitive(PrimitiveKind::UInt8);
    pub const INT16: Self = Self::Primitive(PrimitiveKind::Int16);
    pub const UINT16: Self = Self::Primitive(PrimitiveKind::UInt16);
    pub const INT32: Self = Self::Primitive(PrimitiveKind::Int32);
    pub const UINT32: Self = Self::Primitive(PrimitiveKind::UInt32);
    pub const INT64: Self = Self::Primitive(PrimitiveKind::Int64);
    pub const UINT64: Self = Self::Primitive(PrimitiveKind::UInt64);
    pub const FLOAT: Self = Self::Primitive(PrimitiveKind::Float);
    pub const DOUBLE: Self = Self::Primitive(PrimitiveKind::Double);
    pub const CNAME: Self = Self::Primitive(PrimitiveKind::CName);

    /// Serializer for a declared enum type.
    pub fn enumeration<T: EnumType>() -> Self {
        Self::Enum(T::descriptor())
    }

    /// Serializer for an array whose elements use `element`.
    pub fn array_of(element: SerializerKind) -> Self {
        Self::Array(Box::new(element))
    }

    /// Decode one value from `reader`.
    pub fn decode(
        &self,
        reader: &mut BinaryReader<'_>,
        strings: &dyn StringTable,
    ) -> Result<Value> {
        match self {
            Self::Primitive(kind) => kind.decode(reader, strings),
            Self::Enum(descriptor) => {
                let name = read_name(reader, strings)?;
                let member = descriptor.member(name).ok_or_else(|| Error::UnknownEnumMember {
                    enum_name: descriptor.name,
                    member: name.to_string(),
                })?;
                Ok(Value::Enum(EnumValue {
                    enum_name: descriptor.name,
                    member,
                }))
            }
            Self::IdTag => Ok(Value::IdTag(reader.read_struct::<IdTag>()?)),
            Self::Array(element) => {
                let count = reader.read_u32()?;
                let element_type = read_name(reader, strings)?.to_string();

                let reserved = reader.read_i16()?;
                if reserved != -1 {
                    return Err(Error::MalformedArray {
                        element_type,
                        reserved,
                    });
                }

                // Every element occupies at least one byte, so the payload
                // bound caps any honest count.
                let mut elements = Vec::with_capacity((count as usize).min(reader.remaining()));
                for _ in 0..count {
                    elements.push(element.decode(reader, strings)?);
                }

                Ok(Value::Array(ArrayValue {
                    element_type,
                    elements,
                }))
            }
        }
    }

    /// Encode one value to `writer`.
    ///
    /// Array encoding is not implemented and fails with
    /// [`Error::Unsupported`].
    pub fn encode<W: Write>(
        &self,
        writer: &mut W,
        value: &Value,
        strings: &dyn StringTable,
    ) -> Result<()> {
        match (self, value) {
            (Self::Primitive(kind), value) => kind.encode(writer, value, strings),
            (Self::Enum(descriptor), Value::Enum(e)) if e.enum_name == descriptor.name => {
                if !descriptor.contains(e.member) {
                    return Err(Error::UnknownEnumMember {
                        enum_name: descriptor.name,
                        member: e.member.to_string(),
                    });
                }
                write_name(writer, e.member, strings)
            }
            (Self::IdTag, Value::IdTag(tag)) => {
                writer.write_all(tag.as_bytes())?;
                Ok(())
            }
            (Self::Array(_), _) => Err(Error::Unsupported("array encoding")),
            (kind, other) => Err(Error::ValueMismatch {
                expected: kind.name(),
                actual: other.kind_name(),
            }),
        }
    }

    /// Short name of this kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primitive(kind) => kind.as_str(),
            Self::Enum(descriptor) => descriptor.name,
            Self::IdTag => "IdTag",
            Self::Array(_) => "Array",
        }
    }
}

impl From<PrimitiveKind> for SerializerKind {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

/// Read a 16-bit string table index and resolve it.
fn read_name<'s>(reader: &mut BinaryReader<'_>, strings: &'s dyn StringTable) -> Result<&'s str> {
    let index = reader.read_i16()?;
    strings.resolve_string(index)
}

fn write_name<W: Write>(writer: &mut W, name: &str, strings: &dyn StringTable) -> Result<()> {
    let index = strings
        .find_string(name)
        .ok_or_else(|| Error::NameNotInTable(name.to_string()))?;
    writer.write_i16::<LittleEndian>(index)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{red_enum, NameTable};

    red_enum! {
        #[allow(non_camel_case_types)]
        enum EAttitude {
            AIA_Friendly,
            AIA_Neutral,
            AIA_Hostile,
        }
    }

    fn names() -> NameTable {
        NameTable::from_names(["AIA_Friendly", "AIA_Neutral", "AIA_Hostile", "Int32", "Bogus"])
            .unwrap()
    }

    #[test]
    fn test_primitive_decode() {
        let strings = names();
        let data = [0xFE, 0xFF, 0xFF, 0xFF];
        let mut reader = BinaryReader::new(&data);

        let value = SerializerKind::INT32.decode(&mut reader, &strings).unwrap();
        assert_eq!(value, Value::Int32(-2));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_cname_decode() {
        let strings = names();
        let data = 4i16.to_le_bytes();
        let mut reader = BinaryReader::new(&data);

        let value = SerializerKind::CNAME.decode(&mut reader, &strings).unwrap();
        assert_eq!(value, Value::Name("Int32".into()));
    }

    #[test]
    fn test_every_enum_member_decodes() {
        let strings = names();
        let kind = SerializerKind::enumeration::<EAttitude>();

        for &member in EAttitude::descriptor().members {
            let index = strings.find_string(member).unwrap();
            let data = index.to_le_bytes();
            let mut reader = BinaryReader::new(&data);

            let value = kind.decode(&mut reader, &strings).unwrap();
            assert_eq!(
                value,
                Value::Enum(EnumValue {
                    enum_name: "EAttitude",
                    member,
                })
            );
        }
    }

    #[test]
    fn test_unknown_enum_member() {
        let strings = names();
        let data = 5i16.to_le_bytes();
        let mut reader = BinaryReader::new(&data);

        let err = SerializerKind::enumeration::<EAttitude>()
            .decode(&mut reader, &strings)
            .unwrap_err();
        match err {
            Error::UnknownEnumMember { enum_name, member } => {
                assert_eq!(enum_name, "EAttitude");
                assert_eq!(member, "Bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_id_tag_decode() {
        let strings = names();
        let mut data = Vec::new();
        data.extend_from_slice(&0x0102_0304u32.to_le_bytes());
        data.extend_from_slice(&0xA0B0_C0D0u32.to_le_bytes());
        let mut reader = BinaryReader::new(&data);

        let value = SerializerKind::IdTag.decode(&mut reader, &strings).unwrap();
        assert_eq!(
            value,
            Value::IdTag(IdTag {
                unknown0: 0x0102_0304,
                unknown1: 0xA0B0_C0D0,
            })
        );
        assert!(reader.is_empty());
    }

    fn array_header(count: u32, type_index: i16, reserved: i16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&type_index.to_le_bytes());
        data.extend_from_slice(&reserved.to_le_bytes());
        data
    }

    #[test]
    fn test_empty_array() {
        let strings = names();
        let data = array_header(0, 4, -1);
        let mut reader = BinaryReader::new(&data);

        let value = SerializerKind::array_of(SerializerKind::INT32)
            .decode(&mut reader, &strings)
            .unwrap();
        assert_eq!(
            value,
            Value::Array(ArrayValue {
                element_type: "Int32".into(),
                elements: vec![],
            })
        );
        assert!(reader.is_empty());
    }

    #[test]
    fn test_array_elements_in_order() {
        let strings = names();
        let mut data = array_header(3, 4, -1);
        for v in [10i32, -20, 30] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut reader = BinaryReader::new(&data);

        let value = SerializerKind::array_of(SerializerKind::INT32)
            .decode(&mut reader, &strings)
            .unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(
            array.elements,
            vec![Value::Int32(10), Value::Int32(-20), Value::Int32(30)]
        );
    }

    #[test]
    fn test_array_element_type_is_not_checked() {
        let strings = names();
        let mut data = array_header(1, 5, -1);
        data.extend_from_slice(&1i16.to_le_bytes());
        let mut reader = BinaryReader::new(&data);

        let value = SerializerKind::array_of(SerializerKind::CNAME)
            .decode(&mut reader, &strings)
            .unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.element_type, "Bogus");
        assert_eq!(array.elements, vec![Value::Name("AIA_Friendly".into())]);
    }

    #[test]
    fn test_array_bad_reserved() {
        let strings = names();
        let data = array_header(0, 4, 0);
        let mut reader = BinaryReader::new(&data);

        let err = SerializerKind::array_of(SerializerKind::INT32)
            .decode(&mut reader, &strings)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedArray { reserved: 0, .. }));
    }

    #[test]
    fn test_nested_array() {
        let strings = names();
        let mut data = array_header(2, 4, -1);
        data.extend(array_header(1, 4, -1));
        data.extend_from_slice(&7i32.to_le_bytes());
        data.extend(array_header(0, 4, -1));
        let mut reader = BinaryReader::new(&data);

        let kind = SerializerKind::array_of(SerializerKind::array_of(SerializerKind::INT32));
        let value = kind.decode(&mut reader, &strings).unwrap();
        let outer = value.as_array().unwrap();
        assert_eq!(outer.elements.len(), 2);
        assert_eq!(outer.elements[0].as_array().unwrap().elements, vec![Value::Int32(7)]);
        assert!(outer.elements[1].as_array().unwrap().elements.is_empty());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_encode_matches_decode() {
        let strings = names();
        let cases = [
            (SerializerKind::BOOL, Value::Bool(true)),
            (SerializerKind::UINT16, Value::UInt16(0xBEEF)),
            (SerializerKind::DOUBLE, Value::Double(-0.5)),
            (SerializerKind::CNAME, Value::Name("Int32".into())),
            (
                SerializerKind::enumeration::<EAttitude>(),
                Value::Enum(EnumValue {
                    enum_name: "EAttitude",
                    member: "AIA_Hostile",
                }),
            ),
            (
                SerializerKind::IdTag,
                Value::IdTag(IdTag {
                    unknown0: 1,
                    unknown1: 2,
                }),
            ),
        ];

        for (kind, value) in cases {
            let mut buf = Vec::new();
            kind.encode(&mut buf, &value, &strings).unwrap();
            let mut reader = BinaryReader::new(&buf);
            assert_eq!(kind.decode(&mut reader, &strings).unwrap(), value);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_array_encode_is_unsupported() {
        let strings = names();
        let value = Value::Array(ArrayValue {
            element_type: "Int32".into(),
            elements: vec![],
        });
        let err = SerializerKind::array_of(SerializerKind::INT32)
            .encode(&mut Vec::<u8>::new(), &value, &strings)
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_encode_rejects_wrong_kind_and_unknown_name() {
        let strings = names();

        let err = SerializerKind::INT32
            .encode(&mut Vec::<u8>::new(), &Value::Bool(false), &strings)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ValueMismatch {
                expected: "Int32",
                actual: "Bool"
            }
        ));

        let err = SerializerKind::CNAME
            .encode(&mut Vec::<u8>::new(), &Value::Name("Missing".into()), &strings)
            .unwrap_err();
        assert!(matches!(err, Error::NameNotInTable(_)));
    }
}
