//! Enum descriptors.
//!
//! Enum properties are written as the member's name. An [`EnumDescriptor`]
//! lists the accepted names; [`EnumType`] ties a Rust enum to its descriptor.
//! The [`red_enum!`](crate::red_enum) macro declares both at once.

/// Static description of an enum's members.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Name of the enum type, used in diagnostics.
    pub name: &'static str,
    /// Member names, in declaration order.
    pub members: &'static [&'static str],
}

impl EnumDescriptor {
    /// Create a descriptor.
    pub const fn new(name: &'static str, members: &'static [&'static str]) -> Self {
        Self { name, members }
    }

    /// Look up a member by its wire name.
    pub fn member(&self, name: &str) -> Option<&'static str> {
        self.members.iter().copied().find(|&m| m == name)
    }

    /// Check if `name` is a member of this enum.
    pub fn contains(&self, name: &str) -> bool {
        self.member(name).is_some()
    }
}

/// A Rust enum that can be decoded from an enum property.
pub trait EnumType: Sized + Copy + 'static {
    /// The member table for this enum.
    fn descriptor() -> &'static EnumDescriptor;

    /// Map a member name to a variant.
    fn from_member(name: &str) -> Option<Self>;

    /// The wire name of this variant.
    fn member_name(self) -> &'static str;
}

/// Declare an enum whose variants are decoded by name.
///
/// Variant identifiers are the wire names, so they keep the engine's
/// spelling.
///
/// ```
/// use redfmt_rtti::{red_enum, EnumType};
///
/// red_enum! {
///     #[allow(non_camel_case_types)]
///     pub enum EDoorState {
///         Door_Closed,
///         Door_Open,
///     }
/// }
///
/// assert_eq!(EDoorState::from_member("Door_Open"), Some(EDoorState::Door_Open));
/// assert_eq!(EDoorState::descriptor().members, &["Door_Closed", "Door_Open"]);
/// ```
#[macro_export]
macro_rules! red_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::EnumType for $name {
            fn descriptor() -> &'static $crate::EnumDescriptor {
                static DESCRIPTOR: $crate::EnumDescriptor = $crate::EnumDescriptor::new(
                    stringify!($name),
                    &[$(stringify!($variant)),+],
                );
                &DESCRIPTOR
            }

            fn from_member(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn member_name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::value::enum_from_value(value)
            }
        }
    };
}
