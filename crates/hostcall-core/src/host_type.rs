//! Host-side type tags for parameters and return values.

use std::borrow::Cow;
use std::fmt;

use crate::runtime::{Dynamic, HostRef};
use crate::type_hash::TypeHash;

/// Type tag for one declared parameter or return type of a host member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    /// No value.
    Void,
    /// Boolean.
    Bool,
    /// Any integer width.
    Int,
    /// Any float width.
    Float,
    /// Owned string.
    String,
    /// Host object of the named type.
    Object(Cow<'static, str>),
    /// Any value, passed through unconverted.
    Any,
    /// Return values sink. Only valid as the first parameter.
    ReturnValues,
}

impl HostType {
    /// Tag for a host object type.
    pub fn object(name: impl Into<Cow<'static, str>>) -> Self {
        HostType::Object(name.into())
    }

    /// Name used in signatures and diagnostics.
    pub fn name(&self) -> &str {
        match self {
            HostType::Void => "void",
            HostType::Bool => "bool",
            HostType::Int => "int",
            HostType::Float => "float",
            HostType::String => "string",
            HostType::Object(name) => name,
            HostType::Any => "any",
            HostType::ReturnValues => "returns",
        }
    }

    /// Check if this is the void tag.
    pub fn is_void(&self) -> bool {
        matches!(self, HostType::Void)
    }

    /// Check if this is the return values sink tag.
    pub fn is_return_values(&self) -> bool {
        matches!(self, HostType::ReturnValues)
    }

    /// Hash of this tag, used to build signature hashes.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(self.name())
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a Rust type to the [`HostType`] it is exposed as.
///
/// Typed registration uses this to compute a member's parameter list and
/// return type without any runtime reflection.
pub trait HostTyped {
    /// The tag for this type.
    fn host_type() -> HostType;
}

macro_rules! impl_host_typed {
    ($tag:expr => $($ty:ty),*) => {
        $(
            impl HostTyped for $ty {
                fn host_type() -> HostType {
                    $tag
                }
            }
        )*
    };
}

impl_host_typed!(HostType::Int => i8, i16, i32, i64, u8, u16, u32, u64);
impl_host_typed!(HostType::Float => f32, f64);
impl_host_typed!(HostType::Bool => bool);
impl_host_typed!(HostType::String => String);
impl_host_typed!(HostType::Void => ());
impl_host_typed!(HostType::Any => Dynamic);
impl_host_typed!(HostType::Object(Cow::Borrowed("object")) => HostRef);

impl<T: HostTyped> HostTyped for Option<T> {
    fn host_type() -> HostType {
        T::host_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tags() {
        assert_eq!(i32::host_type(), HostType::Int);
        assert_eq!(u64::host_type(), HostType::Int);
        assert_eq!(f32::host_type(), HostType::Float);
        assert_eq!(bool::host_type(), HostType::Bool);
        assert_eq!(String::host_type(), HostType::String);
        assert_eq!(<()>::host_type(), HostType::Void);
        assert_eq!(Option::<i64>::host_type(), HostType::Int);
    }

    #[test]
    fn names() {
        assert_eq!(HostType::Int.to_string(), "int");
        assert_eq!(HostType::object("Vector3").to_string(), "Vector3");
        assert_eq!(HostType::ReturnValues.name(), "returns");
    }

    #[test]
    fn type_hash_is_deterministic() {
        assert_eq!(HostType::Int.type_hash(), HostType::Int.type_hash());
        assert_ne!(HostType::Int.type_hash(), HostType::Float.type_hash());
    }
}
