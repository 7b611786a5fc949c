//! Conversion traits for argument extraction and return value handling.
//!
//! - [`FromDynamic`]: extract a Rust value from a [`Dynamic`]
//! - [`IntoDynamic`]: convert a Rust value into a [`Dynamic`]
//!
//! Coercing script values into the parameter types a call site resolved to
//! is the caller's job; these traits only cover the last step, reading an
//! already-coerced slot inside a host body.

use crate::error::ConversionError;
use crate::runtime::{Dynamic, HostRef};

/// Extract a value from a Dynamic slot.
pub trait FromDynamic: Sized {
    /// Extract a value from the given slot.
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError>;
}

/// Convert a value into a Dynamic slot.
pub trait IntoDynamic {
    /// Convert this value into a Dynamic slot.
    fn into_dynamic(self) -> Dynamic;
}

fn mismatch(expected: &'static str, slot: &Dynamic) -> ConversionError {
    if slot.is_null() {
        ConversionError::NullValue {
            target_type: expected,
        }
    } else {
        ConversionError::TypeMismatch {
            expected,
            actual: slot.type_name(),
        }
    }
}

// ============================================================================
// Integers
// ============================================================================

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
                    match slot {
                        Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(mismatch("int", slot)),
                    }
                }
            }

            impl IntoDynamic for $ty {
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::Int(self as i64)
                }
            }

            impl From<$ty> for Dynamic {
                fn from(value: $ty) -> Self {
                    value.into_dynamic()
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

// u64 reinterprets the i64 bits so the full range survives a round trip
impl FromDynamic for u64 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Int(v) => Ok(*v as u64),
            _ => Err(mismatch("int", slot)),
        }
    }
}

impl IntoDynamic for u64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Int(self as i64)
    }
}

impl From<u64> for Dynamic {
    fn from(value: u64) -> Self {
        value.into_dynamic()
    }
}

// ============================================================================
// Floats
// ============================================================================

impl FromDynamic for f32 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) if !v.is_finite() => Ok(*v as f32),
            Dynamic::Float(v) if *v <= f32::MAX as f64 && *v >= f32::MIN as f64 => Ok(*v as f32),
            Dynamic::Float(v) => Err(ConversionError::FloatConversion {
                value: *v,
                target_type: "f32",
            }),
            Dynamic::Int(v) => Ok(*v as f32),
            _ => Err(mismatch("float", slot)),
        }
    }
}

impl FromDynamic for f64 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) => Ok(*v),
            Dynamic::Int(v) => Ok(*v as f64),
            _ => Err(mismatch("float", slot)),
        }
    }
}

impl IntoDynamic for f32 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self as f64)
    }
}

impl IntoDynamic for f64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self)
    }
}

impl From<f64> for Dynamic {
    fn from(value: f64) -> Self {
        Dynamic::Float(value)
    }
}

// ============================================================================
// Bool, strings, unit
// ============================================================================

impl FromDynamic for bool {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Bool(v) => Ok(*v),
            _ => Err(mismatch("bool", slot)),
        }
    }
}

impl IntoDynamic for bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(self)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl FromDynamic for String {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", slot)),
        }
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.to_owned())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_owned())
    }
}

impl FromDynamic for () {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Void | Dynamic::Null => Ok(()),
            _ => Err(mismatch("void", slot)),
        }
    }
}

impl IntoDynamic for () {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Void
    }
}

// ============================================================================
// Pass-through, objects, optionals
// ============================================================================

impl FromDynamic for Dynamic {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        Ok(slot.clone())
    }
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

impl FromDynamic for HostRef {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Object(obj) => Ok(obj.clone()),
            _ => Err(mismatch("object", slot)),
        }
    }
}

impl IntoDynamic for HostRef {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Object(self)
    }
}

impl From<HostRef> for Dynamic {
    fn from(value: HostRef) -> Self {
        Dynamic::Object(value)
    }
}

impl<T: FromDynamic> FromDynamic for Option<T> {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Null => Ok(None),
            other => T::from_dynamic(other).map(Some),
        }
    }
}

impl<T: IntoDynamic> IntoDynamic for Option<T> {
    fn into_dynamic(self) -> Dynamic {
        match self {
            Some(value) => value.into_dynamic(),
            None => Dynamic::Null,
        }
    }
}
