//! Error types for host calls.
//!
//! ## Error Hierarchy
//!
//! ```text
//! HostcallError (top-level wrapper)
//! ├── RegistrationError - contract violations detected while building an adapter
//! ├── InvocationError   - a host call failed (carries the NativeError cause)
//! └── UnknownCaller     - a registry lookup used an id it never handed out
//!
//! NativeError           - raised by host code through CallContext
//! └── ConversionError   - a value could not be coerced to the requested type
//! ```

use std::fmt;

use thiserror::Error;

use crate::HostType;
use crate::runtime::Dynamic;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors that can occur when converting between Rust and script values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Attempted to convert a null value to a non-nullable type
    #[error("null value cannot be converted to {target_type}")]
    NullValue { target_type: &'static str },

    /// Integer overflow during conversion
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Float conversion error
    #[error("float conversion error: value {value} cannot be represented as {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },

    /// Object reference of the wrong host type
    #[error("object type mismatch: expected {expected}, got {actual}")]
    ObjectMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

// ============================================================================
// Native Errors
// ============================================================================

/// Errors raised while a host body runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// Error converting arguments or return values
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Invalid `this` reference for a method call
    #[error("invalid 'this' reference: {message}")]
    InvalidThis { message: String },

    /// Argument index out of bounds
    #[error("argument index {index} out of bounds (function has {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// The callable pushed results but was not registered with a return sink
    #[error("no return sink: callable was not declared with a leading return values parameter")]
    NoReturnSink,

    /// Host body panicked
    #[error("native function panicked: {message}")]
    Panic { message: String },

    /// Generic native error
    #[error("native error: {message}")]
    Other { message: String },
}

impl NativeError {
    /// Create an "invalid this" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create a generic native error.
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }

    /// Create a panic error from a caught panic message.
    pub fn panic(message: impl Into<String>) -> Self {
        NativeError::Panic {
            message: message.into(),
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Contract violations detected while building a call adapter.
///
/// These are never recovered locally: the member must not be registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The member declares a result type and also writes results through a
    /// leading return values parameter.
    #[error(
        "'{member}' must have a void return type when its first parameter is a return values sink, got {return_type}"
    )]
    ReturnTypeWithReturnValues {
        /// The offending member.
        member: String,
        /// The declared return type.
        return_type: HostType,
    },

    /// A return values parameter appears after the first position.
    #[error(
        "'{member}' declares a return values sink at parameter {index}; only the first parameter may be one"
    )]
    MisplacedReturnValues {
        /// The offending member.
        member: String,
        /// Zero-based parameter position.
        index: usize,
    },
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Runtime type and string form of one argument of a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentReport {
    /// Zero-based argument position.
    pub index: usize,
    /// Runtime type name, or `None` for an absent value.
    pub type_name: Option<&'static str>,
    /// String form, or `None` for an absent value.
    pub value: Option<String>,
}

impl ArgumentReport {
    /// Describe one argument.
    pub fn describe(index: usize, arg: &Dynamic) -> Self {
        if arg.is_null() {
            Self {
                index,
                type_name: None,
                value: None,
            }
        } else {
            Self {
                index,
                type_name: Some(arg.type_name()),
                value: Some(arg.to_string()),
            }
        }
    }
}

impl fmt::Display for ArgumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.type_name, &self.value) {
            (Some(ty), Some(value)) => write!(f, "({}): ({}) = {}", self.index, ty, value),
            _ => write!(f, "({}): (NULL)", self.index),
        }
    }
}

/// A host call that failed.
///
/// Carries everything needed to diagnose the failure without access to the
/// adapter: the callable name, whether it was static, each argument and the
/// underlying cause.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("call to '{callable}' failed: {source}")]
pub struct InvocationError {
    /// Name of the callable that failed.
    pub callable: String,
    /// Whether the callable was static.
    pub is_static: bool,
    /// Per-argument reports, in argument order.
    pub arguments: Vec<ArgumentReport>,
    /// The failure raised by the host body.
    #[source]
    pub source: NativeError,
}

impl InvocationError {
    /// Build a report for a failed call.
    pub fn new(
        callable: impl Into<String>,
        is_static: bool,
        args: &[Dynamic],
        source: NativeError,
    ) -> Self {
        Self {
            callable: callable.into(),
            is_static,
            arguments: args
                .iter()
                .enumerate()
                .map(|(index, arg)| ArgumentReport::describe(index, arg))
                .collect(),
            source,
        }
    }

    /// Check if the failure was a panic in host code.
    pub fn is_panic(&self) -> bool {
        matches!(self.source, NativeError::Panic { .. })
    }

    /// Arguments rendered one per line, in the diagnostic layout.
    pub fn argument_summary(&self) -> String {
        self.arguments
            .iter()
            .map(|arg| format!("\t{arg}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for hostcall operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostcallError {
    /// A registration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// An invocation error.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// A caller id that was never registered.
    #[error("unknown caller id {id}")]
    UnknownCaller {
        /// The unknown id.
        id: u32,
    },
}

impl HostcallError {
    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, HostcallError::Registration(_))
    }

    /// Check if this is an invocation error.
    pub fn is_invocation(&self) -> bool {
        matches!(self, HostcallError::Invocation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_display() {
        let err = ConversionError::TypeMismatch {
            expected: "int",
            actual: "string",
        };
        assert_eq!(err.to_string(), "type mismatch: expected int, got string");
    }

    #[test]
    fn native_error_from_conversion() {
        let err: NativeError = ConversionError::NullValue { target_type: "i32" }.into();
        assert!(matches!(err, NativeError::Conversion(_)));
        assert!(err.to_string().contains("i32"));
    }

    #[test]
    fn registration_error_display() {
        let err = RegistrationError::ReturnTypeWithReturnValues {
            member: "split".to_string(),
            return_type: HostType::Int,
        };
        let text = err.to_string();
        assert!(text.contains("split"));
        assert!(text.contains("void return type"));
        assert!(text.contains("int"));
    }

    #[test]
    fn argument_report_marks_null() {
        let report = ArgumentReport::describe(2, &Dynamic::Null);
        assert_eq!(report.type_name, None);
        assert_eq!(report.value, None);
        assert_eq!(report.to_string(), "(2): (NULL)");
    }

    #[test]
    fn argument_report_describes_value() {
        let report = ArgumentReport::describe(0, &Dynamic::String("hello".into()));
        assert_eq!(report.type_name, Some("string"));
        assert_eq!(report.value.as_deref(), Some("hello"));
        assert_eq!(report.to_string(), "(0): (string) = hello");
    }

    #[test]
    fn invocation_error_display_and_source() {
        let err = InvocationError::new(
            "add",
            false,
            &[Dynamic::Int(3), Dynamic::Null],
            NativeError::other("boom"),
        );
        assert_eq!(err.to_string(), "call to 'add' failed: native error: boom");
        assert_eq!(err.arguments.len(), 2);
        assert!(!err.is_panic());

        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("native error: boom"));
    }

    #[test]
    fn invocation_error_argument_summary() {
        let err = InvocationError::new(
            "log",
            true,
            &[Dynamic::Int(1), Dynamic::Null],
            NativeError::panic("oops"),
        );
        assert_eq!(err.argument_summary(), "\t(0): (int) = 1\n\t(1): (NULL)");
        assert!(err.is_panic());
    }

    #[test]
    fn hostcall_error_from_variants() {
        let reg: HostcallError = RegistrationError::MisplacedReturnValues {
            member: "f".into(),
            index: 1,
        }
        .into();
        assert!(reg.is_registration());

        let inv: HostcallError =
            InvocationError::new("f", true, &[], NativeError::other("x")).into();
        assert!(inv.is_invocation());

        let unknown = HostcallError::UnknownCaller { id: 7 };
        assert_eq!(unknown.to_string(), "unknown caller id 7");
    }
}
