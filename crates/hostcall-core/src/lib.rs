//! Core types for calling host functions from a scripting runtime.
//!
//! The central type is [`MethodCaller`], a call adapter built once per exposed
//! host member. Scripts never see host calling conventions: they hand the
//! adapter a receiver, a slice of already-coerced [`Dynamic`] arguments and a
//! [`ReturnValues`] sink, and the adapter performs the call and delivers the
//! results.
//!
//! ## Layout
//!
//! - [`runtime`]: values, host object references, the return sink, the call
//!   context and type-erased native bodies
//! - [`member`]: the host member model that stands in for reflection
//! - [`caller`]: descriptor, invocation handle and the call adapter
//! - [`diagnostics`]: where invocation failures are reported

pub mod caller;
pub mod convert;
pub mod diagnostics;
mod error;
mod host_type;
pub mod member;
pub mod runtime;
mod type_hash;

#[cfg(test)]
mod test_support;

pub use caller::{CallableDescriptor, CallerOptions, FailurePolicy, MethodCaller, ReturnArity};
pub use convert::{FromDynamic, IntoDynamic};
pub use diagnostics::{DiagnosticChannel, DiagnosticLog, TracingDiagnostics};
pub use error::{
    ArgumentReport, ConversionError, HostcallError, InvocationError, NativeError,
    RegistrationError,
};
pub use host_type::{HostType, HostTyped};
pub use member::{HostFn, HostMember, HostMemberBuilder, HostMethodFn};
pub use runtime::{
    CallContext, Dynamic, HostObject, HostRef, NativeCallable, NativeFn, ReturnValues,
};
pub use type_hash::TypeHash;
