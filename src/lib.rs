//! Call host functions and methods from a scripting runtime.
//!
//! A scripting runtime holds an opaque reference to a registered callable
//! and invokes it with a receiver, already-coerced arguments and a sink for
//! results. This crate provides that adapter ([`MethodCaller`]) and the table
//! overload resolution looks adapters up in ([`CallerRegistry`]).
//!
//! # Example
//!
//! ```
//! use hostcall::prelude::*;
//!
//! #[derive(Debug)]
//! struct Calculator;
//!
//! let mut registry = CallerRegistry::new();
//! let add = HostMember::from_method::<Calculator, _, _>("add", |_: &Calculator, a: i64, b: i64| a + b);
//! let reg = registry.register(add, None, true)?;
//! assert_eq!(reg.signature, "Calculator:add(int,int)");
//!
//! let mut sink = ReturnValues::new();
//! registry.call(
//!     reg.id,
//!     Some(&Dynamic::object(Calculator)),
//!     &mut sink,
//!     &[Dynamic::Int(3), Dynamic::Int(4)],
//! )?;
//! assert_eq!(sink.as_slice(), &[Dynamic::Int(7)]);
//! # Ok::<(), HostcallError>(())
//! ```
//!
//! # Crates
//!
//! - [`hostcall_core`]: values, host members, call adapters, errors, diagnostics
//! - [`hostcall_registry`]: the registration table

pub use hostcall_core::*;
pub use hostcall_registry::{CallerId, CallerRegistry, Registration};

/// Everything needed to expose and call host members.
pub mod prelude {
    pub use hostcall_core::{
        CallContext, CallerOptions, DiagnosticChannel, DiagnosticLog, Dynamic, FailurePolicy,
        FromDynamic, HostMember, HostRef, HostType, HostTyped, HostcallError, IntoDynamic,
        InvocationError, MethodCaller, NativeError, RegistrationError, ReturnArity, ReturnValues,
        TracingDiagnostics,
    };
    pub use hostcall_registry::{CallerId, CallerRegistry, Registration};
}
