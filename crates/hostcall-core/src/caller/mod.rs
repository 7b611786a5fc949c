//! Call adapters.
//!
//! A [`MethodCaller`] composes three pieces built once at registration:
//!
//! - [`CallableDescriptor`]: parameter types, static flag, return arity and
//!   signature
//! - an invocation handle holding the member body, invoked without any
//!   per-call resolution
//! - a dispatch shape, which for instance members with parameters owns a
//!   reusable receiver + argument buffer
//!
//! ```
//! use hostcall_core::{Dynamic, HostMember, MethodCaller, ReturnValues};
//!
//! #[derive(Debug)]
//! struct Calculator;
//!
//! let add = HostMember::from_method::<Calculator, _, _>("add", |_: &Calculator, a: i64, b: i64| a + b);
//! let caller = MethodCaller::new(add, None, true).unwrap();
//!
//! let mut sink = ReturnValues::new();
//! caller
//!     .call(Some(&Dynamic::object(Calculator)), &mut sink, &[Dynamic::Int(3), Dynamic::Int(4)])
//!     .unwrap();
//! assert_eq!(sink.as_slice(), &[Dynamic::Int(7)]);
//! ```

mod descriptor;
mod handle;
mod method_caller;
mod scratch;

pub use descriptor::{CallableDescriptor, ReturnArity};
pub use method_caller::{CallerOptions, FailurePolicy, MethodCaller};
