//! Registration table for hostcall call adapters.
//!
//! [`CallerRegistry`] owns one [`MethodCaller`](hostcall_core::MethodCaller)
//! per exposed member and indexes them for overload resolution.

mod registry;

pub use registry::{CallerId, CallerRegistry, Registration};
