//! Values and execution context shared by every host call.
//!
//! ## Key Types
//!
//! - [`Dynamic`]: value crossing the boundary (primitives, strings, host objects)
//! - [`HostRef`]: shared, type-erased reference to a host object
//! - [`ReturnValues`]: ordered sink the results of a call are pushed into
//! - [`CallContext`]: what a host body sees during one call
//! - [`NativeFn`]: type-erased host body

mod call_context;
mod dynamic;
mod native_fn;
mod return_values;

pub use call_context::CallContext;
pub use dynamic::{Dynamic, HostObject, HostRef};
pub(crate) use dynamic::short_type_name;
pub use native_fn::{NativeCallable, NativeFn};
pub use return_values::ReturnValues;
