//! Call context bridging call adapters and host bodies.

use std::any::Any;
use std::fmt;

use crate::convert::{FromDynamic, IntoDynamic};
use crate::error::NativeError;

use super::{Dynamic, ReturnValues};

/// Context for one host call.
///
/// Gives the host body access to its receiver and arguments and lets it
/// produce results.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let x: i32 = ctx.arg(0)?;
/// let name: String = ctx.arg(1)?;
/// ```
///
/// ## Results
///
/// Single-result callables use `set_return()`. Callables registered with a
/// leading return values parameter push any number of results with
/// `push_return()` instead.
pub struct CallContext<'a> {
    /// Receiver (for methods) followed by the arguments
    slots: &'a [Dynamic],
    /// Index of first argument (0 for static calls, 1 when slot 0 is `this`)
    arg_offset: usize,
    /// Single return value
    return_slot: &'a mut Dynamic,
    /// Sink for callables that write their own results
    returns: Option<&'a mut ReturnValues>,
}

impl<'a> CallContext<'a> {
    /// Create a new call context.
    ///
    /// # Arguments
    ///
    /// * `slots` - The argument slots (for methods, slot 0 is `this`)
    /// * `arg_offset` - Offset to first argument (0 for static calls, 1 for methods)
    /// * `return_slot` - Where to store a single return value
    /// * `returns` - Sink for callables that push their own results
    pub fn new(
        slots: &'a [Dynamic],
        arg_offset: usize,
        return_slot: &'a mut Dynamic,
        returns: Option<&'a mut ReturnValues>,
    ) -> Self {
        Self {
            slots,
            arg_offset,
            return_slot,
            returns,
        }
    }

    /// Get the number of arguments (excluding `this` for methods).
    pub fn arg_count(&self) -> usize {
        self.slots.len().saturating_sub(self.arg_offset)
    }

    /// Get a raw reference to an argument slot.
    pub fn arg_slot(&self, index: usize) -> Result<&Dynamic, NativeError> {
        self.slots
            .get(self.arg_offset + index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.arg_count(),
            })
    }

    /// Get a typed argument value.
    pub fn arg<T: FromDynamic>(&self, index: usize) -> Result<T, NativeError> {
        let slot = self.arg_slot(index)?;
        T::from_dynamic(slot).map_err(NativeError::Conversion)
    }

    /// Get the raw receiver slot.
    ///
    /// Fails for static calls, which have no receiver slot.
    pub fn this_slot(&self) -> Result<&Dynamic, NativeError> {
        if self.arg_offset == 0 {
            return Err(NativeError::invalid_this("static call has no receiver"));
        }
        self.slots
            .first()
            .ok_or_else(|| NativeError::invalid_this("no slots available"))
    }

    /// Borrow the receiver as `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - this is a static call
    /// - the receiver is not an object
    /// - the object is not a `T`
    pub fn this<T: Any>(&self) -> Result<&T, NativeError> {
        match self.this_slot()? {
            Dynamic::Object(obj) => obj.downcast_ref::<T>().ok_or_else(|| {
                NativeError::invalid_this(format!(
                    "type mismatch: expected {}, got {}",
                    std::any::type_name::<T>(),
                    obj.type_name()
                ))
            }),
            other => Err(NativeError::invalid_this(format!(
                "expected object, got {}",
                other.type_name()
            ))),
        }
    }

    /// Set the return value from a raw slot.
    pub fn set_return_slot(&mut self, slot: Dynamic) {
        *self.return_slot = slot;
    }

    /// Set a typed return value.
    pub fn set_return<T: IntoDynamic>(&mut self, value: T) {
        *self.return_slot = value.into_dynamic();
    }

    /// Push one result into the sink.
    ///
    /// Only available to callables registered with a leading return values
    /// parameter.
    pub fn push_return<T: IntoDynamic>(&mut self, value: T) -> Result<(), NativeError> {
        let sink = self.returns_mut()?;
        sink.push(value.into_dynamic());
        Ok(())
    }

    /// Mutable access to the sink.
    pub fn returns_mut(&mut self) -> Result<&mut ReturnValues, NativeError> {
        self.returns.as_deref_mut().ok_or(NativeError::NoReturnSink)
    }

    /// Check whether a sink is attached.
    pub fn has_returns(&self) -> bool {
        self.returns.is_some()
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("arg_count", &self.arg_count())
            .field("arg_offset", &self.arg_offset)
            .field("has_returns", &self.has_returns())
            .finish()
    }
}
