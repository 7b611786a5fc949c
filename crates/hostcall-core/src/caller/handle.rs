//! Pre-resolved invocation of a member body.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::NativeError;
use crate::member::HostMember;
use crate::runtime::{CallContext, Dynamic, NativeFn, ReturnValues};

use super::ReturnArity;

/// The member body, captured once and invoked on every call.
///
/// Only the adapter that owns it ever calls it.
pub(crate) struct InvocationHandle {
    body: NativeFn,
    arity: ReturnArity,
    catch_panics: bool,
}

impl InvocationHandle {
    pub(crate) fn new(member: &HostMember, arity: ReturnArity, catch_panics: bool) -> Self {
        Self {
            body: member.body().clone(),
            arity,
            catch_panics,
        }
    }

    /// Invoke with no receiver and no arguments.
    #[inline]
    pub(crate) fn invoke_none(&self, sink: &mut ReturnValues) -> Result<Dynamic, NativeError> {
        self.invoke(&[], 0, sink)
    }

    /// Invoke with an explicit slot sequence.
    ///
    /// `arg_offset` is 1 when slot 0 is the receiver. Returns the value the
    /// body set as its single result, `Dynamic::Null` if it set none. The sink
    /// is only handed to bodies of [`ReturnArity::Multiple`].
    pub(crate) fn invoke(
        &self,
        slots: &[Dynamic],
        arg_offset: usize,
        sink: &mut ReturnValues,
    ) -> Result<Dynamic, NativeError> {
        let mut ret = Dynamic::Null;
        {
            let returns = match self.arity {
                ReturnArity::Multiple => Some(sink),
                ReturnArity::None | ReturnArity::Single => None,
            };
            let mut ctx = CallContext::new(slots, arg_offset, &mut ret, returns);

            if self.catch_panics {
                match catch_unwind(AssertUnwindSafe(|| self.body.call(&mut ctx))) {
                    Ok(result) => result?,
                    Err(payload) => return Err(NativeError::panic(panic_message(&*payload))),
                }
            } else {
                self.body.call(&mut ctx)?;
            }
        }
        Ok(ret)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
