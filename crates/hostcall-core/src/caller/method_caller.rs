//! The call adapter.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::diagnostics::{DiagnosticChannel, TracingDiagnostics};
use crate::error::{InvocationError, NativeError, RegistrationError};
use crate::member::HostMember;
use crate::runtime::{Dynamic, ReturnValues};

use super::descriptor::{CallableDescriptor, ReturnArity};
use super::handle::InvocationHandle;
use super::scratch::ScratchBuffer;

static NULL: Dynamic = Dynamic::Null;

/// What happens to a failed call after it has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// `call` returns the [`InvocationError`].
    #[default]
    Propagate,
    /// `call` returns `Ok(())` with nothing pushed. Kept for runtimes that
    /// relied on failed calls yielding no value.
    LogAndContinue,
}

/// Per-adapter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerOptions {
    /// What `call` does after reporting a failure.
    pub failure_policy: FailurePolicy,
    /// Convert panics in host code into [`NativeError::Panic`].
    pub catch_panics: bool,
}

impl Default for CallerOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Propagate,
            catch_panics: true,
        }
    }
}

impl CallerOptions {
    /// Default options: propagate failures, catch panics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report failures and carry on as if the call produced nothing.
    pub fn legacy() -> Self {
        Self::default().with_failure_policy(FailurePolicy::LogAndContinue)
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

/// Call shape, fixed at construction.
enum Dispatch {
    Static,
    /// Instance member without parameters: the receiver is the only slot.
    Instance,
    /// Instance member with parameters: receiver and arguments share one
    /// reusable buffer.
    InstanceWithArgs(ScratchBuffer),
}

/// Call adapter for one exposed host member.
///
/// Built once at registration. Each [`call`](Self::call) resolves the
/// receiver, invokes the member and delivers its results to a
/// [`ReturnValues`] sink.
///
/// # Receivers
///
/// With `has_self` the receiver comes from the call site and a bound `owner`
/// is ignored for dispatch. Without it the bound `owner` is used, or
/// `Dynamic::Null` if there is none. Static members never see a receiver.
///
/// # Threading
///
/// The scratch buffer lives behind a `RefCell`, so an adapter is `Send` but
/// not `Sync`: one adapter serves one call at a time. A host body calling
/// back into the adapter that is running it gets a per-call buffer.
pub struct MethodCaller {
    member: Arc<HostMember>,
    owner: Option<Dynamic>,
    has_self: bool,
    descriptor: CallableDescriptor,
    handle: InvocationHandle,
    dispatch: Dispatch,
    options: CallerOptions,
    diagnostics: Arc<dyn DiagnosticChannel>,
}

impl MethodCaller {
    /// Build an adapter with default options, reporting failures through
    /// [`TracingDiagnostics`].
    pub fn new(
        member: Arc<HostMember>,
        owner: Option<Dynamic>,
        has_self: bool,
    ) -> Result<Self, RegistrationError> {
        Self::with_options(
            member,
            owner,
            has_self,
            CallerOptions::default(),
            Arc::new(TracingDiagnostics),
        )
    }

    /// Build an adapter.
    ///
    /// # Errors
    ///
    /// Fails if the member combines a leading return values sink with a
    /// non-void return type, or declares a sink anywhere but first.
    pub fn with_options(
        member: Arc<HostMember>,
        owner: Option<Dynamic>,
        has_self: bool,
        options: CallerOptions,
        diagnostics: Arc<dyn DiagnosticChannel>,
    ) -> Result<Self, RegistrationError> {
        let descriptor = CallableDescriptor::new(&member, has_self)?;

        tracing::debug!(
            declaring_type = registered_type_name(&member, owner.as_ref()),
            member = member.name(),
            is_static = descriptor.is_static(),
            has_self,
            arity = ?descriptor.return_arity(),
            "registering host member"
        );
        for (index, param) in descriptor.parameter_types().iter().enumerate() {
            tracing::debug!(member = member.name(), index, param = %param, "parameter");
        }

        let handle =
            InvocationHandle::new(&member, descriptor.return_arity(), options.catch_panics);

        let dispatch = if descriptor.is_static() {
            Dispatch::Static
        } else if descriptor.parameter_count() == 0 {
            Dispatch::Instance
        } else {
            Dispatch::InstanceWithArgs(ScratchBuffer::new(descriptor.parameter_count()))
        };

        Ok(Self {
            member,
            owner,
            has_self,
            descriptor,
            handle,
            dispatch,
            options,
            diagnostics,
        })
    }

    /// Invoke the member.
    ///
    /// `args` must already be coerced to the member's parameter types and
    /// match its parameter count; the adapter does not re-check. On success
    /// the sink receives one value for [`ReturnArity::Single`], nothing for
    /// [`ReturnArity::None`], and whatever the member pushed itself for
    /// [`ReturnArity::Multiple`].
    ///
    /// On failure the sink is left as it was before the call, the failure is
    /// reported to the diagnostic channel, and the configured
    /// [`FailurePolicy`] decides the result.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(
        &self,
        receiver: Option<&Dynamic>,
        sink: &mut ReturnValues,
        args: &[Dynamic],
    ) -> Result<(), InvocationError> {
        let mark = sink.len();

        let result = match (&self.dispatch, args.is_empty()) {
            (Dispatch::Static, true) => self.handle.invoke_none(sink),
            (Dispatch::Static, false) => self.handle.invoke(args, 0, sink),
            (_, true) => {
                let this = self.effective_receiver(receiver);
                self.handle.invoke(std::slice::from_ref(this), 1, sink)
            }
            (Dispatch::InstanceWithArgs(scratch), false) => {
                let this = self.effective_receiver(receiver);
                self.invoke_with_scratch(scratch, this, args, sink)
            }
            (Dispatch::Instance, false) => {
                let this = self.effective_receiver(receiver);
                self.invoke_combined(this, args, sink)
            }
        };

        match result {
            Ok(value) => {
                if self.descriptor.return_arity() == ReturnArity::Single {
                    sink.push(value);
                }
                Ok(())
            }
            Err(source) => {
                sink.rollback_to(mark);
                let failure = InvocationError::new(
                    self.member.name(),
                    self.descriptor.is_static(),
                    args,
                    source,
                );
                self.diagnostics.call_failed(&failure);
                match self.options.failure_policy {
                    FailurePolicy::Propagate => Err(failure),
                    FailurePolicy::LogAndContinue => Ok(()),
                }
            }
        }
    }

    fn effective_receiver<'a>(&'a self, receiver: Option<&'a Dynamic>) -> &'a Dynamic {
        let chosen = if self.has_self {
            receiver
        } else {
            self.owner.as_ref()
        };
        chosen.unwrap_or(&NULL)
    }

    fn invoke_with_scratch(
        &self,
        scratch: &ScratchBuffer,
        this: &Dynamic,
        args: &[Dynamic],
        sink: &mut ReturnValues,
    ) -> Result<Dynamic, NativeError> {
        match scratch.acquire(this, args) {
            Some(guard) => self.handle.invoke(guard.slots(), 1, sink),
            None => {
                tracing::trace!(
                    member = self.member.name(),
                    "scratch buffer busy, using a per-call buffer"
                );
                self.invoke_combined(this, args, sink)
            }
        }
    }

    fn invoke_combined(
        &self,
        this: &Dynamic,
        args: &[Dynamic],
        sink: &mut ReturnValues,
    ) -> Result<Dynamic, NativeError> {
        let mut slots = Vec::with_capacity(args.len() + 1);
        slots.push(this.clone());
        slots.extend_from_slice(args);
        self.handle.invoke(&slots, 1, sink)
    }

    /// Current contents of the scratch buffer.
    ///
    /// `None` for adapters without one (static members, instance members
    /// without parameters) and while a call is using it.
    pub fn scratch_snapshot(&self) -> Option<Vec<Dynamic>> {
        match &self.dispatch {
            Dispatch::InstanceWithArgs(scratch) => scratch.snapshot(),
            Dispatch::Static | Dispatch::Instance => None,
        }
    }

    pub fn descriptor(&self) -> &CallableDescriptor {
        &self.descriptor
    }

    pub fn member(&self) -> &Arc<HostMember> {
        &self.member
    }

    /// Receiver bound at registration.
    pub fn owner(&self) -> Option<&Dynamic> {
        self.owner.as_ref()
    }

    /// Whether the call site supplies the receiver.
    pub fn has_self(&self) -> bool {
        self.has_self
    }

    pub fn signature(&self) -> &str {
        self.descriptor.signature()
    }

    pub fn name(&self) -> &str {
        self.member.name()
    }

    pub fn is_static(&self) -> bool {
        self.descriptor.is_static()
    }

    pub fn return_arity(&self) -> ReturnArity {
        self.descriptor.return_arity()
    }

    pub fn options(&self) -> CallerOptions {
        self.options
    }
}

/// Type named in the registration trace: the bound owner's runtime type,
/// else the member's declaring type.
fn registered_type_name<'a>(member: &'a HostMember, owner: Option<&'a Dynamic>) -> &'a str {
    match owner {
        Some(owner) => owner.type_name(),
        None => member.declaring_type().unwrap_or("<none>"),
    }
}

impl PartialEq for MethodCaller {
    /// Same member `Arc` and same owner reference.
    fn eq(&self, other: &Self) -> bool {
        let same_owner = match (&self.owner, &other.owner) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_ref(b),
            _ => false,
        };
        Arc::ptr_eq(&self.member, &other.member) && same_owner
    }
}

impl Eq for MethodCaller {}

impl Hash for MethodCaller {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.member), state);
    }
}

impl fmt::Debug for MethodCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCaller")
            .field("signature", &self.descriptor.signature())
            .field("return_arity", &self.descriptor.return_arity())
            .field("has_self", &self.has_self)
            .field("owner", &self.owner)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
