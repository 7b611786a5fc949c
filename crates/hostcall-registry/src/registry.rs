//! CallerRegistry - the table overload resolution looks callers up in.
//!
//! Every exposed host member gets one [`MethodCaller`], stored once and
//! addressed by a [`CallerId`]. Lookups go by signature string, by signature
//! hash, or by member name (all overloads).
//!
//! # Deduplication
//!
//! Registering a member that is already registered with the same owner
//! reference and the same `has_self` flag returns the existing id. A
//! different `has_self` builds a new caller, since it changes which receiver
//! the call uses. Two members with the same shape but different `Arc`s are
//! distinct callers sharing a signature.
//!
//! # Thread Safety
//!
//! Callers are not `Sync`, and neither is the registry. Populate it and call
//! through it from one thread, or move it whole to another.
//!
//! # Example
//!
//! ```
//! use hostcall_core::{Dynamic, HostMember, ReturnValues};
//! use hostcall_registry::CallerRegistry;
//!
//! let mut registry = CallerRegistry::new();
//! let reg = registry
//!     .register(HostMember::from_fn("abs", |x: i64| x.abs()), None, false)
//!     .unwrap();
//! assert_eq!(reg.signature, "abs(int)");
//!
//! let mut sink = ReturnValues::new();
//! registry.call(reg.id, None, &mut sink, &[Dynamic::Int(-3)]).unwrap();
//! assert_eq!(sink.as_slice(), &[Dynamic::Int(3)]);
//! ```

use std::fmt;
use std::sync::Arc;

use hostcall_core::{
    CallerOptions, DiagnosticChannel, Dynamic, HostMember, HostcallError, MethodCaller,
    RegistrationError, ReturnValues, TracingDiagnostics, TypeHash,
};
use rustc_hash::FxHashMap;

/// Index of a caller in a [`CallerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerId(pub u32);

impl CallerId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of [`CallerRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Id of the caller, new or existing.
    pub id: CallerId,
    /// Signature string for the overload table.
    pub signature: String,
    /// `false` if an equal caller was already registered.
    pub is_new: bool,
}

/// Table of call adapters.
pub struct CallerRegistry {
    callers: Vec<MethodCaller>,

    /// Signature string -> callers with that signature
    by_signature: FxHashMap<String, Vec<CallerId>>,

    /// Signature hash -> callers with that signature
    by_hash: FxHashMap<TypeHash, Vec<CallerId>>,

    /// Member name -> every overload
    by_name: FxHashMap<String, Vec<CallerId>>,

    /// Member `Arc` address -> callers built from it, for deduplication
    by_member: FxHashMap<usize, Vec<CallerId>>,

    options: CallerOptions,
    diagnostics: Arc<dyn DiagnosticChannel>,
}

impl CallerRegistry {
    /// Create an empty registry with default caller options.
    pub fn new() -> Self {
        Self::with_options(CallerOptions::default(), Arc::new(TracingDiagnostics))
    }

    /// Create an empty registry whose callers use `options` and report to
    /// `diagnostics`.
    pub fn with_options(options: CallerOptions, diagnostics: Arc<dyn DiagnosticChannel>) -> Self {
        Self {
            callers: Vec::new(),
            by_signature: FxHashMap::default(),
            by_hash: FxHashMap::default(),
            by_name: FxHashMap::default(),
            by_member: FxHashMap::default(),
            options,
            diagnostics,
        }
    }

    /// Build a caller for `member` and add it to the table.
    ///
    /// # Errors
    ///
    /// Returns the [`RegistrationError`] raised while building the caller;
    /// nothing is registered in that case.
    pub fn register(
        &mut self,
        member: Arc<HostMember>,
        owner: Option<Dynamic>,
        has_self: bool,
    ) -> Result<Registration, RegistrationError> {
        let member_key = Arc::as_ptr(&member) as usize;
        let caller = MethodCaller::with_options(
            member,
            owner,
            has_self,
            self.options,
            self.diagnostics.clone(),
        )?;

        if let Some(existing) = self.find_equal(member_key, &caller) {
            tracing::debug!(
                id = %existing,
                signature = caller.signature(),
                "caller already registered"
            );
            return Ok(Registration {
                id: existing,
                signature: caller.signature().to_owned(),
                is_new: false,
            });
        }

        let id = CallerId(self.callers.len() as u32);
        let signature = caller.signature().to_owned();

        self.by_signature
            .entry(signature.clone())
            .or_default()
            .push(id);
        self.by_hash
            .entry(caller.descriptor().signature_hash())
            .or_default()
            .push(id);
        self.by_name
            .entry(caller.name().to_owned())
            .or_default()
            .push(id);
        self.by_member.entry(member_key).or_default().push(id);
        self.callers.push(caller);

        tracing::debug!(%id, %signature, "caller registered");

        Ok(Registration {
            id,
            signature,
            is_new: true,
        })
    }

    fn find_equal(&self, member_key: usize, caller: &MethodCaller) -> Option<CallerId> {
        self.by_member
            .get(&member_key)?
            .iter()
            .copied()
            .find(|id| {
                let existing = &self.callers[id.index()];
                existing == caller && existing.has_self() == caller.has_self()
            })
    }

    /// Get a caller by id.
    pub fn get(&self, id: CallerId) -> Option<&MethodCaller> {
        self.callers.get(id.index())
    }

    /// Call through the caller with the given id.
    ///
    /// # Errors
    ///
    /// - [`HostcallError::UnknownCaller`] if `id` was not handed out by this registry
    /// - [`HostcallError::Invocation`] if the call failed and the caller
    ///   propagates failures
    pub fn call(
        &self,
        id: CallerId,
        receiver: Option<&Dynamic>,
        sink: &mut ReturnValues,
        args: &[Dynamic],
    ) -> Result<(), HostcallError> {
        let caller = self
            .get(id)
            .ok_or(HostcallError::UnknownCaller { id: id.0 })?;
        caller.call(receiver, sink, args)?;
        Ok(())
    }

    /// Callers registered under a signature string.
    pub fn by_signature(&self, signature: &str) -> &[CallerId] {
        self.by_signature
            .get(signature)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Callers registered under a signature hash.
    pub fn by_signature_hash(&self, hash: TypeHash) -> &[CallerId] {
        self.by_hash.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every overload of a member name, in registration order.
    pub fn overloads(&self, name: &str) -> &[CallerId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of registered callers.
    pub fn len(&self) -> usize {
        self.callers.len()
    }

    /// Check if no caller is registered.
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }

    /// Iterate over every caller with its id, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (CallerId, &MethodCaller)> {
        self.callers
            .iter()
            .enumerate()
            .map(|(i, caller)| (CallerId(i as u32), caller))
    }
}

impl Default for CallerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerRegistry")
            .field("callers", &self.callers)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
