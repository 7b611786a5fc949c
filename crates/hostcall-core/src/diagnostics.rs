//! Where failed host calls are reported.
//!
//! Every failed call is handed to a [`DiagnosticChannel`] before the adapter
//! decides whether to propagate it. [`TracingDiagnostics`] is the default and
//! forwards to `tracing`; [`DiagnosticLog`] keeps failures in memory.

use std::sync::{Mutex, MutexGuard};

use crate::error::InvocationError;

/// Receives structured reports of failed host calls.
pub trait DiagnosticChannel: Send + Sync {
    /// Report one failed call.
    fn call_failed(&self, failure: &InvocationError);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticChannel for TracingDiagnostics {
    fn call_failed(&self, failure: &InvocationError) {
        tracing::error!(
            callable = %failure.callable,
            is_static = failure.is_static,
            arguments = %failure.argument_summary(),
            error = %failure.source,
            "host call failed"
        );
    }
}

/// Collects failures in memory.
///
/// Useful for embedders that surface failures on their own schedule, and in
/// tests.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    failures: Mutex<Vec<InvocationError>>,
}

impl DiagnosticLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures recorded.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no failure has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every failure recorded so far, oldest first.
    pub fn failures(&self) -> Vec<InvocationError> {
        self.lock().clone()
    }

    /// Remove and return every failure recorded so far.
    pub fn take(&self) -> Vec<InvocationError> {
        std::mem::take(&mut *self.lock())
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<InvocationError>> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticChannel for DiagnosticLog {
    fn call_failed(&self, failure: &InvocationError) {
        self.lock().push(failure.clone());
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;
    use crate::error::NativeError;
    use crate::runtime::Dynamic;
    use crate::test_support::capture_logs;

    fn failure(name: &str) -> InvocationError {
        InvocationError::new(name, true, &[Dynamic::Int(1)], NativeError::other("boom"))
    }

    #[test]
    fn log_collects_in_order() {
        let log = DiagnosticLog::new();
        assert!(log.is_empty());

        log.call_failed(&failure("a"));
        log.call_failed(&failure("b"));

        assert_eq!(log.len(), 2);
        let names: Vec<_> = log.failures().into_iter().map(|f| f.callable).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn take_drains() {
        let log = DiagnosticLog::new();
        log.call_failed(&failure("a"));

        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn tracing_channel_emits_one_error_event() {
        let output = capture_logs(Level::TRACE, || {
            TracingDiagnostics.call_failed(&failure("split"));
        });

        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("ERROR"));
        assert!(output.contains("host call failed"));
        assert!(output.contains("callable=split"));
        assert!(output.contains("is_static=true"));
        assert!(output.contains("(0): (int) = 1"));
        assert!(output.contains("error=native error: boom"));
    }

    #[test]
    fn channels_are_object_safe() {
        let channels: Vec<Box<dyn DiagnosticChannel>> =
            vec![Box::new(TracingDiagnostics), Box::new(DiagnosticLog::new())];
        for channel in &channels {
            channel.call_failed(&failure("x"));
        }
    }
}
