//! Failure reporting.
//!
//! The driver runs in the background after its caller has returned, so
//! runtime faults are handed to a [`Reporter`] supplied by the caller instead
//! of being returned as errors.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// A sink for test failures raised by a running session.
pub trait Reporter: Send + Sync + 'static {
    /// Record a failure.
    fn fail(&self, message: &str);

    /// Check if any failure has been recorded.
    fn failed(&self) -> bool;
}

impl<R: Reporter> Reporter for Arc<R> {
    fn fail(&self, message: &str) {
        (**self).fail(message);
    }

    fn failed(&self) -> bool {
        (**self).failed()
    }
}

/// A clonable [`Reporter`] that collects failure messages.
///
/// Clones share the same list, so a test can keep one clone and hand the
/// other to [`Responder::start`](crate::Responder::start).
#[derive(Clone, Default)]
pub struct Failures {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Failures {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// All recorded messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Check if any message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|m| m.contains(needle))
    }

    /// Panic with every recorded message if anything failed.
    #[track_caller]
    pub fn assert_ok(&self) {
        let messages = self.messages();
        assert!(
            messages.is_empty(),
            "responder reported {} failure(s):\n  {}",
            messages.len(),
            messages.join("\n  ")
        );
    }
}

impl Reporter for Failures {
    fn fail(&self, message: &str) {
        tracing::error!(message, "responder failure");
        self.lock().push(message.to_string());
    }

    fn failed(&self) -> bool {
        !self.is_empty()
    }
}

impl fmt::Debug for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failures")
            .field("messages", &*self.lock())
            .finish()
    }
}
