//! Run-wide test state: the error log commands report into.

use parking_lot::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Errors accumulated during one test run.
///
/// The log is append-only until [`TestState::take_errors`] drains it.
#[derive(Debug)]
pub struct TestState {
    run_id: Uuid,
    errors: Mutex<Vec<String>>,
}

impl Default for TestState {
    fn default() -> Self {
        Self::new()
    }
}

impl TestState {
    /// Create an empty state with a fresh run id
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Identifier of this run, attached to log records
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Append an error
    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(run_id = %self.run_id, "{message}");
        self.errors.lock().push(message);
    }

    /// Snapshot of the errors reported so far
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// Remove and return all errors reported since the last drain
    pub fn take_errors(&self) -> Vec<String> {
        std::mem::take(&mut *self.errors.lock())
    }

    /// Number of pending errors
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.lock().len()
    }

    /// Whether any error is pending
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.lock().is_empty()
    }
}
