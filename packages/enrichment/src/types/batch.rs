//! Aggregate outcome of a batch run.

use uuid::Uuid;

/// Aggregate outcome of running a per-entity operation over N entities.
///
/// Every entity processed yields exactly one outcome: it appears in either
/// `successes` or `failures`, never both, never omitted. Order carries no
/// meaning; units complete in any order.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationResult<T> {
    /// Entities whose operation completed, with their results
    pub successes: Vec<(Uuid, T)>,

    /// Entities whose operation failed, with the failure message
    pub failures: Vec<(Uuid, String)>,
}

impl<T> BatchOperationResult<T> {
    /// Create an empty result.
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a success.
    pub fn push_success(&mut self, id: Uuid, data: T) {
        self.successes.push((id, data));
    }

    /// Record a failure.
    pub fn push_failure(&mut self, id: Uuid, message: impl Into<String>) {
        self.failures.push((id, message.into()));
    }

    /// Total number of outcomes recorded.
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Whether no outcomes were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every entity succeeded.
    pub fn is_all_success(&self) -> bool {
        self.failures.is_empty()
    }
}
