use std::sync::{Arc, Mutex, MutexGuard};

use crate::RunId;

#[derive(Debug, Default)]
struct StoreInner {
    run_id: Option<RunId>,
    endpoints: Vec<String>,
}

/// Reachable endpoints of the current run, in discovery order.
///
/// Cloning shares the same list. The probe loop is the only writer; readers
/// take copies. Writes tagged with a run other than the current one are
/// dropped, so a late probe from a stopped run never leaks into the next.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the store and makes `run_id` the only accepted writer.
    pub fn reset(&self, run_id: RunId) {
        let mut inner = self.lock();
        inner.run_id = Some(run_id);
        inner.endpoints.clear();
    }

    /// Appends `endpoint` and returns the new count, or `None` when the
    /// write belongs to a stale run.
    pub fn add(&self, run_id: RunId, endpoint: impl Into<String>) -> Option<usize> {
        let mut inner = self.lock();
        if inner.run_id != Some(run_id) {
            return None;
        }
        inner.endpoints.push(endpoint.into());
        Some(inner.endpoints.len())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().endpoints.clone()
    }

    pub fn count(&self) -> usize {
        self.lock().endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // Poison is ignored: every critical section is a single Vec operation.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
