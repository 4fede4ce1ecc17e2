//! At most one concurrent execution per task id

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Set of task ids currently executing
#[derive(Debug, Default)]
pub struct InFlight {
    running: Mutex<HashSet<String>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `source_id`, or `None` if it is already running
    ///
    /// The claim is released when the guard is dropped.
    pub fn try_acquire(self: &Arc<Self>, source_id: &str) -> Option<InFlightGuard> {
        let inserted = self.running.lock().insert(source_id.to_string());
        inserted.then(|| InFlightGuard {
            owner: Arc::clone(self),
            source_id: source_id.to_string(),
        })
    }

    pub fn is_running(&self, source_id: &str) -> bool {
        self.running.lock().contains(source_id)
    }

    pub fn len(&self) -> usize {
        self.running.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.lock().is_empty()
    }
}

/// Releases its task id on drop
#[derive(Debug)]
pub struct InFlightGuard {
    owner: Arc<InFlight>,
    source_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner.running.lock().remove(&self.source_id);
    }
}
