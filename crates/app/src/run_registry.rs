//! Registry of live runs, keyed by run id.
//!
//! Each spawned run owns a [`CancellationToken`]; the registry keeps a clone
//! so an API call can cancel it. A run is closed to cancels just before it
//! records its outcome and removed once its task is done.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use flowmail_domain::id::TestRunId;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct RunRegistry {
    /// `None` once the run has stopped accepting cancels.
    live: Mutex<HashMap<TestRunId, Option<CancellationToken>>>,
}

impl RunRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new live run and return the token its task should watch.
    pub fn register(&self, id: TestRunId) -> CancellationToken {
        let token = CancellationToken::new();
        self.lock().insert(id, Some(token.clone()));
        token
    }

    /// Refuse further cancels for a run that is about to record its outcome.
    pub fn close(&self, id: TestRunId) {
        if let Some(entry) = self.lock().get_mut(&id) {
            *entry = None;
        }
    }

    /// Forget a run once its task is done.
    pub fn remove(&self, id: TestRunId) {
        self.lock().remove(&id);
    }

    /// Request cancellation. Returns `false` when the run is not live here.
    pub fn cancel(&self, id: TestRunId) -> bool {
        match self.lock().get(&id) {
            Some(Some(token)) => {
                token.cancel();
                true
            }
            Some(None) | None => false,
        }
    }

    #[must_use]
    pub fn is_live(&self, id: TestRunId) -> bool {
        matches!(self.lock().get(&id), Some(Some(_)))
    }

    /// Runs whose task has not finished yet, closed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cancel every live run, e.g. on shutdown.
    pub fn cancel_all(&self) {
        for token in self.lock().values().flatten() {
            token.cancel();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TestRunId, Option<CancellationToken>>> {
        // The map holds no invariant a panicking holder could break.
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
