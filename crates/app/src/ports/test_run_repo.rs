//! Test run ports — creating run records and recording how they ended.

use std::future::Future;
use std::sync::Arc;

use flowmail_domain::error::FlowMailError;
use flowmail_domain::id::{AutomationId, TestRunId};
use flowmail_domain::test_run::TestRun;
use flowmail_domain::time::Timestamp;

/// Repository for creating and querying [`TestRun`]s.
pub trait TestRunRepository {
    /// Persist a new run.
    fn create(&self, run: TestRun) -> impl Future<Output = Result<TestRun, FlowMailError>> + Send;

    /// Get a run by its unique identifier.
    fn get_by_id(
        &self,
        id: TestRunId,
    ) -> impl Future<Output = Result<Option<TestRun>, FlowMailError>> + Send;

    /// Get every run of one automation, newest first.
    fn list_by_automation(
        &self,
        automation_id: AutomationId,
    ) -> impl Future<Output = Result<Vec<TestRun>, FlowMailError>> + Send;
}

/// Records the terminal state of a run.
///
/// Implementations only change runs that are still `running`; a call on a
/// run that already ended is a no-op.
pub trait RunTracker {
    /// Mark a run `finished` at `finished_at`.
    fn mark_finished(
        &self,
        id: TestRunId,
        finished_at: Timestamp,
    ) -> impl Future<Output = Result<(), FlowMailError>> + Send;

    /// Mark a run `cancelled` at `at`.
    fn mark_cancelled(
        &self,
        id: TestRunId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), FlowMailError>> + Send;
}

impl<T: TestRunRepository + Send + Sync> TestRunRepository for Arc<T> {
    fn create(&self, run: TestRun) -> impl Future<Output = Result<TestRun, FlowMailError>> + Send {
        (**self).create(run)
    }

    fn get_by_id(
        &self,
        id: TestRunId,
    ) -> impl Future<Output = Result<Option<TestRun>, FlowMailError>> + Send {
        (**self).get_by_id(id)
    }

    fn list_by_automation(
        &self,
        automation_id: AutomationId,
    ) -> impl Future<Output = Result<Vec<TestRun>, FlowMailError>> + Send {
        (**self).list_by_automation(automation_id)
    }
}

impl<T: RunTracker + Send + Sync> RunTracker for Arc<T> {
    fn mark_finished(
        &self,
        id: TestRunId,
        finished_at: Timestamp,
    ) -> impl Future<Output = Result<(), FlowMailError>> + Send {
        (**self).mark_finished(id, finished_at)
    }

    fn mark_cancelled(
        &self,
        id: TestRunId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), FlowMailError>> + Send {
        (**self).mark_cancelled(id, at)
    }
}
