//! Shared application state for axum handlers.

use std::sync::Arc;

use flowmail_app::ports::{AutomationRepository, Mailer, RunTracker, TestRunRepository};
use flowmail_app::services::automation_service::AutomationService;
use flowmail_app::services::test_run_service::TestRunService;

/// Application state shared across all axum handlers.
///
/// Generic over the automation repository, test run repository, mailer and
/// run tracker to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<AR, TR, M, T> {
    /// Automation CRUD service.
    pub automation_service: Arc<AutomationService<AR>>,
    /// Test run start, status and cancellation.
    pub test_run_service: Arc<TestRunService<AR, TR, M, T>>,
}

impl<AR, TR, M, T> Clone for AppState<AR, TR, M, T> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            test_run_service: Arc::clone(&self.test_run_service),
        }
    }
}

impl<AR, TR, M, T> AppState<AR, TR, M, T>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        automation_service: AutomationService<AR>,
        test_run_service: TestRunService<AR, TR, M, T>,
    ) -> Self {
        Self {
            automation_service: Arc::new(automation_service),
            test_run_service: Arc::new(test_run_service),
        }
    }
}
