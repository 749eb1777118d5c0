//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod test_runs;

use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;

use flowmail_app::ports::{AutomationRepository, Mailer, RunTracker, TestRunRepository};
use flowmail_domain::automation::Automation;
use flowmail_domain::id::TestRunId;
use flowmail_domain::test_run::TestRun;

use crate::state::AppState;

/// Short acknowledgement body shared by several endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_run_id: Option<TestRunId>,
}

impl MessageBody {
    #[must_use]
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            test_run_id: None,
        }
    }

    #[must_use]
    pub fn with_run(message: &'static str, id: TestRunId) -> Self {
        Self {
            message,
            test_run_id: Some(id),
        }
    }
}

/// A stored entity as the editor reads it: its own fields plus `_id`, a copy
/// of `id` under the key older clients look up.
#[derive(Debug, Serialize)]
pub struct Record<T> {
    #[serde(rename = "_id")]
    legacy_id: String,
    #[serde(flatten)]
    inner: T,
}

impl From<Automation> for Record<Automation> {
    fn from(automation: Automation) -> Self {
        Self {
            legacy_id: automation.id.to_string(),
            inner: automation,
        }
    }
}

impl From<TestRun> for Record<TestRun> {
    fn from(run: TestRun) -> Self {
        Self {
            legacy_id: run.id.to_string(),
            inner: run,
        }
    }
}

/// Wrap each item of a listing.
#[must_use]
pub fn records<T>(items: Vec<T>) -> Vec<Record<T>>
where
    Record<T>: From<T>,
{
    items.into_iter().map(Record::from).collect()
}

/// Build the `/api` sub-router.
pub fn routes<AR, TR, M, T>() -> Router<AppState<AR, TR, M, T>>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<AR, TR, M, T>).post(automations::create::<AR, TR, M, T>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<AR, TR, M, T>)
                .put(automations::update::<AR, TR, M, T>)
                .delete(automations::delete::<AR, TR, M, T>),
        )
        // Test runs
        .route(
            "/automations/{id}/test",
            post(test_runs::start::<AR, TR, M, T>),
        )
        .route(
            "/automations/{id}/test-runs",
            get(test_runs::list::<AR, TR, M, T>),
        )
        .route("/test-runs/{id}", get(test_runs::get::<AR, TR, M, T>))
        .route(
            "/test-runs/{id}/cancel",
            post(test_runs::cancel::<AR, TR, M, T>),
        )
}
