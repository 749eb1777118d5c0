//! JSON REST handlers for test runs.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use flowmail_app::ports::{AutomationRepository, Mailer, RunTracker, TestRunRepository};
use flowmail_domain::id::{AutomationId, TestRunId};
use flowmail_domain::test_run::TestRun;

use crate::api::{MessageBody, Record, records};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for starting a test run.
#[derive(Deserialize)]
pub struct StartTestRunRequest {
    pub email: Option<String>,
}

pub enum StartResponse {
    Started(TestRunId),
}

impl IntoResponse for StartResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Started(id) => Json(MessageBody::with_run("Test run started", id)).into_response(),
        }
    }
}

pub enum ListResponse {
    Ok(Json<Vec<Record<TestRun>>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum GetResponse {
    Ok(Json<Record<TestRun>>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum CancelResponse {
    Accepted(TestRunId),
}

impl IntoResponse for CancelResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(id) => (
                StatusCode::ACCEPTED,
                Json(MessageBody::with_run(
                    "Test run cancellation requested",
                    id,
                )),
            )
                .into_response(),
        }
    }
}

/// `POST /api/automations/{id}/test` — start a test run without waiting for it.
pub async fn start<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    Path(id): Path<String>,
    payload: Result<Json<StartTestRunRequest>, JsonRejection>,
) -> Result<StartResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let automation_id = AutomationId::parse(&id)?;
    let Json(req) = payload?;
    let run = state
        .test_run_service
        .start_test_run(automation_id, req.email.as_deref().unwrap_or_default())
        .await?;
    Ok(StartResponse::Started(run.id))
}

/// `GET /api/automations/{id}/test-runs` — runs of one automation, newest first.
pub async fn list<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    Path(id): Path<String>,
) -> Result<ListResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let automation_id = AutomationId::parse(&id)?;
    let runs = state.test_run_service.list_test_runs(automation_id).await?;
    Ok(ListResponse::Ok(Json(records(runs))))
}

/// `GET /api/test-runs/{id}` — current status of one run.
pub async fn get<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let run_id = TestRunId::parse(&id)?;
    let run = state.test_run_service.get_test_run(run_id).await?;
    Ok(GetResponse::Ok(Json(run.into())))
}

/// `POST /api/test-runs/{id}/cancel` — ask a live run to stop.
pub async fn cancel<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    Path(id): Path<String>,
) -> Result<CancelResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let run_id = TestRunId::parse(&id)?;
    let run = state.test_run_service.cancel_test_run(run_id).await?;
    Ok(CancelResponse::Accepted(run.id))
}
