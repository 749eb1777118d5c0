//! JSON REST handlers for automations.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use flowmail_app::ports::{AutomationRepository, Mailer, RunTracker, TestRunRepository};
use flowmail_app::services::automation_service::{AutomationPatch, NewAutomation};
use flowmail_domain::automation::{Automation, Connection, Step};
use flowmail_domain::id::AutomationId;

use crate::api::{MessageBody, Record, records};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an automation.
#[derive(Deserialize)]
pub struct CreateAutomationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Step>,
    #[serde(default)]
    pub edges: Vec<Connection>,
}

/// Request body for updating an automation; absent fields stay unchanged.
#[derive(Deserialize)]
pub struct UpdateAutomationRequest {
    pub name: Option<String>,
    pub nodes: Option<Vec<Step>>,
    pub edges: Option<Vec<Connection>>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Record<Automation>>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Record<Automation>>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Record<Automation>>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Deleted,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Deleted => Json(MessageBody::new("Automation deleted")).into_response(),
        }
    }
}

/// `GET /api/automations` — list all automations, newest first.
pub async fn list<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
) -> Result<ListResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let automations = state.automation_service.list_automations().await?;
    Ok(ListResponse::Ok(Json(records(automations))))
}

/// `GET /api/automations/{id}` — get automation by ID.
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
    let automation_id = AutomationId::parse(&id)?;
    let automation = state
        .automation_service
        .get_automation(automation_id)
        .await?;
    Ok(GetResponse::Ok(Json(automation.into())))
}

/// `POST /api/automations` — create a new automation.
pub async fn create<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    payload: Result<Json<CreateAutomationRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let created = state
        .automation_service
        .create_automation(NewAutomation {
            name: req.name,
            nodes: req.nodes,
            edges: req.edges,
        })
        .await?;
    Ok(CreateResponse::Created(Json(created.into())))
}

/// `PUT /api/automations/{id}` — partially update an existing automation.
pub async fn update<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAutomationRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let automation_id = AutomationId::parse(&id)?;
    let Json(req) = payload?;
    let updated = state
        .automation_service
        .update_automation(
            automation_id,
            AutomationPatch {
                name: req.name,
                nodes: req.nodes,
                edges: req.edges,
            },
        )
        .await?;
    Ok(GetResponse::Ok(Json(updated.into())))
}

/// `DELETE /api/automations/{id}` — delete an automation and its runs.
pub async fn delete<AR, TR, M, T>(
    State(state): State<AppState<AR, TR, M, T>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let automation_id = AutomationId::parse(&id)?;
    state
        .automation_service
        .delete_automation(automation_id)
        .await?;
    Ok(DeleteResponse::Deleted)
}
