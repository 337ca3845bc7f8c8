//! REST endpoints for the diagnostic wizard.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::{SubmissionError, WizardError};

use super::manager::LeadWizard;
use super::model::{ContactUpdate, EMPLOYEE_BUCKETS, Industry, ProfileFlag};
use super::registry::SessionRegistry;

/// Shared state for wizard routes.
#[derive(Clone)]
pub struct WizardRouteState {
    pub registry: Arc<SessionRegistry>,
}

/// Build the wizard REST routes.
pub fn wizard_routes(registry: Arc<SessionRegistry>) -> Router {
    let state = WizardRouteState { registry };

    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/advance", post(advance))
        .route("/api/sessions/{id}/industry", post(select_industry))
        .route("/api/sessions/{id}/employees", post(select_employees))
        .route("/api/sessions/{id}/flags", post(set_flag))
        .route("/api/sessions/{id}/contact", post(update_contact))
        .route("/api/sessions/{id}/submit", post(submit))
        .route("/api/sessions/{id}/reset", post(reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

/// Resolve a path id to a live session, or the error response to send.
async fn lookup(state: &WizardRouteState, id: &str) -> Result<Arc<LeadWizard>, Response> {
    let session_id = Uuid::parse_str(id)
        .map_err(|_| error_json(StatusCode::BAD_REQUEST, "Invalid session ID"))?;
    state
        .registry
        .get(session_id)
        .await
        .ok_or_else(|| error_json(StatusCode::NOT_FOUND, "Session not found"))
}

fn wizard_error(err: WizardError) -> Response {
    let status = match err {
        WizardError::WrongStep { .. } => StatusCode::CONFLICT,
        WizardError::UnknownBucket(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_json(status, err.to_string())
}

/// Respond with the session's current view.
async fn view_response(wizard: &LeadWizard, status: StatusCode) -> Response {
    (status, Json(wizard.view().await)).into_response()
}

// ── Health / catalog ────────────────────────────────────────────────────

async fn health(State(state): State<WizardRouteState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lead-wizard",
        "sessions": state.registry.len().await,
    }))
}

/// GET /api/catalog
///
/// The closed option sets each screen offers, plus the incentive programs
/// the engine evaluates, in evaluation order.
async fn catalog(State(state): State<WizardRouteState>) -> impl IntoResponse {
    let industries: Vec<_> = Industry::ALL
        .iter()
        .map(|i| serde_json::json!({"id": i, "label": i.label(), "icon": i.icon()}))
        .collect();
    let flags: Vec<_> = ProfileFlag::ALL
        .iter()
        .map(|f| serde_json::json!({"key": f, "prompt": f.prompt()}))
        .collect();
    let programs: Vec<_> = state
        .registry
        .deps()
        .engine
        .rules()
        .iter()
        .map(|r| {
            serde_json::json!({
                "program": r,
                "program_name": r.program_name(),
                "estimated_value": r.estimated_value(),
            })
        })
        .collect();
    Json(serde_json::json!({
        "industries": industries,
        "employee_buckets": EMPLOYEE_BUCKETS,
        "profile_flags": flags,
        "programs": programs,
    }))
}

// ── Session lifecycle ───────────────────────────────────────────────────

async fn create_session(State(state): State<WizardRouteState>) -> Response {
    let wizard = state.registry.create().await;
    view_response(&wizard, StatusCode::CREATED).await
}

async fn get_session(State(state): State<WizardRouteState>, Path(id): Path<String>) -> Response {
    match lookup(&state, &id).await {
        Ok(wizard) => view_response(&wizard, StatusCode::OK).await,
        Err(resp) => resp,
    }
}

async fn delete_session(
    State(state): State<WizardRouteState>,
    Path(id): Path<String>,
) -> Response {
    let session_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return error_json(StatusCode::BAD_REQUEST, "Invalid session ID"),
    };
    if state.registry.remove(session_id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_json(StatusCode::NOT_FOUND, "Session not found")
    }
}

async fn reset(State(state): State<WizardRouteState>, Path(id): Path<String>) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    wizard.reset().await;
    view_response(&wizard, StatusCode::OK).await
}

// ── Transitions ─────────────────────────────────────────────────────────

async fn advance(State(state): State<WizardRouteState>, Path(id): Path<String>) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    wizard.advance().await;
    view_response(&wizard, StatusCode::OK).await
}

#[derive(Deserialize)]
struct IndustryRequest {
    industry: Industry,
}

async fn select_industry(
    State(state): State<WizardRouteState>,
    Path(id): Path<String>,
    Json(body): Json<IndustryRequest>,
) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    match wizard.select_industry(body.industry).await {
        Ok(_) => view_response(&wizard, StatusCode::OK).await,
        Err(e) => wizard_error(e),
    }
}

#[derive(Deserialize)]
struct EmployeesRequest {
    bucket: String,
}

async fn select_employees(
    State(state): State<WizardRouteState>,
    Path(id): Path<String>,
    Json(body): Json<EmployeesRequest>,
) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    match wizard.select_employee_bucket(&body.bucket).await {
        Ok(_) => view_response(&wizard, StatusCode::OK).await,
        Err(e) => wizard_error(e),
    }
}

#[derive(Deserialize)]
struct FlagRequest {
    flag: ProfileFlag,
    value: bool,
}

async fn set_flag(
    State(state): State<WizardRouteState>,
    Path(id): Path<String>,
    Json(body): Json<FlagRequest>,
) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    match wizard.set_flag(body.flag, body.value).await {
        Ok(()) => view_response(&wizard, StatusCode::OK).await,
        Err(e) => wizard_error(e),
    }
}

async fn update_contact(
    State(state): State<WizardRouteState>,
    Path(id): Path<String>,
    Json(body): Json<ContactUpdate>,
) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    match wizard.update_contact(body).await {
        Ok(()) => view_response(&wizard, StatusCode::OK).await,
        Err(e) => wizard_error(e),
    }
}

// ── Submission ──────────────────────────────────────────────────────────

/// POST /api/sessions/{id}/submit
///
/// A missing identity is a silent no-op (202 with the unchanged view). Store
/// failures are reported generically; the detail only goes to the log.
async fn submit(State(state): State<WizardRouteState>, Path(id): Path<String>) -> Response {
    let wizard = match lookup(&state, &id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    match wizard.submit().await {
        Ok(receipt) => {
            let view = wizard.view().await;
            (
                StatusCode::OK,
                Json(serde_json::json!({"lead_id": receipt.lead_id, "session": view})),
            )
                .into_response()
        }
        Err(SubmissionError::IdentityUnavailable) => {
            view_response(&wizard, StatusCode::ACCEPTED).await
        }
        Err(SubmissionError::MissingFields { fields }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "Missing required contact fields",
                "fields": fields,
            })),
        )
            .into_response(),
        Err(SubmissionError::Store(_)) => error_json(
            StatusCode::SERVICE_UNAVAILABLE,
            "Could not save your details, please try again",
        ),
        Err(
            e @ (SubmissionError::InProgress
            | SubmissionError::AlreadySubmitted
            | SubmissionError::NotAtResultStep { .. }
            | SubmissionError::Superseded),
        ) => error_json(StatusCode::CONFLICT, e.to_string()),
    }
}
