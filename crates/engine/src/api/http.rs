//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use dicetally_domain::{DiceSetId, DieKind, DomainError, UserId};
use dicetally_shared::{
    CreateDiceSetRequest, DiceSetSummaryDto, FaceInputRequest, PinFaceRequest, TrackerView,
};

use super::auth::CurrentUser;
use super::views::{dice_set_dto, tracker_view};
use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::tracker::FaceEdit;
use crate::use_cases::{DiceSetError, TrackerError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/dice-sets", get(list_dice_sets).post(create_dice_set))
        .route("/api/dice-sets/{id}", get(open_tracker))
        .route("/api/dice-sets/{id}/tracker", delete(close_tracker))
        .route(
            "/api/dice-sets/{id}/dice/{kind}/faces/{index}",
            put(set_face_input),
        )
        .route(
            "/api/dice-sets/{id}/dice/{kind}/faces/{index}/increment",
            post(increment_face),
        )
        .route(
            "/api/dice-sets/{id}/dice/{kind}/faces/{index}/decrement",
            post(decrement_face),
        )
        .route("/api/dice-sets/{id}/dice/{kind}/pin", post(pin_face))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Dice sets
// =============================================================================

async fn list_dice_sets(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<DiceSetSummaryDto>>, ApiError> {
    let sets = app.use_cases.dice_sets.list.execute(user_id).await?;
    Ok(Json(sets.iter().map(dice_set_dto).collect()))
}

async fn create_dice_set(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<CreateDiceSetRequest>,
) -> Result<(StatusCode, Json<DiceSetSummaryDto>), ApiError> {
    let created = app
        .use_cases
        .dice_sets
        .create
        .execute(user_id, &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(dice_set_dto(&created))))
}

// =============================================================================
// Tracker
// =============================================================================

async fn open_tracker(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TrackerView>, ApiError> {
    let snapshot = app
        .use_cases
        .tracker
        .open
        .execute(user_id, DiceSetId::from_uuid(id))
        .await?;
    Ok(Json(tracker_view(&snapshot)))
}

async fn close_tracker(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .tracker
        .close
        .execute(user_id, DiceSetId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_face_input(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Path((id, kind, index)): Path<(Uuid, String, usize)>,
    Json(req): Json<FaceInputRequest>,
) -> Result<Json<TrackerView>, ApiError> {
    edit_face(&app, user_id, id, &kind, index, FaceEdit::Input(req.value)).await
}

async fn increment_face(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Path((id, kind, index)): Path<(Uuid, String, usize)>,
) -> Result<Json<TrackerView>, ApiError> {
    edit_face(&app, user_id, id, &kind, index, FaceEdit::Increment).await
}

async fn decrement_face(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Path((id, kind, index)): Path<(Uuid, String, usize)>,
) -> Result<Json<TrackerView>, ApiError> {
    edit_face(&app, user_id, id, &kind, index, FaceEdit::Decrement).await
}

async fn edit_face(
    app: &App,
    user_id: UserId,
    id: Uuid,
    kind: &str,
    index: usize,
    edit: FaceEdit,
) -> Result<Json<TrackerView>, ApiError> {
    let kind: DieKind = kind.parse()?;
    let snapshot = app
        .use_cases
        .tracker
        .edit_face
        .execute(user_id, DiceSetId::from_uuid(id), kind, index, edit)
        .await?;
    Ok(Json(tracker_view(&snapshot)))
}

async fn pin_face(
    State(app): State<Arc<App>>,
    CurrentUser(user_id): CurrentUser,
    Path((id, kind)): Path<(Uuid, String)>,
    Json(req): Json<PinFaceRequest>,
) -> Result<Json<TrackerView>, ApiError> {
    let kind: DieKind = kind.parse()?;
    let snapshot = app
        .use_cases
        .tracker
        .pin
        .execute(user_id, DiceSetId::from_uuid(id), kind, req.index)
        .await?;
    Ok(Json(tracker_view(&snapshot)))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidFaceIndex { .. }
            | DomainError::UnknownDieKind(_)
            | DomainError::Validation(_)
            | DomainError::Parse(_) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DiceSetError> for ApiError {
    fn from(e: DiceSetError) -> Self {
        match e {
            DiceSetError::Validation(e) => e.into(),
            DiceSetError::Repo(e) => e.into(),
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::DiceSetNotFound(_) | TrackerError::TrackerNotOpen(_) => {
                ApiError::NotFound
            }
            TrackerError::Domain(e) => e.into(),
            TrackerError::Repo(e) => e.into(),
        }
    }
}
