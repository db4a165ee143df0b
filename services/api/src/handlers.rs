//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for the chat
//! bot's session operations. It uses `utoipa` doc comments to generate
//! OpenAPI documentation. Handlers stay thin: extraction and status-code
//! mapping here, all state-machine logic in the orchestrator.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mathbot_core::error::{BotError, Resource};
use std::sync::Arc;
use tracing::error;

use crate::{
    models::{
        AdvanceOutcome, CancelOutcome, CourseInfo, EnrollOutcome, EnrollPayload, ErrorResponse,
        MessageOutcome, MessagePayload, QuitOutcome, RegisterPayload, ScoreResponse, StepContent,
    },
    state::AppState,
};

/// Wraps orchestrator errors for translation into HTTP responses.
pub struct ApiError(BotError);

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self.0 {
            BotError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, "invalid_input", message)
            }
            BotError::NotFound(Resource::User) => (
                StatusCode::NOT_FOUND,
                "no_user",
                "no such user".to_string(),
            ),
            BotError::NotFound(Resource::Course) => (
                StatusCode::NOT_FOUND,
                "no_course",
                "no such course".to_string(),
            ),
            BotError::NotEnrolled => (
                StatusCode::PRECONDITION_FAILED,
                "not_enrolled",
                "user is not enrolled in a course".to_string(),
            ),
            BotError::Conflict => (
                StatusCode::CONFLICT,
                "conflict",
                "record already exists".to_string(),
            ),
            BotError::Internal(err) => {
                error!("Internal Server Error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorResponse {
                kind: kind.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User registered successfully"),
        (status = 400, description = "Invalid user name", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .orchestrator
        .register(payload.user_id, &payload.user_name)
        .await?;
    Ok(StatusCode::CREATED)
}

/// List all available courses.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "List of courses", body = [CourseInfo]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseInfo>>, ApiError> {
    let courses = state.orchestrator.courses().await?;
    Ok(Json(courses))
}

/// Enroll a user into a course by name.
#[utoipa::path(
    post,
    path = "/api/enroll",
    request_body = EnrollPayload,
    responses(
        (status = 200, description = "Enrollment outcome", body = EnrollOutcome),
        (status = 404, description = "User or course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnrollPayload>,
) -> Result<Json<EnrollOutcome>, ApiError> {
    let outcome = state
        .orchestrator
        .enroll(payload.user_id, &payload.course_name)
        .await?;
    Ok(Json(outcome))
}

/// Get the content due at the user's current step.
#[utoipa::path(
    get,
    path = "/api/step/{user_id}",
    responses(
        (status = 200, description = "Current step content", body = StepContent),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 412, description = "User is not enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("user_id" = i64, Path, description = "The user's ID")
    )
)]
pub async fn current_step(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<StepContent>, ApiError> {
    let content = state.orchestrator.current_step(user_id).await?;
    Ok(Json(content))
}

/// Advance the user to their next step.
#[utoipa::path(
    post,
    path = "/api/next/{user_id}",
    responses(
        (status = 200, description = "Advancement outcome", body = AdvanceOutcome),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 412, description = "User is not enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("user_id" = i64, Path, description = "The user's ID")
    )
)]
pub async fn advance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<AdvanceOutcome>, ApiError> {
    let outcome = state.orchestrator.advance(user_id).await?;
    Ok(Json(outcome))
}

/// Get the user's accumulated test score.
#[utoipa::path(
    get,
    path = "/api/score/{user_id}",
    responses(
        (status = 200, description = "The user's score", body = ScoreResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("user_id" = i64, Path, description = "The user's ID")
    )
)]
pub async fn score(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let score = state.orchestrator.score(user_id).await?;
    Ok(Json(ScoreResponse { score }))
}

/// Cancel the user's current course or test.
#[utoipa::path(
    post,
    path = "/api/cancel/{user_id}",
    responses(
        (status = 200, description = "What was cancelled", body = CancelOutcome),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("user_id" = i64, Path, description = "The user's ID")
    )
)]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<CancelOutcome>, ApiError> {
    let outcome = state.orchestrator.cancel(user_id).await?;
    Ok(Json(outcome))
}

/// Request account deletion; a second call or an affirmative message confirms it.
#[utoipa::path(
    post,
    path = "/api/quit/{user_id}",
    responses(
        (status = 200, description = "Quit outcome", body = QuitOutcome),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("user_id" = i64, Path, description = "The user's ID")
    )
)]
pub async fn quit(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<QuitOutcome>, ApiError> {
    let outcome = state.orchestrator.quit(user_id).await?;
    Ok(Json(outcome))
}

/// Submit a free-text message for routing.
#[utoipa::path(
    post,
    path = "/api/message",
    request_body = MessagePayload,
    responses(
        (status = 200, description = "How the message was routed", body = MessageOutcome),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<MessageOutcome>, ApiError> {
    let outcome = state
        .orchestrator
        .submit_message(payload.user_id, &payload.message)
        .await?;
    Ok(Json(outcome))
}
