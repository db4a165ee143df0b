//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AdvanceOutcome, CancelOutcome, CourseInfo, EnrollOutcome, EnrollPayload, ErrorResponse,
        MessageOutcome, MessagePayload, QuitOutcome, RegisterPayload, ScoreResponse, StepContent,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register,
        handlers::list_courses,
        handlers::enroll,
        handlers::current_step,
        handlers::advance,
        handlers::score,
        handlers::cancel,
        handlers::quit,
        handlers::message,
    ),
    components(
        schemas(
            RegisterPayload,
            EnrollPayload,
            MessagePayload,
            CourseInfo,
            EnrollOutcome,
            StepContent,
            AdvanceOutcome,
            CancelOutcome,
            QuitOutcome,
            MessageOutcome,
            ScoreResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Math Bot API", description = "Session orchestration for the math learning bot")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/register", post(handlers::register))
        .route("/api/courses", get(handlers::list_courses))
        .route("/api/enroll", post(handlers::enroll))
        .route("/api/step/{user_id}", get(handlers::current_step))
        .route("/api/next/{user_id}", post(handlers::advance))
        .route("/api/score/{user_id}", get(handlers::score))
        .route("/api/cancel/{user_id}", post(handlers::cancel))
        .route("/api/quit/{user_id}", post(handlers::quit))
        .route("/api/message", post(handlers::message))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Create the final router that merges the stateful routes
    // with the stateless routes (like Swagger UI).
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
