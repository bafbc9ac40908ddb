use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storyforge_core::error::CoreError;
use storyforge_pipeline::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`PipelineError`] for story
/// creation failures. Implements [`IntoResponse`] to produce the JSON
/// error bodies the clients expect: `{"message": ...}` everywhere, plus
/// an `"error"` detail field on pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `storyforge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx (outside the creation pipeline).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A story creation pipeline failure.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    json!({ "message": format!("{entity} not found") }),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, json!({ "message": msg }))
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, json!({ "message": msg }))
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "message": "An internal error occurred" }),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => match err {
                sqlx::Error::RowNotFound => (
                    StatusCode::NOT_FOUND,
                    json!({ "message": "Resource not found" }),
                ),
                other => {
                    tracing::error!(error = %other, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "message": "An internal error occurred" }),
                    )
                }
            },

            // --- Pipeline errors ---
            AppError::Pipeline(PipelineError::PromptRejected(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "message": msg }))
            }
            AppError::Pipeline(err) => {
                tracing::error!(error = %err, "Story creation pipeline failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "message": "Failed to create story",
                        "error": err.to_string(),
                    }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
