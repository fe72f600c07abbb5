use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::intake::IntakeError;

/// Error type for HTTP handlers, rendered as the API's
/// `{ "success": false, "message": ... }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Intake(IntakeError::ValidationFailed(errors)) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors,
                }),
            ),
            AppError::Intake(IntakeError::NoFieldsProvided) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": "No fields to update" }),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": message }),
            ),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            AppError::Database(err) => {
                let (status, message) = classify_sqlx_error(&err);
                (status, json!({ "success": false, "message": message }))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Map a sqlx error to a status and a message that is safe to show.
///
/// - unique violation (23505) on the email constraint: 409
/// - value too long for its column (22001): 400
/// - anything else: 500, details only in the log
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String) {
    if let sqlx::Error::Database(db_err) = err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("uq_submissions_email") => {
                return (
                    StatusCode::CONFLICT,
                    "A submission with this email already exists".to_string(),
                );
            }
            Some("23505") => {
                return (StatusCode::CONFLICT, "Duplicate value".to_string());
            }
            Some("22001") => {
                return (
                    StatusCode::BAD_REQUEST,
                    "One or more fields exceed the maximum length".to_string(),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}
