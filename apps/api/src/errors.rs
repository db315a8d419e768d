use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::plagiarism::similarity::SimilarityError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// "No similar submission above the threshold" is not an error: it is the
/// `no_match` comparison outcome.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient text: {0}")]
    InsufficientText(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Submission store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SimilarityError> for AppError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::NotFound { .. } => AppError::NotFound(err.to_string()),
            SimilarityError::InsufficientText { .. } => AppError::InsufficientText(err.to_string()),
            SimilarityError::InvalidThreshold(_) => AppError::Validation(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InsufficientText(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_TEXT",
                msg.clone(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::StoreUnavailable(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The submission store could not be accessed".to_string(),
                )
            }
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_FAILED",
                    format!("Could not extract text from the submission: {e}"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_errors_stay_distinguishable() {
        let not_found: AppError = SimilarityError::NotFound {
            roll_no: "X".to_string(),
        }
        .into();
        let short: AppError = SimilarityError::InsufficientText {
            roll_no: "X".to_string(),
            length: 10,
            minimum: 50,
        }
        .into();

        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            short.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_invalid_threshold_is_bad_request() {
        let err: AppError = SimilarityError::InvalidThreshold(150).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
