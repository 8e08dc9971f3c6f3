use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use extract::ExtractError;
use graphstore::StoreError;
use narrate::NarrateError;
use ontology::OntologyError;

/// Request-level error. Validation and not-found map to client statuses with
/// their message intact; everything else is logged with detail and surfaced
/// as a generic 500.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Internal(detail) => {
                error!(detail = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<OntologyError> for ApiError {
    fn from(e: OntologyError) -> Self {
        match e {
            OntologyError::Validation(message) => Self::Validation(message),
            OntologyError::NotFound(id) => Self::NotFound(format!("ontology not found: {}", id)),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(format!("article not found: {}", id)),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<NarrateError> for ApiError {
    fn from(e: NarrateError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = ApiError::Validation("content is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_article_maps_to_not_found() {
        let error: ApiError = StoreError::NotFound("article-1".to_string()).into();
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn extraction_failure_maps_to_internal() {
        let error: ApiError = ExtractError::NoContent.into();
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
