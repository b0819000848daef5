//! Error types for rollcall-api
//!
//! Every failure a request can hit maps to one HTTP status here. Enrichment
//! failures are reported as 502 since an upstream service let us down.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::enrichment::EnrichmentError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// One of the lookup services failed (502)
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// rollcall-common error
    #[error("Common error: {0}")]
    Common(rollcall_common::Error),
}

impl From<rollcall_common::Error> for ApiError {
    fn from(err: rollcall_common::Error) -> Self {
        match err {
            rollcall_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            rollcall_common::Error::Database(e) => ApiError::Database(e),
            other => ApiError::Common(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Enrichment(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) | ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Enrichment(_) => "ENRICHMENT_FAILED",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Common(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let message = match &self {
            ApiError::Enrichment(_) => "Failed to enrich person data".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lookup_client::{LookupError, LookupService};

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err: ApiError =
            rollcall_common::Error::InvalidInput("name must not be empty".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_enrichment_maps_to_bad_gateway() {
        let err: ApiError = EnrichmentError(LookupError::Transport {
            service: LookupService::Age,
            message: "timed out".into(),
        })
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "ENRICHMENT_FAILED");
    }

    #[test]
    fn test_config_error_is_internal() {
        let err: ApiError = rollcall_common::Error::Config("bad".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
