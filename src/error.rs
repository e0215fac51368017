//! Typed errors and HTTP mapping.

use crate::response::error_body;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("no namespace mapped for resource '{0}'")]
    UnmappedResource(String),
    #[error("invalid {kind} identifier: '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// Failure reported by a backend that is not the bundled PostgreSQL client.
    #[error("backend: {0}")]
    Backend(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ProviderError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ProviderError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            ProviderError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ProviderError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ProviderError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ProviderError::Backend(_) => (StatusCode::BAD_GATEWAY, "backend_error"),
            ProviderError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        }
    }
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        (status, Json(error_body(code, self.to_string(), None))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_resource_is_a_server_side_config_error() {
        let err: ProviderError = ConfigError::UnmappedResource("widgets".into()).into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "config_error");
        assert_eq!(err.to_string(), "no namespace mapped for resource 'widgets'");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = ProviderError::Db(sqlx::Error::RowNotFound);
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "not_found"));
    }

    #[test]
    fn backend_failures_map_to_bad_gateway() {
        let err = ProviderError::Backend("connection reset".into());
        assert_eq!(err.status_and_code().0, StatusCode::BAD_GATEWAY);
    }
}
