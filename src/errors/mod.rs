//! Error handling module for the programs backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Machine-readable keys carried by `InvalidRequest` alerts.
pub mod keys {
    pub const ID_EXISTS: &str = "idexists";
    pub const ID_NULL: &str = "idnull";
    pub const ID_INVALID: &str = "idinvalid";
    pub const ID_NOT_FOUND: &str = "idnotfound";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Client-supplied identifier problem, reported as an entity alert
    InvalidRequest {
        message: String,
        entity_name: &'static str,
        error_key: &'static str,
    },
    /// Resource not found
    NotFound(String),
    /// Required field missing from the payload
    Validation(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
    /// Malformed body or query
    BadRequest(String),
}

impl AppError {
    pub fn invalid_request(
        message: impl Into<String>,
        entity_name: &'static str,
        error_key: &'static str,
    ) -> Self {
        AppError::InvalidRequest {
            message: message.into(),
            entity_name,
            error_key,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::InvalidRequest { .. } => codes::INVALID_REQUEST,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::InvalidRequest { message, .. } => message.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<axum_extra::extract::QueryRejection> for AppError {
    fn from(rejection: axum_extra::extract::QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {}", rejection);
        AppError::BadRequest(rejection.to_string())
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let (entity_name, error_key) = match error {
            AppError::InvalidRequest {
                entity_name,
                error_key,
                ..
            } => (
                Some(entity_name.to_string()),
                Some(format!("error.{}", error_key)),
            ),
            _ => (None, None),
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                entity_name,
                error_key,
            },
        }
    }
}

/// Wrapper type for errors that carry the alert header prefix.
pub struct AppErrorWithAlert {
    pub error: AppError,
    pub app_name: String,
}

impl AppErrorWithAlert {
    pub fn new(error: AppError, app_name: &str) -> Self {
        Self {
            error,
            app_name: app_name.to_string(),
        }
    }
}

impl IntoResponse for AppErrorWithAlert {
    fn into_response(self) -> Response {
        let status = self.error.status_code();

        // Absent resources are answered with a bare status
        if let AppError::NotFound(_) = self.error {
            return status.into_response();
        }

        let body = ErrorResponse::new(&self.error);
        let mut response = (status, Json(body)).into_response();

        if let AppError::InvalidRequest {
            entity_name,
            error_key,
            ..
        } = &self.error
        {
            if self.app_name.is_empty() {
                return response;
            }
            let headers = response.headers_mut();
            let app = self.app_name.to_lowercase();
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(format!("x-{}-error", app)),
                HeaderValue::try_from(format!("error.{}", error_key)),
            ) {
                headers.insert(name, value);
            }
            if let Ok(name) = HeaderName::try_from(format!("x-{}-params", app)) {
                headers.insert(name, HeaderValue::from_static(*entity_name));
            }
        }

        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        AppErrorWithAlert {
            error: self,
            app_name: String::new(),
        }
        .into_response()
    }
}
