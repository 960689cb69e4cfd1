use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("user with email {0} already exists")]
    DuplicateEmail(String),
    #[error("age must be between 1 and 150, got {0}")]
    InvalidAge(i32),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Stable category string exposed to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::UserNotFound(_) => "RESOURCE_NOT_FOUND",
            DomainError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            DomainError::InvalidAge(_) => "INVALID_AGE",
            DomainError::Validation(_) => "VALIDATION_FAILED",
            DomainError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Body of every non-2xx API response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub timestamp: String,
    pub status: u16,
    /// Reason phrase of `status`.
    pub error: String,
    pub message: String,
    #[serde(rename = "type")]
    #[schema(example = "DUPLICATE_EMAIL")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::DuplicateEmail(_) => StatusCode::CONFLICT,
            DomainError::InvalidAge(_) | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // storage details stay in the logs
        let message = match self {
            DomainError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let field_errors = match self {
            DomainError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };
        let body = ErrorBody {
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message,
            kind: self.kind().to_string(),
            field_errors,
        };
        HttpResponse::build(status).json(body)
    }
}
