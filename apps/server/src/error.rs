//! Error types for the marketplace server

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation problem reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Validation error")]
    InvalidFields(Vec<FieldIssue>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: i32, actual: i32 },

    #[error("Too many requests")]
    RateLimited,

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidFields(vec![FieldIssue::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidFields(_) | Error::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::VersionConflict { .. } => StatusCode::PRECONDITION_FAILED,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::Database(_)
            | Error::UpdateFailed(_)
            | Error::Internal(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error originates from infrastructure rather than the caller.
    pub fn is_infrastructure(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues: Vec<FieldIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldIssue::new(field.to_string(), message)
                })
            })
            .collect();
        // field_errors() is backed by a HashMap
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Error::InvalidFields(issues)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Error::InvalidFields(issues) => json!({
                "success": false,
                "error": "Validation error",
                "details": issues,
            }),
            Error::UpdateFailed(cause) => {
                tracing::error!(error = %cause, "Profile update failed");
                json!({ "success": false, "error": "Failed to update installer" })
            }
            _ if self.is_infrastructure() => {
                tracing::error!("Internal error: {}", self);
                json!({ "success": false, "error": "Internal server error" })
            }
            _ => json!({ "success": false, "error": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, message = "too short"))]
        name: String,
        #[validate(range(min = 1, max = 5))]
        rating: i32,
    }

    #[test]
    fn validation_errors_become_sorted_field_issues() {
        let sample = Sample {
            name: "a".to_string(),
            rating: 9,
        };
        let err: Error = sample.validate().unwrap_err().into();
        match err {
            Error::InvalidFields(issues) => {
                assert_eq!(issues.len(), 2);
                assert_eq!(issues[0], FieldIssue::new("name", "too short"));
                assert_eq!(issues[1].field, "rating");
                assert_eq!(issues[1].message, "range");
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(Error::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Conflict("dup".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::not_found("Installer").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::UpdateFailed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(Error::Internal("x".into()).is_infrastructure());
        assert!(!Error::RateLimited.is_infrastructure());
    }

    #[test]
    fn infrastructure_errors_hide_their_cause() {
        let response = Error::UpdateFailed("relation does not exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
