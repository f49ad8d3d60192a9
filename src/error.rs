use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::repo::StoreError;

/// Failures of the auth core, mapped onto HTTP responses at the edge.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Only job posters can access this resource")]
    Forbidden,

    #[error("credential store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingField(_)
            | AuthError::PasswordTooShort
            | AuthError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client. Server-side faults never leak their cause.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                "Something went wrong, please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::EmailTaken,
            StoreError::Constraint(msg) => AuthError::ValidationFailed(msg),
            StoreError::Unavailable(source) => AuthError::StoreUnavailable(source),
        }
    }
}

/// A body that is not JSON, or has a field of the wrong type, is a client error
/// like any other and keeps the `{error}` shape.
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::ValidationFailed(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(AuthError::MissingField("Email is required").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::PasswordTooShort.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::StoreUnavailable(anyhow::anyhow!("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn server_faults_hide_details() {
        let err = AuthError::StoreUnavailable(anyhow::anyhow!("connection refused at 10.0.0.5"));
        assert!(!err.public_message().contains("10.0.0.5"));
        let err = AuthError::Internal(anyhow::anyhow!("join error"));
        assert!(!err.public_message().contains("join"));
    }

    #[test]
    fn store_errors_map_onto_auth_errors() {
        assert!(matches!(AuthError::from(StoreError::DuplicateEmail), AuthError::EmailTaken));
        match AuthError::from(StoreError::Constraint("bio too long".into())) {
            AuthError::ValidationFailed(msg) => assert_eq!(msg, "bio too long"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_field_message_is_passed_through() {
        assert_eq!(
            AuthError::MissingField("First name, email, and password are required").to_string(),
            "First name, email, and password are required"
        );
    }
}
