//! Account Error Types
//!
//! Account-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::token::TokenError;
use thiserror::Error;

use crate::domain::value_object::user_name::UserNameError;

/// Account result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// User name already exists
    #[error("Username already taken")]
    UserNameTaken,

    /// LeetCode user name already linked to another account
    #[error("LeetCode username already linked to another account")]
    LeetcodeNameTaken,

    #[error("User not found")]
    UserNotFound,

    /// Unknown email or wrong password (never says which)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, expired or forged session token
    #[error("Authentication required")]
    SessionInvalid,

    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::EmailTaken | AuthError::UserNameTaken | AuthError::LeetcodeNameTaken => {
                ErrorKind::Conflict
            }
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Infrastructure details stay in the logs; clients get a generic message.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::EmailTaken => AppError::conflict(self.to_string())
                .with_action("Sign in instead, or register with another email"),
            AuthError::UserNameTaken | AuthError::LeetcodeNameTaken => {
                AppError::conflict(self.to_string()).with_action("Choose another username")
            }
            AuthError::Database(e) => AppError::from(e),
            AuthError::Internal(_) => AppError::internal("An unexpected error occurred"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionInvalid => {
                tracing::warn!(error = %self, "Rejected session token");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

/// Unreadable or mistyped request bodies are validation failures
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed
            | TokenError::BadSignature
            | TokenError::Expired
            | TokenError::WrongIssuer => AuthError::SessionInvalid,
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_409() {
        for err in [
            AuthError::EmailTaken,
            AuthError::UserNameTaken,
            AuthError::LeetcodeNameTaken,
        ] {
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert_eq!(err.into_app_error().status_code(), 409);
        }
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(AuthError::UserNotFound.into_app_error().status_code(), 404);
        assert_eq!(AuthError::InvalidCredentials.into_app_error().status_code(), 401);
        assert_eq!(AuthError::SessionInvalid.into_app_error().status_code(), 401);
        assert_eq!(
            AuthError::Validation("bad".into()).into_app_error().status_code(),
            400
        );
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err = AuthError::Internal("pool exhausted at 10.0.0.3".into());
        let app = err.into_app_error();
        assert_eq!(app.status_code(), 500);
        assert!(!app.message().contains("10.0.0.3"));
    }

    #[test]
    fn test_database_errors_use_kernel_mapping() {
        let app = AuthError::Database(sqlx::Error::PoolTimedOut).into_app_error();
        assert_eq!(app.status_code(), 503);

        let app = AuthError::Database(sqlx::Error::Protocol("secret detail".into())).into_app_error();
        assert_eq!(app.status_code(), 500);
        assert!(!app.message().contains("secret detail"));
    }

    #[test]
    fn test_token_error_mapping() {
        assert!(matches!(
            AuthError::from(TokenError::Malformed),
            AuthError::SessionInvalid
        ));
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::SessionInvalid
        ));
        assert!(matches!(
            AuthError::from(TokenError::BadSignature),
            AuthError::SessionInvalid
        ));
        assert!(matches!(
            AuthError::from(TokenError::Encoding("key".into())),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_validation_from_bad_request() {
        let err = AuthError::from(AppError::bad_request("Invalid email format"));
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Invalid email format"));
    }
}
