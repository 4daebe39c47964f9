//! Session Façade
//!
//! Answers "who is calling, if anyone" on top of the stateless token signer.
//! An invalid or missing session is the common case, so lookups return
//! `Option` rather than an error.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use platform::client::extract_bearer_token;
use platform::token::{SessionClaims, TokenSigner};

use crate::application::config::AuthConfig;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// Authenticated caller, decoded from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
}

impl Identity {
    fn from_claims(claims: &SessionClaims) -> Option<Self> {
        Some(Self {
            user_id: claims.sub.parse().ok()?,
            email: Email::new(&claims.email).ok()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionFacade {
    signer: TokenSigner,
}

impl SessionFacade {
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_signer())
    }

    /// Mint a session token for a user
    pub fn create_session(&self, user_id: &UserId, email: &Email) -> AuthResult<String> {
        let token = self.signer.issue(&user_id.to_string(), email.as_str())?;
        tracing::debug!(user_id = %user_id, "Session token issued");
        Ok(token)
    }

    /// Identity carried by `token`, or `None` if it is not currently valid
    pub fn validate_session(&self, token: &str) -> Option<Identity> {
        self.validate_session_at(token, Utc::now())
    }

    pub fn validate_session_at(&self, token: &str, now: DateTime<Utc>) -> Option<Identity> {
        match self.signer.validate_at(token, now) {
            Ok(claims) => Identity::from_claims(&claims),
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        }
    }

    /// End a session
    ///
    /// Tokens are not tracked server-side, so this only acknowledges the
    /// request; the token stays valid until it expires.
    pub fn destroy_session(&self, token: &str) -> bool {
        if let Some(identity) = self.validate_session(token) {
            tracing::info!(user_id = %identity.user_id, "User signed out");
        }
        true
    }

    /// Resolve the caller from an `Authorization: Bearer` header
    pub fn resolve_from_headers(&self, headers: &HeaderMap) -> Option<Identity> {
        extract_bearer_token(headers).and_then(|token| self.validate_session(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::AUTHORIZATION;
    use platform::token::{DEFAULT_ISSUER, DEFAULT_TOKEN_TTL};

    fn facade() -> SessionFacade {
        SessionFacade::from_config(&AuthConfig::with_random_secret())
    }

    #[test]
    fn test_create_and_validate() {
        let facade = facade();
        let user_id = UserId::new();
        let email = Email::new("a@x.com").unwrap();

        let token = facade.create_session(&user_id, &email).unwrap();
        let identity = facade.validate_session(&token).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, email);
    }

    #[test]
    fn test_invalid_tokens_are_none() {
        let facade = facade();
        assert!(facade.validate_session("").is_none());
        assert!(facade.validate_session("garbage").is_none());

        // Signed by another secret
        let other = facade_token_from(&AuthConfig::with_random_secret());
        assert!(facade.validate_session(&other).is_none());
    }

    #[test]
    fn test_expired_token_is_none() {
        let facade = facade();
        let token = facade
            .create_session(&UserId::new(), &Email::new("a@x.com").unwrap())
            .unwrap();
        let later = Utc::now() + chrono::Duration::days(8);
        assert!(facade.validate_session_at(&token, later).is_none());
    }

    #[test]
    fn test_non_uuid_subject_is_none() {
        let config = AuthConfig::with_random_secret();
        let signer = TokenSigner::new(config.token_secret.clone(), DEFAULT_ISSUER, DEFAULT_TOKEN_TTL);
        let token = signer.issue("not-a-uuid", "a@x.com").unwrap();
        assert!(SessionFacade::new(signer).validate_session(&token).is_none());
    }

    #[test]
    fn test_destroy_always_true() {
        let facade = facade();
        assert!(facade.destroy_session("anything"));
        let token = facade
            .create_session(&UserId::new(), &Email::new("a@x.com").unwrap())
            .unwrap();
        assert!(facade.destroy_session(&token));
        // Stateless: still valid afterwards
        assert!(facade.validate_session(&token).is_some());
    }

    #[test]
    fn test_resolve_from_headers() {
        let facade = facade();
        let user_id = UserId::new();
        let token = facade
            .create_session(&user_id, &Email::new("a@x.com").unwrap())
            .unwrap();

        let mut headers = HeaderMap::new();
        assert!(facade.resolve_from_headers(&headers).is_none());

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(facade.resolve_from_headers(&headers).unwrap().user_id, user_id);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(facade.resolve_from_headers(&headers).is_none());
    }

    fn facade_token_from(config: &AuthConfig) -> String {
        SessionFacade::from_config(config)
            .create_session(&UserId::new(), &Email::new("a@x.com").unwrap())
            .unwrap()
    }
}
