//! Signed Session Tokens
//!
//! Stateless HS256 JWTs carrying [`SessionClaims`].
//!
//! Validity depends only on the token bytes, the current time and the
//! signing secret, so every process holding the same secret accepts the
//! same tokens.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default issuer claim
pub const DEFAULT_ISSUER: &str = "leettrack";

/// Default token lifetime (7 days)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Unexpected token issuer")]
    WrongIssuer,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
            _ => TokenError::Malformed,
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by a session token
///
/// Unknown or missing fields are rejected when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Issuer
    pub iss: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

// ============================================================================
// Signer
// ============================================================================

/// Issues and validates HS256 session tokens
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, issuer: impl Into<String>, ttl: Duration) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "iss", "iat", "exp"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            issuer,
            ttl,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from now for the configured TTL
    pub fn issue(&self, subject: &str, email: &str) -> Result<String, TokenError> {
        self.issue_at(subject, email, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl_secs =
            i64::try_from(self.ttl.as_secs()).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let iat = now.timestamp();

        let claims = SessionClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a token against the system clock
    ///
    /// A token is accepted while `now <= exp`.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.decode_with(token, &self.validation)
    }

    /// Validate a token as of `now` instead of the system clock
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, TokenError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;

        let claims = self.decode_with(token, &validation)?;
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn decode_with(
        &self,
        token: &str,
        validation: &Validation,
    ) -> Result<SessionClaims, TokenError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, validation)?.claims;

        if claims.exp < claims.iat {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
