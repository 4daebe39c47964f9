//! User Password Value Object
//!
//! Domain wrappers over `platform::password`.
//!
//! - [`RawPassword`]: user input, zeroized on drop, never printed
//! - [`UserPassword`]: Argon2id PHC string, safe to store
//!
//! Hashing is CPU-bound; the application layer runs it through
//! [`PasswordService`](crate::application::hasher::PasswordService) rather
//! than calling [`UserPassword::from_raw`] on an async worker.

use platform::password::{
    ClearTextPassword, HashParams, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Accept a new password (registration), enforcing the password policy
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::EmptyOrWhitespace => {
                AuthError::Validation("Password is required".to_string())
            }
            other => AuthError::from(other),
        })?;
        Ok(Self(clear_text))
    }

    /// Accept a password typed at login
    ///
    /// No policy check: the stored hash may predate the current policy.
    pub fn for_login(raw: String) -> AuthResult<Self> {
        ClearTextPassword::for_verification(raw)
            .map(Self)
            .map_err(|_| AuthError::Validation("Email and password are required".to_string()))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password (blocking)
    pub fn from_raw(
        raw: &RawPassword,
        params: &HashParams,
        pepper: Option<&[u8]>,
    ) -> AuthResult<Self> {
        let hashed = raw.inner().hash(params, pepper).map_err(|e| match e {
            PasswordHashError::HashingFailed(msg) => {
                AuthError::Internal(format!("Password hashing failed: {}", msg))
            }
            other => AuthError::from(other),
        })?;

        Ok(Self(hashed))
    }

    /// Load a stored PHC string
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in storage".to_string()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash (blocking)
    ///
    /// `Ok(false)` on mismatch; `Err` only for a corrupt stored hash.
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<bool> {
        Ok(self.0.verify(raw.inner(), pepper)?)
    }

    /// True if the hash is cheaper than `target`
    pub fn needs_rehash(&self, target: &HashParams) -> bool {
        self.0.needs_rehash(target)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}
