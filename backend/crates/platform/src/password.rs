//! Password Hashing and Verification
//!
//! - Argon2id hashing with a configurable work factor
//! - PHC string output (algorithm, parameters and salt travel with the hash)
//! - Zeroization of clear text and peppered buffers
//! - Constant-time comparison (inside `argon2`)
//!
//! Raising the work factor is backward compatible: verification always uses
//! the parameters embedded in the stored hash, and [`HashedPassword::needs_rehash`]
//! reports hashes created with weaker settings.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Default Argon2id time cost (iterations)
pub const DEFAULT_WORK_FACTOR: u32 = 2;

/// Default Argon2id memory cost in KiB (19 MiB, OWASP baseline)
pub const DEFAULT_MEMORY_KIB: u32 = 19_456;

/// Default Argon2id lane count
pub const DEFAULT_PARALLELISM: u32 = 1;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violations (registration / password change)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common")]
    CommonPassword,
}

/// Password hashing/verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid hash parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Empty password or empty stored hash
    #[error("Missing password or hash")]
    MissingInput,
}

// ============================================================================
// Hash Parameters
// ============================================================================

/// Argon2id cost parameters
///
/// `work_factor` is the time cost (number of passes over memory). It is the
/// knob operators turn to make hashing more expensive over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    pub work_factor: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            memory_kib: DEFAULT_MEMORY_KIB,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HashParams {
    pub fn new(work_factor: u32, memory_kib: u32, parallelism: u32) -> Self {
        Self {
            work_factor,
            memory_kib,
            parallelism,
        }
    }

    /// Check the parameters against Argon2's limits
    pub fn validate(&self) -> Result<(), PasswordHashError> {
        self.argon2().map(|_| ())
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(self.memory_kib, self.work_factor, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, zeroized on drop
///
/// Not `Clone`; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Accept a new password, enforcing the password policy
    ///
    /// Input is NFKC-normalized before any check, and length is counted in
    /// Unicode code points.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_password(&normalized) {
            return Err(PasswordPolicyError::CommonPassword);
        }

        Ok(Self(normalized))
    }

    /// Accept a password for verification only
    ///
    /// Policy is not applied: a stored hash may predate the current policy.
    /// Only emptiness is rejected.
    pub fn for_verification(raw: String) -> Result<Self, PasswordHashError> {
        if raw.is_empty() {
            return Err(PasswordHashError::MissingInput);
        }
        Ok(Self(raw.nfkc().collect()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut combined = Zeroizing::new(self.as_bytes().to_vec());
        if let Some(p) = pepper {
            combined.extend_from_slice(p);
        }
        combined
    }

    /// Hash with Argon2id and a fresh random salt
    pub fn hash(
        &self,
        params: &HashParams,
        pepper: Option<&[u8]>,
    ) -> Result<HashedPassword, PasswordHashError> {
        let argon2 = params.argon2()?;
        let salt = SaltString::generate(&mut OsRng);

        let hash = argon2
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a stored PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        if hash.is_empty() {
            return Err(PasswordHashError::MissingInput);
        }
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// `Ok(false)` on mismatch. `Err` only when the stored hash cannot be
    /// parsed. The parameters recorded in the hash are used, not the
    /// currently configured ones.
    pub fn verify(
        &self,
        password: &ClearTextPassword,
        pepper: Option<&[u8]>,
    ) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(&self.hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

        match Argon2::default().verify_password(&password.peppered(pepper), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordHashError::HashingFailed(e.to_string())),
        }
    }

    /// True if the hash is not Argon2id or is cheaper than `target`
    pub fn needs_rehash(&self, target: &HashParams) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(current) => {
                current.t_cost() < target.work_factor
                    || current.m_cost() < target.memory_kib
                    || current.p_cost() < target.parallelism
            }
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_common_password(password: &str) -> bool {
    const COMMON_PASSWORDS: &[&str] = &[
        "123456",
        "1234567",
        "12345678",
        "123456789",
        "1234567890",
        "654321",
        "111111",
        "000000",
        "abc123",
        "qwerty",
        "qwerty123",
        "qwertyuiop",
        "password",
        "password1",
        "password123",
        "letmein",
        "welcome",
        "iloveyou",
        "monkey",
        "dragon",
        "trustno1",
    ];

    let lower = password.to_lowercase();
    COMMON_PASSWORDS.contains(&lower.as_str())
}

// ============================================================================
// Tests
// ============================================================================
