//! Application Configuration
//!
//! Token signing and password hashing settings, read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `AUTH_TOKEN_SECRET` | required, at least 32 bytes |
//! | `AUTH_TOKEN_TTL` | `7d` |
//! | `AUTH_TOKEN_ISSUER` | `leettrack` |
//! | `PASSWORD_WORK_FACTOR` | `2` |
//! | `PASSWORD_MEMORY_KIB` | `19456` |
//! | `PASSWORD_PARALLELISM` | `1` |
//! | `PASSWORD_PEPPER` | unset |
//! | `PASSWORD_MAX_CONCURRENT_HASHES` | `4` |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::password::HashParams;
use platform::token::{DEFAULT_ISSUER, DEFAULT_TOKEN_TTL, MIN_SECRET_LENGTH, TokenSigner};
use thiserror::Error;

/// Default number of hashes allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_HASHES: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AUTH_TOKEN_SECRET is not set")]
    MissingSecret,

    #[error("AUTH_TOKEN_SECRET must be at least {min} bytes (got {actual})")]
    SecretTooShort { min: usize, actual: usize },

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for session tokens
    pub token_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub token_issuer: String,
    /// Argon2id cost for new hashes
    pub hash_params: HashParams,
    /// Application-wide secret appended to passwords before hashing
    pub password_pepper: Option<Vec<u8>>,
    pub max_concurrent_hashes: usize,
}

impl AuthConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_secret = lookup("AUTH_TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?
            .into_bytes();

        if token_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LENGTH,
                actual: token_secret.len(),
            });
        }

        let token_ttl = match lookup("AUTH_TOKEN_TTL") {
            Some(raw) => humantime::parse_duration(raw.trim()).map_err(|e| {
                ConfigError::Invalid {
                    var: "AUTH_TOKEN_TTL",
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_TOKEN_TTL,
        };

        if token_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                var: "AUTH_TOKEN_TTL",
                reason: "must be greater than zero".to_string(),
            });
        }

        let token_issuer = lookup("AUTH_TOKEN_ISSUER")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let defaults = HashParams::default();
        let hash_params = HashParams::new(
            parse_or(&lookup, "PASSWORD_WORK_FACTOR", defaults.work_factor)?,
            parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            parse_or(&lookup, "PASSWORD_PARALLELISM", defaults.parallelism)?,
        );
        if let Err(e) = hash_params.validate() {
            return Err(ConfigError::Invalid {
                var: invalid_hash_var(&hash_params),
                reason: e.to_string(),
            });
        }

        let password_pepper = lookup("PASSWORD_PEPPER")
            .filter(|s| !s.is_empty())
            .map(String::into_bytes);

        let max_concurrent_hashes = parse_or(
            &lookup,
            "PASSWORD_MAX_CONCURRENT_HASHES",
            DEFAULT_MAX_CONCURRENT_HASHES,
        )?;
        if max_concurrent_hashes == 0 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_MAX_CONCURRENT_HASHES",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            token_secret,
            token_ttl,
            token_issuer,
            hash_params,
            password_pepper,
            max_concurrent_hashes,
        })
    }

    /// Create config with a random token secret (for development and tests)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(MIN_SECRET_LENGTH),
            token_ttl: DEFAULT_TOKEN_TTL,
            token_issuer: DEFAULT_ISSUER.to_string(),
            hash_params: HashParams::default(),
            password_pepper: None,
            max_concurrent_hashes: DEFAULT_MAX_CONCURRENT_HASHES,
        }
    }

    /// Build the token signer for this configuration
    pub fn token_signer(&self) -> TokenSigner {
        TokenSigner::new(
            self.token_secret.clone(),
            self.token_issuer.clone(),
            self.token_ttl,
        )
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("token_issuer", &self.token_issuer)
            .field("hash_params", &self.hash_params)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_concurrent_hashes", &self.max_concurrent_hashes)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Name the variable that makes `params` unusable
///
/// Each knob is checked against the defaults for the others; a memory size
/// too small for the requested parallelism is reported as a memory error.
fn invalid_hash_var(params: &HashParams) -> &'static str {
    let defaults = HashParams::default();
    let fails_alone = |p: HashParams| p.validate().is_err();

    if fails_alone(HashParams {
        work_factor: params.work_factor,
        ..defaults
    }) {
        "PASSWORD_WORK_FACTOR"
    } else if fails_alone(HashParams {
        parallelism: params.parallelism,
        ..defaults
    }) {
        "PASSWORD_PARALLELISM"
    } else {
        "PASSWORD_MEMORY_KIB"
    }
}
