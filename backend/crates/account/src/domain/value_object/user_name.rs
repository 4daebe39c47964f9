//! User Name Value Object
//!
//! Public handle shown on profiles and leaderboards.
//!
//! ## Rules
//! - NFKC normalized, then trimmed
//! - 3 to 50 characters from `A-Z a-z 0-9 _ -`
//! - Case is preserved for display; uniqueness uses the lowercase form

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Username is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("Username is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error(
        "Invalid character '{char}' at position {position}. Only letters, digits, _ and - are allowed"
    )]
    InvalidCharacter { char: char, position: usize },
}

/// Validated user name
///
/// * `original` - trimmed, NFKC-normalized input (case preserved)
/// * `canonical` - lowercase form used for uniqueness
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = input.as_ref().nfkc().collect::<String>().trim().to_string();
        validate_handle(&original, USER_NAME_MIN_LENGTH)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// Shared character/length rules for handles (user name, LeetCode name)
pub(crate) fn validate_handle(value: &str, min: usize) -> Result<(), UserNameError> {
    if value.is_empty() {
        return Err(UserNameError::Empty);
    }

    let length = value.chars().count();
    if length < min {
        return Err(UserNameError::TooShort { length, min });
    }
    if length > USER_NAME_MAX_LENGTH {
        return Err(UserNameError::TooLong {
            length,
            max: USER_NAME_MAX_LENGTH,
        });
    }

    for (position, ch) in value.chars().enumerate() {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            return Err(UserNameError::InvalidCharacter { char: ch, position });
        }
    }

    Ok(())
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(UserName::new("alice").is_ok());
        assert!(UserName::new("Alice_Smith-99").is_ok());
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new("a".repeat(50)).is_ok());
    }

    #[test]
    fn test_case_preserved_canonical_lowercase() {
        let name = UserName::new("  AlIcE_123  ").unwrap();
        assert_eq!(name.original(), "AlIcE_123");
        assert_eq!(name.canonical(), "alice_123");
    }

    #[test]
    fn test_nfkc_normalization() {
        // Full-width 'Ａ' (U+FF21) becomes ASCII 'A'
        let name = UserName::new("Ａlice").unwrap();
        assert_eq!(name.original(), "Alice");
    }

    #[test]
    fn test_length_limits() {
        assert!(matches!(UserName::new("   "), Err(UserNameError::Empty)));
        assert!(matches!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { length: 2, min: 3 })
        ));
        assert!(matches!(
            UserName::new("a".repeat(51)),
            Err(UserNameError::TooLong { length: 51, .. })
        ));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            UserName::new("alice.smith"),
            Err(UserNameError::InvalidCharacter {
                char: '.',
                position: 5
            })
        ));
        assert!(UserName::new("al ice").is_err());
        assert!(UserName::new("ålice").is_err());
    }
}
