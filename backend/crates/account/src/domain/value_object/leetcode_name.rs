//! LeetCode User Name Value Object
//!
//! Optional link to the user's LeetCode account. Same character rules as
//! [`UserName`](super::user_name::UserName) but a single character is
//! allowed. At most one account may link a given LeetCode name
//! (case-insensitive).

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use super::user_name::{UserNameError, validate_handle};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LeetcodeName {
    original: String,
    canonical: String,
}

impl LeetcodeName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = input.as_ref().nfkc().collect::<String>().trim().to_string();
        validate_handle(&original, 1)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for LeetcodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for LeetcodeName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LeetcodeName> for String {
    fn from(name: LeetcodeName) -> Self {
        name.original
    }
}
