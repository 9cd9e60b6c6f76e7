use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The public identifier embedded in a shortened URL.
///
/// Tokens are case-sensitive, 4-32 characters long, and contain only
/// URL-safe characters (`[A-Za-z0-9_-]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortToken(String);

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 32;

/// Characters a short token may contain.
pub const ALPHABET: [char; 64] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l',
    'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4',
    '5', '6', '7', '8', '9', '_', '-',
];

impl ShortToken {
    /// Creates a new `ShortToken` after validating the input.
    pub fn new(token: impl Into<String>) -> Result<Self, CoreError> {
        let token = token.into();
        Self::validate(&token)?;
        Ok(Self(token))
    }

    /// Creates a `ShortToken` without validation.
    ///
    /// Use this only for tokens produced by trusted internal sources
    /// (generators, rows read back from storage).
    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Builds the full shortened URL under the given public base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(token: &str) -> Result<(), CoreError> {
        if token.len() < MIN_LENGTH || token.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortToken(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                token.len()
            )));
        }

        if !token.chars().all(|c| ALPHABET.contains(&c)) {
            return Err(CoreError::InvalidShortToken(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                token
            )));
        }

        Ok(())
    }
}

impl TryFrom<String> for ShortToken {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortToken> for String {
    fn from(value: ShortToken) -> Self {
        value.0
    }
}

impl Display for ShortToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
