use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_NAME_LENGTH: usize = 1024;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidCredentialName {
    #[error("Credential name cannot be empty")]
    Empty,
    #[error("Credential name exceeds {MAX_NAME_LENGTH} characters")]
    TooLong,
    #[error("Credential name cannot contain '//': {0}")]
    DoubleSlash(String),
    #[error("Credential name cannot end with '/': {0}")]
    TrailingSlash(String),
}

/// Fully-qualified name of a stored credential, always starting with `/`.
///
/// Equality and lookups are case-insensitive, the original spelling is kept for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialName(String);

impl CredentialName {
    pub fn parse(raw: &str) -> Result<Self, InvalidCredentialName> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Err(InvalidCredentialName::Empty);
        }
        if trimmed.contains("//") {
            return Err(InvalidCredentialName::DoubleSlash(trimmed.to_string()));
        }
        if trimmed.ends_with('/') {
            return Err(InvalidCredentialName::TrailingSlash(trimmed.to_string()));
        }

        let name = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        // limit applies to the stored form, leading slash included
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(InvalidCredentialName::TooLong);
        }
        Ok(Self(name))
    }

    /// Name taken as given apart from the leading `/`, for doubles that must not reject input
    #[cfg(any(test, feature = "testing"))]
    pub(crate) fn unchecked(raw: &str) -> Self {
        if raw.starts_with('/') {
            Self(raw.to_string())
        } else {
            Self(format!("/{raw}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used by repositories to index this name
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for CredentialName {
    fn eq(&self, other: &Self) -> bool {
        self.lookup_key() == other.lookup_key()
    }
}

impl Eq for CredentialName {}

impl std::hash::Hash for CredentialName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lookup_key().hash(state);
    }
}

impl PartialOrd for CredentialName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CredentialName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.lookup_key().cmp(&other.lookup_key())
    }
}

impl Display for CredentialName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CredentialName {
    type Error = InvalidCredentialName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CredentialName> for String {
    fn from(value: CredentialName) -> Self {
        value.0
    }
}
