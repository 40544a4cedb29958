// ABOUTME: Validated application version label.
// ABOUTME: The label doubles as the container image tag, so it follows tag rules.

use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionLabelError {
    #[error("version label cannot be empty")]
    Empty,

    #[error("version label exceeds maximum length of 100 characters")]
    TooLong,

    #[error("version label cannot start with '.' or '-'")]
    BadStart,

    #[error("invalid character in version label: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionLabel(String);

impl VersionLabel {
    pub fn new(value: &str) -> Result<Self, VersionLabelError> {
        if value.is_empty() {
            return Err(VersionLabelError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(VersionLabelError::TooLong);
        }

        if value.starts_with('.') || value.starts_with('-') {
            return Err(VersionLabelError::BadStart);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-' {
                return Err(VersionLabelError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
