// ABOUTME: Tagged container image reference pushed to the registry.
// ABOUTME: Formats as `<repository-uri>:<version-label>` and exposes the registry host.

use super::version_label::VersionLabel;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image repository cannot be empty")]
    Empty,

    #[error("invalid character in image repository: {0}")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    repository: String,
    tag: VersionLabel,
}

impl ImageRef {
    /// Tag a repository URI such as `123.dkr.ecr.us-east-1.amazonaws.com/app`.
    pub fn new(repository: &str, tag: &VersionLabel) -> Result<Self, ParseImageRefError> {
        let repository = repository.trim();
        if repository.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in repository.chars() {
            if !c.is_ascii_alphanumeric()
                && c != '/'
                && c != ':'
                && c != '.'
                && c != '-'
                && c != '_'
            {
                return Err(ParseImageRefError::InvalidChar(c));
            }
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.clone(),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The registry host, if the repository is qualified with one.
    ///
    /// A first path component counts as a registry when it contains a dot
    /// or a port, or is `localhost`.
    pub fn registry(&self) -> Option<&str> {
        match self.repository.split_once('/') {
            Some((first, _))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                Some(first)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
