// ABOUTME: Error type shared by every cloud collaborator.
// ABOUTME: Separates the typed already-exists and not-found conditions from everything else.

/// Errors returned by registry, object store, platform and query calls.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The resource already exists. Create-or-adopt callers recover from this.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The service rejected the request.
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// The client command could not be run or exited without a service error.
    #[error("command failed: {0}")]
    Command(String),

    /// The service answered with something we could not read.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl CloudError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CloudError::AlreadyExists(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

impl From<std::io::Error> for CloudError {
    fn from(err: std::io::Error) -> Self {
        CloudError::Command(err.to_string())
    }
}

impl From<serde_json::Error> for CloudError {
    fn from(err: serde_json::Error) -> Self {
        CloudError::Decode(err.to_string())
    }
}
