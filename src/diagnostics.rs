// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deployment operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The same option is set more than once; the platform keeps the last value.
    pub fn duplicate_option(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DuplicateOption,
            message: message.into(),
        }
    }

    /// Removing the local image after deployment failed.
    pub fn image_cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ImageCleanup,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// An option appears in both the options file and the dotenv file.
    DuplicateOption,
    /// Local image could not be removed (disk space is not reclaimed).
    ImageCleanup,
}
