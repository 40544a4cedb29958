// ABOUTME: Validated domain types for deployment targets.
// ABOUTME: Uses phantom types to keep resource names of different kinds apart.

mod image_ref;
mod resource_name;
mod version_label;

pub use image_ref::{ImageRef, ParseImageRefError};
pub use resource_name::{
    ApplicationMarker, ApplicationName, BucketMarker, BucketName, EnvironmentMarker,
    EnvironmentName, RepositoryMarker, RepositoryName, ResourceKind, ResourceName,
    ResourceNameError,
};
pub use version_label::{VersionLabel, VersionLabelError};
