// ABOUTME: Capability traits for the services a deployment talks to.
// ABOUTME: Defines RegistryOps, ObjectStoreOps, PlatformOps, ImageOps and QueryOps.

mod image;
mod object_store;
mod platform;
mod query;
mod registry;
mod shared_types;

pub use image::{ImageError, ImageOps};
pub use object_store::ObjectStoreOps;
pub use platform::PlatformOps;
pub use query::QueryOps;
pub use registry::RegistryOps;
pub use shared_types::*;

/// Every service a full deployment needs.
///
/// Automatically implemented for any type that has all capabilities.
pub trait CloudServices: RegistryOps + ObjectStoreOps + PlatformOps {}

impl<T> CloudServices for T where T: RegistryOps + ObjectStoreOps + PlatformOps {}
