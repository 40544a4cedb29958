// ABOUTME: Phantom-typed, validated names for externally-owned cloud resources.
// ABOUTME: Prevents passing a bucket name where an environment name is expected.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use thiserror::Error;

/// Naming rules for one kind of cloud resource.
pub trait ResourceKind {
    /// Human-readable kind, used in messages.
    const KIND: &'static str;
    const MIN_LEN: usize;
    const MAX_LEN: usize;
    /// Whether the first and last characters must be alphanumeric.
    const ALNUM_EDGES: bool;

    fn allows(c: char) -> bool;
}

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum RepositoryMarker {}
pub enum BucketMarker {}
pub enum ApplicationMarker {}
pub enum EnvironmentMarker {}

impl ResourceKind for RepositoryMarker {
    const KIND: &'static str = "registry repository";
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 256;
    const ALNUM_EDGES: bool = true;

    fn allows(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.' | '/')
    }
}

impl ResourceKind for BucketMarker {
    const KIND: &'static str = "bucket";
    const MIN_LEN: usize = 3;
    const MAX_LEN: usize = 63;
    const ALNUM_EDGES: bool = true;

    fn allows(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.')
    }
}

impl ResourceKind for ApplicationMarker {
    const KIND: &'static str = "application";
    const MIN_LEN: usize = 1;
    const MAX_LEN: usize = 100;
    const ALNUM_EDGES: bool = false;

    fn allows(c: char) -> bool {
        c != '/' && !c.is_control()
    }
}

impl ResourceKind for EnvironmentMarker {
    const KIND: &'static str = "environment";
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 40;
    const ALNUM_EDGES: bool = true;

    fn allows(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-'
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("{kind} name cannot be empty")]
    Empty { kind: &'static str },

    #[error("{kind} name must be between {min} and {max} characters, got {len}")]
    Length {
        kind: &'static str,
        min: usize,
        max: usize,
        len: usize,
    },

    #[error("invalid character in {kind} name: '{ch}'")]
    InvalidChar { kind: &'static str, ch: char },

    #[error("{kind} name must start and end with a letter or digit")]
    Edge { kind: &'static str },
}

/// A resource name validated against the rules of its kind `K`.
#[must_use = "names identify remote resources and should not be ignored"]
pub struct ResourceName<K> {
    value: String,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> ResourceName<K> {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        let kind = K::KIND;
        if value.is_empty() {
            return Err(ResourceNameError::Empty { kind });
        }

        let len = value.chars().count();
        if len < K::MIN_LEN || len > K::MAX_LEN {
            return Err(ResourceNameError::Length {
                kind,
                min: K::MIN_LEN,
                max: K::MAX_LEN,
                len,
            });
        }

        if let Some(ch) = value.chars().find(|c| !K::allows(*c)) {
            return Err(ResourceNameError::InvalidChar { kind, ch });
        }

        if K::ALNUM_EDGES {
            let first = value.chars().next().unwrap_or_default();
            let last = value.chars().last().unwrap_or_default();
            if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
                return Err(ResourceNameError::Edge { kind });
            }
        }

        Ok(Self {
            value: value.to_string(),
            _kind: PhantomData,
        })
    }
}

impl<K> ResourceName<K> {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// Manual trait implementations that don't require K to implement the trait.

impl<K> fmt::Debug for ResourceName<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceName").field(&self.value).finish()
    }
}

impl<K> Clone for ResourceName<K> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> PartialEq for ResourceName<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> Eq for ResourceName<K> {}

impl<K> Hash for ResourceName<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K> fmt::Display for ResourceName<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

pub type RepositoryName = ResourceName<RepositoryMarker>;
pub type BucketName = ResourceName<BucketMarker>;
pub type ApplicationName = ResourceName<ApplicationMarker>;
pub type EnvironmentName = ResourceName<EnvironmentMarker>;
