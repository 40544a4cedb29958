// ABOUTME: Create-or-adopt helper shared by every remote resource.
// ABOUTME: An "already exists" answer falls back to describing the existing resource.

use std::future::Future;

use crate::cloud::CloudError;

/// How a resource came to exist for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ensured<T> {
    /// This run created it.
    Created(T),
    /// It already existed and was described instead.
    Adopted(T),
}

impl<T> Ensured<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Ensured::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Ensured::Created(value) | Ensured::Adopted(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Ensured::Created(value) | Ensured::Adopted(value) => value,
        }
    }
}

/// Run `create`; on `AlreadyExists` run `describe` instead. Any other error is returned.
pub async fn ensure_resource<T, C, CF, D, DF>(
    kind: &str,
    name: &str,
    create: C,
    describe: D,
) -> Result<Ensured<T>, CloudError>
where
    C: FnOnce() -> CF,
    CF: Future<Output = Result<T, CloudError>>,
    D: FnOnce() -> DF,
    DF: Future<Output = Result<T, CloudError>>,
{
    match create().await {
        Ok(value) => {
            tracing::info!(kind, name, "created");
            Ok(Ensured::Created(value))
        }
        Err(e) if e.is_already_exists() => {
            tracing::info!(kind, name, "already exists, adopting");
            describe().await.map(Ensured::Adopted)
        }
        Err(e) => {
            tracing::debug!(kind, name, error = %e, "create failed");
            Err(e)
        }
    }
}
