//! # ControlPlane Trait
//!
//! The remote control service as the engine consumes it. Implementations own transport,
//! auth and request marshaling; the engine only sees models, snapshots and
//! [`RemoteError`]s.
use crate::error::RemoteError;
use crate::resource::ManagedResource;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote API for one resource type.
///
/// Every method is a single remote call. None of them wait for the resource to settle.
#[async_trait]
pub trait ControlPlane<R: ManagedResource>: Send + Sync {
    /// Submits creation of `desired` (identity already assigned).
    async fn submit_create(&self, desired: &R) -> Result<R::Snapshot, RemoteError>;

    /// Submits a configuration change for the resource named by `desired`.
    async fn submit_update(&self, desired: &R) -> Result<(), RemoteError>;

    async fn submit_delete(&self, identity: &str) -> Result<(), RemoteError>;

    async fn describe(&self, identity: &str) -> Result<R::Snapshot, RemoteError>;

    /// Identities of every resource visible to the caller.
    async fn list(&self) -> Result<Vec<String>, RemoteError>;
}

#[async_trait]
impl<R, C> ControlPlane<R> for Arc<C>
where
    R: ManagedResource,
    C: ControlPlane<R> + ?Sized,
{
    async fn submit_create(&self, desired: &R) -> Result<R::Snapshot, RemoteError> {
        (**self).submit_create(desired).await
    }

    async fn submit_update(&self, desired: &R) -> Result<(), RemoteError> {
        (**self).submit_update(desired).await
    }

    async fn submit_delete(&self, identity: &str) -> Result<(), RemoteError> {
        (**self).submit_delete(identity).await
    }

    async fn describe(&self, identity: &str) -> Result<R::Snapshot, RemoteError> {
        (**self).describe(identity).await
    }

    async fn list(&self) -> Result<Vec<String>, RemoteError> {
        (**self).list().await
    }
}
