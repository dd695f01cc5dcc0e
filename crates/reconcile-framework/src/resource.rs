//! # ManagedResource Trait
//!
//! The `ManagedResource` trait is the status-translator seam: it tells the generic
//! [`Reconciler`](crate::Reconciler) how to read a remote describe response and how to
//! fold it back into the caller's model.
//!
//! # Architecture Note
//! The engine never looks inside a model or a snapshot. It only needs four things from a
//! resource type:
//! - its identity (assigned once, then stable),
//! - a way to build a bare model from an identity (used by `list`),
//! - the canonical [`RemoteStatus`] of a snapshot,
//! - a total, deterministic copy of snapshot fields into the model.
//!
//! Everything else (request shapes, field names) lives with the concrete resource.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Canonical lifecycle status reported by the remote control service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteStatus {
    Pending,
    Creating,
    Active,
    Updating,
    Deleting,
    /// Never reported by a describe; used as the stabilization target for deletes.
    Deleted,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteStatus::Pending => "PENDING",
            RemoteStatus::Creating => "CREATING",
            RemoteStatus::Active => "ACTIVE",
            RemoteStatus::Updating => "UPDATING",
            RemoteStatus::Deleting => "DELETING",
            RemoteStatus::Deleted => "DELETED",
            RemoteStatus::Failed => "FAILED",
            RemoteStatus::Unknown => "UNKNOWN",
        }
    }

    /// Whether the remote side is still working on the resource.
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            RemoteStatus::Pending
                | RemoteStatus::Creating
                | RemoteStatus::Updating
                | RemoteStatus::Deleting
        )
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait that any remotely provisioned resource implements to be driven by the reconciler.
pub trait ManagedResource: Clone + Debug + Send + Sync + 'static {
    /// One describe response, as returned by the control service.
    type Snapshot: Clone + Debug + Send + Sync;

    /// Lowercase noun used in progress messages (e.g. `"cluster"`).
    const KIND: &'static str;

    /// The assigned identity, if any. Empty strings count as unassigned.
    fn identity(&self) -> Option<&str>;

    fn set_identity(&mut self, identity: String);

    /// Builds a model that carries nothing but an identity.
    fn from_identity(identity: String) -> Self;

    /// Reads the canonical status out of a snapshot.
    fn status(snapshot: &Self::Snapshot) -> RemoteStatus;

    /// Copies every observed field of `snapshot` into the model.
    ///
    /// Must be pure: applying the same snapshot twice yields the same model.
    fn apply_snapshot(&mut self, snapshot: &Self::Snapshot);

    /// The identity, filtered to non-empty values and owned.
    fn assigned_identity(&self) -> Option<String> {
        self.identity()
            .filter(|identity| !identity.is_empty())
            .map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let parsed: RemoteStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(parsed, RemoteStatus::Active);
        let unknown: RemoteStatus = serde_json::from_str("\"RESIZING\"").unwrap();
        assert_eq!(unknown, RemoteStatus::Unknown);
        assert_eq!(RemoteStatus::Creating.to_string(), "CREATING");
    }

    #[test]
    fn test_transitional_statuses() {
        assert!(RemoteStatus::Creating.is_transitional());
        assert!(RemoteStatus::Deleting.is_transitional());
        assert!(!RemoteStatus::Active.is_transitional());
        assert!(!RemoteStatus::Failed.is_transitional());
    }
}
