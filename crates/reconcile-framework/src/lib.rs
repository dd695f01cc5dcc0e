//! # Reconcile Framework
//!
//! This crate provides the building blocks for driving a slow, asynchronously provisioned
//! remote resource (a managed cluster control plane, a database, a queue…) through its
//! lifecycle from a host that only allows **short-lived invocations**.
//!
//! ## Why a Re-entrant State Machine?
//!
//! Creating a cluster takes many minutes. The environment that calls us does not let an
//! invocation block for that long, so the work is split into rounds:
//!
//! - the first round **submits** the mutation and returns `InProgress` with a context,
//! - later rounds **poll** the remote status once each and return `InProgress` again,
//! - the round that observes the target status returns `Success` (or `Failed`).
//!
//! The engine keeps no memory between rounds. Everything it needs to resume lives in the
//! [`ContinuationContext`] it hands out, which the host stores and passes back verbatim.
//! A crashed or restarted host simply resumes from the last context.
//!
//! ## Architecture Overview
//!
//! 1. **Resource Layer** ([`ManagedResource`]) - Translates describe snapshots into your model
//! 2. **Remote Layer** ([`ControlPlane`]) - The remote API: submit, describe, list
//! 3. **Engine Layer** ([`Reconciler`]) - The create/read/update/delete/list state machine
//! 4. **Host Layer** ([`InvocationHost`]) - A reference re-invocation loop
//!
//! ## Example
//!
//! ```rust
//! use reconcile_framework::mock::MockControlPlane;
//! use reconcile_framework::{ManagedResource, Outcome, Reconciler, RemoteStatus};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Database { name: Option<String>, endpoint: Option<String> }
//!
//! #[derive(Clone, Debug)]
//! struct DatabaseSnapshot { name: String, status: RemoteStatus, endpoint: Option<String> }
//!
//! impl ManagedResource for Database {
//!     type Snapshot = DatabaseSnapshot;
//!     const KIND: &'static str = "database";
//!     fn identity(&self) -> Option<&str> { self.name.as_deref() }
//!     fn set_identity(&mut self, identity: String) { self.name = Some(identity) }
//!     fn from_identity(identity: String) -> Self { Self { name: Some(identity), ..Self::default() } }
//!     fn status(snapshot: &DatabaseSnapshot) -> RemoteStatus { snapshot.status }
//!     fn apply_snapshot(&mut self, snapshot: &DatabaseSnapshot) {
//!         self.name = Some(snapshot.name.clone());
//!         self.endpoint = snapshot.endpoint.clone();
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut remote = MockControlPlane::<Database>::new();
//!     let creating = DatabaseSnapshot { name: "orders".into(), status: RemoteStatus::Creating, endpoint: None };
//!     let active = DatabaseSnapshot { status: RemoteStatus::Active, endpoint: Some("db.local".into()), ..creating.clone() };
//!     remote.expect_submit_create().return_ok(creating);
//!     remote.expect_describe().return_ok(active);
//!
//!     let reconciler = Reconciler::new(remote);
//!     let desired = Database::from_identity("orders".into());
//!
//!     // Round 1: submit.
//!     let first = reconciler.create(desired, None).await;
//!     let context = first.context().cloned();
//!     assert!(first.is_in_progress());
//!
//!     // Round 2: poll with the context from round 1.
//!     let second = reconciler.create(first.into_model(), context).await;
//!     match second {
//!         Outcome::Success(db) => assert_eq!(db.endpoint.as_deref(), Some("db.local")),
//!         other => panic!("unexpected {other:?}"),
//!     }
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each engine call performs its remote calls and returns; it never sleeps
//! - The host guarantees at most one in-flight invocation per resource identity
//! - Resources share no mutable state, so any number can be reconciled in parallel
//!
//! ## Testing
//!
//! [`mock::MockControlPlane`] scripts the remote service answer by answer. See the
//! [`mock`] module for the full API.

pub mod context;
pub mod control_plane;
pub mod error;
pub mod host;
pub mod identity;
pub mod mock;
pub mod outcome;
pub mod reconciler;
pub mod resource;
pub mod tracing;

// Re-export core types for convenience
pub use context::{ContinuationContext, OpaqueContext, Phase};
pub use control_plane::ControlPlane;
pub use error::{classify, ContextError, ErrorKind, HostError, RemoteError, ServiceErrorCode};
pub use host::{HostConfig, InvocationHost};
pub use identity::generate_identity;
pub use outcome::Outcome;
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use resource::{ManagedResource, RemoteStatus};
