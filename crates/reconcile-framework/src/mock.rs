//! # Mock Control Plane & Testing Guide
//!
//! `MockControlPlane<R>` implements [`ControlPlane<R>`] entirely in memory. You queue the
//! answers the remote service should give, in order, hand a clone to a
//! [`Reconciler`](crate::Reconciler), and then assert on the outcomes.
//!
//! ## When to use the Mock vs the Simulator
//!
//! | Feature | MockControlPlane | Simulated control plane |
//! |---------|------------------|-------------------------|
//! | **Speed** | Instant | Fast (one Tokio task) |
//! | **Determinism** | 100% scripted | Driven by poll counts |
//! | **State** | None (expectations) | Real status transitions |
//! | **Use Case** | One engine step, error injection | Whole lifecycles through a host |
//!
//! ## Example
//!
//! ```rust
//! use reconcile_framework::mock::MockControlPlane;
//! use reconcile_framework::{ManagedResource, Reconciler, RemoteStatus};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Queue { name: Option<String> }
//!
//! impl ManagedResource for Queue {
//!     type Snapshot = (String, RemoteStatus);
//!     const KIND: &'static str = "queue";
//!     fn identity(&self) -> Option<&str> { self.name.as_deref() }
//!     fn set_identity(&mut self, identity: String) { self.name = Some(identity) }
//!     fn from_identity(identity: String) -> Self { Self { name: Some(identity) } }
//!     fn status(snapshot: &Self::Snapshot) -> RemoteStatus { snapshot.1 }
//!     fn apply_snapshot(&mut self, snapshot: &Self::Snapshot) { self.name = Some(snapshot.0.clone()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockControlPlane::<Queue>::new();
//!     mock.expect_describe().return_ok(("jobs".to_string(), RemoteStatus::Active));
//!
//!     let reconciler = Reconciler::new(mock.clone());
//!     let outcome = reconciler.read(Queue::from_identity("jobs".into())).await;
//!     assert!(outcome.is_success());
//!     mock.verify();
//! }
//! ```
//!
//! A call that arrives when the next queued expectation is for a different method (or
//! when nothing is queued) panics, which fails the test at the offending call.

use crate::control_plane::ControlPlane;
use crate::error::RemoteError;
use crate::resource::ManagedResource;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// EXPECTATIONS
// =============================================================================

enum Expectation<R: ManagedResource> {
    SubmitCreate(Result<R::Snapshot, RemoteError>),
    SubmitUpdate(Result<(), RemoteError>),
    SubmitDelete(Result<(), RemoteError>),
    Describe(Result<R::Snapshot, RemoteError>),
    List(Result<Vec<String>, RemoteError>),
}

impl<R: ManagedResource> Expectation<R> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::SubmitCreate(_) => "submit_create",
            Expectation::SubmitUpdate(_) => "submit_update",
            Expectation::SubmitDelete(_) => "submit_delete",
            Expectation::Describe(_) => "describe",
            Expectation::List(_) => "list",
        }
    }
}

#[derive(Default)]
struct Calls {
    submitted: Vec<String>,
    described: Vec<String>,
}

/// A scripted remote control service.
///
/// Cloning shares the expectation queue, so a clone can be moved into the reconciler
/// while the test keeps the original to add expectations and verify.
pub struct MockControlPlane<R: ManagedResource> {
    expectations: Arc<Mutex<VecDeque<Expectation<R>>>>,
    calls: Arc<Mutex<Calls>>,
}

impl<R: ManagedResource> Clone for MockControlPlane<R> {
    fn clone(&self) -> Self {
        Self {
            expectations: self.expectations.clone(),
            calls: self.calls.clone(),
        }
    }
}

impl<R: ManagedResource> Default for MockControlPlane<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ManagedResource> MockControlPlane<R> {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn expect_submit_create(&mut self) -> ExpectationBuilder<R, R::Snapshot> {
        self.builder(Expectation::SubmitCreate)
    }

    pub fn expect_submit_update(&mut self) -> ExpectationBuilder<R, ()> {
        self.builder(Expectation::SubmitUpdate)
    }

    pub fn expect_submit_delete(&mut self) -> ExpectationBuilder<R, ()> {
        self.builder(Expectation::SubmitDelete)
    }

    pub fn expect_describe(&mut self) -> ExpectationBuilder<R, R::Snapshot> {
        self.builder(Expectation::Describe)
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<R, Vec<String>> {
        self.builder(Expectation::List)
    }

    /// Identities passed to `submit_create`, `submit_update` and `submit_delete`, in order.
    pub fn submitted_identities(&self) -> Vec<String> {
        self.calls.lock().unwrap().submitted.clone()
    }

    /// Identities passed to `describe`, in order.
    pub fn described_identities(&self) -> Vec<String> {
        self.calls.lock().unwrap().described.clone()
    }

    /// Panics if any queued expectation was not consumed.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            let pending: Vec<_> = exps.iter().map(Expectation::name).collect();
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                exps.len(),
                pending
            );
        }
    }

    fn builder<T>(
        &self,
        wrap: fn(Result<T, RemoteError>) -> Expectation<R>,
    ) -> ExpectationBuilder<R, T> {
        ExpectationBuilder {
            wrap,
            expectations: self.expectations.clone(),
        }
    }

    fn next(&self, method: &'static str) -> Expectation<R> {
        let mut exps = self.expectations.lock().unwrap();
        match exps.pop_front() {
            Some(expectation) if expectation.name() == method => expectation,
            Some(expectation) => panic!(
                "Unexpected {method} call, next expectation is {}",
                expectation.name()
            ),
            None => panic!("Unexpected {method} call, no expectations left"),
        }
    }

    fn record_submit(&self, identity: Option<&str>) {
        let mut calls = self.calls.lock().unwrap();
        calls.submitted.push(identity.unwrap_or_default().to_string());
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<R: ManagedResource, T> {
    wrap: fn(Result<T, RemoteError>) -> Expectation<R>,
    expectations: Arc<Mutex<VecDeque<Expectation<R>>>>,
}

impl<R: ManagedResource, T> ExpectationBuilder<R, T> {
    /// Queues a successful answer.
    pub fn return_ok(self, value: T) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Ok(value)));
    }

    /// Queues a failed answer.
    pub fn return_err(self, error: RemoteError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// CONTROL PLANE IMPL
// =============================================================================

#[async_trait]
impl<R: ManagedResource> ControlPlane<R> for MockControlPlane<R> {
    async fn submit_create(&self, desired: &R) -> Result<R::Snapshot, RemoteError> {
        self.record_submit(desired.identity());
        match self.next("submit_create") {
            Expectation::SubmitCreate(response) => response,
            _ => unreachable!("next() checked the method"),
        }
    }

    async fn submit_update(&self, desired: &R) -> Result<(), RemoteError> {
        self.record_submit(desired.identity());
        match self.next("submit_update") {
            Expectation::SubmitUpdate(response) => response,
            _ => unreachable!("next() checked the method"),
        }
    }

    async fn submit_delete(&self, identity: &str) -> Result<(), RemoteError> {
        self.record_submit(Some(identity));
        match self.next("submit_delete") {
            Expectation::SubmitDelete(response) => response,
            _ => unreachable!("next() checked the method"),
        }
    }

    async fn describe(&self, identity: &str) -> Result<R::Snapshot, RemoteError> {
        self.calls.lock().unwrap().described.push(identity.to_string());
        match self.next("describe") {
            Expectation::Describe(response) => response,
            _ => unreachable!("next() checked the method"),
        }
    }

    async fn list(&self) -> Result<Vec<String>, RemoteError> {
        match self.next("list") {
            Expectation::List(response) => response,
            _ => unreachable!("next() checked the method"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceErrorCode;
    use crate::resource::RemoteStatus;

    #[derive(Clone, Debug, Default)]
    struct Volume {
        id: Option<String>,
    }

    impl ManagedResource for Volume {
        type Snapshot = RemoteStatus;
        const KIND: &'static str = "volume";

        fn identity(&self) -> Option<&str> {
            self.id.as_deref()
        }
        fn set_identity(&mut self, identity: String) {
            self.id = Some(identity);
        }
        fn from_identity(identity: String) -> Self {
            Self { id: Some(identity) }
        }
        fn status(snapshot: &RemoteStatus) -> RemoteStatus {
            *snapshot
        }
        fn apply_snapshot(&mut self, _snapshot: &RemoteStatus) {}
    }

    #[tokio::test]
    async fn test_mock_answers_in_order() {
        let mut mock = MockControlPlane::<Volume>::new();
        mock.expect_describe().return_ok(RemoteStatus::Creating);
        mock.expect_describe()
            .return_err(RemoteError::service(ServiceErrorCode::ResourceNotFound, "gone"));

        assert_eq!(mock.describe("vol-1").await, Ok(RemoteStatus::Creating));
        assert!(mock.describe("vol-1").await.unwrap_err().is_not_found());
        assert_eq!(mock.described_identities(), vec!["vol-1", "vol-1"]);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected list call")]
    async fn test_mock_rejects_unexpected_call() {
        let mut mock = MockControlPlane::<Volume>::new();
        mock.expect_describe().return_ok(RemoteStatus::Active);
        let _ = mock.list().await;
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_verify_reports_leftovers() {
        let mut mock = MockControlPlane::<Volume>::new();
        mock.expect_submit_delete().return_ok(());
        mock.verify();
    }
}
