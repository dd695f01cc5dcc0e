//! # Reconciliation Engine
//!
//! This module defines the [`Reconciler`], the state machine that walks a remote resource
//! through create, update and delete across many short-lived invocations.
//!
//! ## Invocation Model
//!
//! A host calls one lifecycle method, gets an [`Outcome`] back, and if it is
//! `InProgress` calls the same method again after the requested delay, passing the
//! returned [`ContinuationContext`]. The engine itself keeps nothing between calls and
//! never sleeps.
//!
//! ```text
//!   ctx = None ──submit──► InProgress(Submitted) ──poll──► … ──► Success | Failed
//!        │
//!        └─busy─► InProgress(Blocked) ──poll until quiet──► resubmit
//! ```
//!
//! * **Submitted**: the mutation was accepted. Each invocation issues one describe and
//!   reports what it saw.
//! * **Blocked**: the service refused the mutation because another operation is still
//!   settling. Each invocation describes; once the resource is quiet the mutation is
//!   submitted again (a delete also proceeds against a `FAILED` resource). A blocked
//!   operation never reports success on its own, and create never enters this phase.
//!
//! A submission invocation never reports success: success is only declared after a
//! describe has observed the target status.

use crate::context::{ContinuationContext, Phase};
use crate::control_plane::ControlPlane;
use crate::error::{ErrorKind, RemoteError};
use crate::identity::{generate_identity_with, DEFAULT_IDENTITY_PREFIX, DEFAULT_SUFFIX_LEN};
use crate::outcome::Outcome;
use crate::resource::{ManagedResource, RemoteStatus};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default re-invoke delay handed to the host.
pub const DEFAULT_CALLBACK_DELAY: Duration = Duration::from_secs(120);

/// Tunables of the engine.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub callback_delay: Duration,
    pub identity_prefix: String,
    pub identity_suffix_len: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            callback_delay: DEFAULT_CALLBACK_DELAY,
            identity_prefix: DEFAULT_IDENTITY_PREFIX.to_string(),
            identity_suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }
}

impl ReconcilerConfig {
    pub fn with_callback_delay(mut self, delay: Duration) -> Self {
        self.callback_delay = delay;
        self
    }

    pub fn with_identity_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.identity_prefix = prefix.into();
        self
    }
}

/// The mutating verbs. Reads never carry a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Update,
    Delete,
}

impl Verb {
    fn target(self) -> RemoteStatus {
        match self {
            Verb::Create | Verb::Update => RemoteStatus::Active,
            Verb::Delete => RemoteStatus::Deleted,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Create => f.write_str("creation"),
            Verb::Update => f.write_str("update"),
            Verb::Delete => f.write_str("deletion"),
        }
    }
}

/// Generic reconciliation engine for one resource type.
///
/// `R` describes the resource, `C` is the remote API it talks to. The reconciler is
/// cheap to share by reference; all per-operation state travels in the context.
pub struct Reconciler<R, C> {
    control_plane: C,
    config: ReconcilerConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<R, C> Reconciler<R, C>
where
    R: ManagedResource,
    C: ControlPlane<R>,
{
    pub fn new(control_plane: C) -> Self {
        Self::with_config(control_plane, ReconcilerConfig::default())
    }

    pub fn with_config(control_plane: C, config: ReconcilerConfig) -> Self {
        Self {
            control_plane,
            config,
            _resource: PhantomData,
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn control_plane(&self) -> &C {
        &self.control_plane
    }

    /// Creates the resource, or continues a creation already in flight.
    #[instrument(skip_all, fields(kind = R::KIND, resumed = context.is_some()))]
    pub async fn create(&self, model: R, context: Option<ContinuationContext>) -> Outcome<R> {
        self.run(Verb::Create, model, context).await
    }

    /// Pushes the model's mutable configuration to the resource and waits for it to settle.
    #[instrument(skip_all, fields(kind = R::KIND, resumed = context.is_some()))]
    pub async fn update(&self, model: R, context: Option<ContinuationContext>) -> Outcome<R> {
        self.run(Verb::Update, model, context).await
    }

    /// Deletes the resource and waits until the service no longer knows it.
    #[instrument(skip_all, fields(kind = R::KIND, resumed = context.is_some()))]
    pub async fn delete(&self, model: R, context: Option<ContinuationContext>) -> Outcome<R> {
        self.run(Verb::Delete, model, context).await
    }

    /// One describe, merged into the model. No polling.
    #[instrument(skip_all, fields(kind = R::KIND))]
    pub async fn read(&self, mut model: R) -> Outcome<R> {
        let Some(identity) = model.assigned_identity() else {
            return self.missing_identity(model);
        };
        match self.refresh(&mut model, &identity).await {
            Ok(status) => {
                debug!(%identity, %status, "Read");
                Outcome::Success(model)
            }
            Err(e) => {
                warn!(%identity, error = %e, "Read failed");
                Outcome::failed(model, &e)
            }
        }
    }

    /// Describes every resource the service lists.
    ///
    /// The first failure aborts the whole listing; partial results are never returned.
    #[instrument(skip_all, fields(kind = R::KIND))]
    pub async fn list(&self) -> Outcome<Vec<R>> {
        let identities = match self.control_plane.list().await {
            Ok(identities) => identities,
            Err(e) => {
                warn!(error = %e, "List failed");
                return Outcome::failed(Vec::new(), &e);
            }
        };

        let mut models = Vec::with_capacity(identities.len());
        for identity in identities {
            let mut model = R::from_identity(identity.clone());
            if let Err(e) = self.refresh(&mut model, &identity).await {
                warn!(%identity, error = %e, "List aborted");
                return Outcome::failed(Vec::new(), &e);
            }
            models.push(model);
        }
        info!(size = models.len(), "Listed");
        Outcome::Success(models)
    }

    /// Single polling step toward `target`.
    ///
    /// Returns `Success` iff the describe observed `target`, or, when `target` is
    /// [`RemoteStatus::Deleted`], the service no longer knows the resource. A resource
    /// in the `FAILED` state is a terminal failure. Anything else is `InProgress` with
    /// `phase` carried through unchanged.
    pub async fn stabilize(&self, mut model: R, target: RemoteStatus, phase: Phase) -> Outcome<R> {
        let Some(identity) = model.assigned_identity() else {
            return self.missing_identity(model);
        };

        let observed = match self.refresh(&mut model, &identity).await {
            Ok(status) => status,
            Err(e) if e.is_not_found() && target == RemoteStatus::Deleted => {
                info!(%identity, "Gone");
                return Outcome::Success(model);
            }
            Err(e) => {
                warn!(%identity, error = %e, "Describe failed");
                return Outcome::failed(model, &e);
            }
        };

        if observed == target {
            info!(%identity, status = %observed, "Stable");
            return Outcome::Success(model);
        }
        if observed == RemoteStatus::Failed {
            warn!(%identity, "Remote reports FAILED");
            return Outcome::Failed {
                model,
                kind: ErrorKind::GeneralServiceException,
                message: format!("{} status is FAILED", R::KIND),
            };
        }
        debug!(%identity, status = %observed, %target, %phase, "Converging");
        self.in_progress(model, format!("{} {}", R::KIND, observed), phase)
    }

    async fn run(&self, verb: Verb, mut model: R, context: Option<ContinuationContext>) -> Outcome<R> {
        let Some(context) = context else {
            return self.submit(verb, model).await;
        };

        // The host may hand back the original desired model; the context knows the name.
        if model.assigned_identity().is_none() && !context.identity.is_empty() {
            model.set_identity(context.identity.clone());
        }

        match (verb, context.phase) {
            // Create never folds a conflict into Blocked, so any context is a plain poll.
            (Verb::Create, phase) => self.stabilize(model, RemoteStatus::Active, phase).await,
            (_, Phase::Submitted) => self.stabilize(model, verb.target(), Phase::Submitted).await,
            (_, Phase::Blocked) => self.resume_blocked(verb, model).await,
        }
    }

    /// One poll of an Update or Delete the service refused while busy.
    ///
    /// The describe only decides whether to resubmit; the desired model is what gets
    /// resubmitted or handed back. A delete also goes ahead on a FAILED resource.
    async fn resume_blocked(&self, verb: Verb, desired: R) -> Outcome<R> {
        let Some(identity) = desired.assigned_identity() else {
            return self.missing_identity(desired);
        };

        let mut observed = desired.clone();
        let status = match self.refresh(&mut observed, &identity).await {
            Ok(status) => status,
            Err(e) if e.is_not_found() && verb == Verb::Delete => {
                info!(%identity, "Gone while blocked");
                return Outcome::Success(observed);
            }
            Err(e) => {
                warn!(%identity, error = %e, "Describe failed");
                return Outcome::failed(desired, &e);
            }
        };

        match status {
            RemoteStatus::Active => {
                info!(%identity, %verb, "Unblocked, resubmitting");
                self.submit(verb, desired).await
            }
            RemoteStatus::Failed if verb == Verb::Delete => {
                info!(%identity, "Resubmitting deletion of failed resource");
                self.submit(verb, desired).await
            }
            RemoteStatus::Failed => {
                warn!(%identity, %verb, "Remote reports FAILED");
                Outcome::Failed {
                    model: desired,
                    kind: ErrorKind::GeneralServiceException,
                    message: format!("{} status is FAILED", R::KIND),
                }
            }
            busy => {
                debug!(%identity, status = %busy, %verb, "Still blocked");
                self.in_progress(desired, format!("{} {}", R::KIND, busy), Phase::Blocked)
            }
        }
    }

    async fn submit(&self, verb: Verb, mut model: R) -> Outcome<R> {
        let result = match verb {
            Verb::Create => {
                let identity = generate_identity_with(
                    model.identity(),
                    &self.config.identity_prefix,
                    self.config.identity_suffix_len,
                );
                model.set_identity(identity);
                match self.control_plane.submit_create(&model).await {
                    Ok(snapshot) => {
                        model.apply_snapshot(&snapshot);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Verb::Update => match model.assigned_identity() {
                Some(_) => self.control_plane.submit_update(&model).await,
                None => return self.missing_identity(model),
            },
            Verb::Delete => match model.assigned_identity() {
                Some(identity) => self.control_plane.submit_delete(&identity).await,
                None => return self.missing_identity(model),
            },
        };
        self.submitted(verb, model, result)
    }

    fn submitted(&self, verb: Verb, model: R, result: Result<(), RemoteError>) -> Outcome<R> {
        let identity = model.assigned_identity().unwrap_or_default();
        match result {
            Ok(()) => {
                info!(%identity, %verb, "Submitted");
                self.in_progress(model, format!("{} {} initiated", R::KIND, verb), Phase::Submitted)
            }
            // Create has no concurrent operation to wait out; a busy create is a name clash.
            Err(e) if e.is_resource_in_use() && verb != Verb::Create => {
                info!(%identity, %verb, error = %e, "Blocked by concurrent operation");
                self.in_progress(model, e.to_string(), Phase::Blocked)
            }
            Err(e) => {
                warn!(%identity, %verb, error = %e, "Submit failed");
                Outcome::failed(model, &e)
            }
        }
    }

    async fn refresh(&self, model: &mut R, identity: &str) -> Result<RemoteStatus, RemoteError> {
        let snapshot = self.control_plane.describe(identity).await?;
        model.apply_snapshot(&snapshot);
        Ok(R::status(&snapshot))
    }

    fn in_progress(&self, model: R, message: String, phase: Phase) -> Outcome<R> {
        let identity = model.assigned_identity().unwrap_or_default();
        Outcome::InProgress {
            model,
            message,
            context: ContinuationContext::new(identity, phase),
            delay: self.config.callback_delay,
        }
    }

    fn missing_identity(&self, model: R) -> Outcome<R> {
        warn!("Model carries no identity");
        Outcome::Failed {
            model,
            kind: ErrorKind::InvalidRequest,
            message: format!("{} identity is not set", R::KIND),
        }
    }
}
