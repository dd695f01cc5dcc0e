//! # Handler Dispatch
//!
//! The JSON surface an invocation host talks to. A host sends a [`HandlerRequest`] naming
//! the action, the desired model and whatever callback context the previous invocation
//! returned; it receives a [`ProgressEvent`].
//!
//! ```json
//! { "action": "CREATE",
//!   "desiredResourceState": { "RoleArn": "arn:…", "ResourcesVpcConfig": { "SubnetIds": ["subnet-1"] } },
//!   "callbackContext": null }
//! ```
//!
//! ```json
//! { "status": "IN_PROGRESS",
//!   "message": "cluster creation initiated",
//!   "resourceModel": { "Name": "EKS-7Q2M0ZKD", … },
//!   "callbackContext": { "Identity": "EKS-7Q2M0ZKD", "OpComplete": true },
//!   "callbackDelaySeconds": 120 }
//! ```

use crate::model::Cluster;
use reconcile_framework::{
    ContextError, ContinuationContext, ControlPlane, ErrorKind, OpaqueContext, Outcome, Reconciler,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::List => "LIST",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub action: Action,
    #[serde(default)]
    pub desired_resource_state: Option<Cluster>,
    #[serde(default)]
    pub callback_context: Option<OpaqueContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<Cluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<Cluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<OpaqueContext>,
    #[serde(default)]
    pub callback_delay_seconds: u64,
}

impl ProgressEvent {
    fn status(status: OperationStatus) -> Self {
        Self {
            status,
            error_code: None,
            message: None,
            resource_model: None,
            resource_models: None,
            callback_context: None,
            callback_delay_seconds: 0,
        }
    }

    /// Builds an event from any outcome; `place` decides where the payload goes.
    fn from_outcome<T>(outcome: Outcome<T>, place: impl FnOnce(&mut Self, T)) -> Self {
        match outcome {
            Outcome::Success(value) => {
                let mut event = Self::status(OperationStatus::Success);
                place(&mut event, value);
                event
            }
            Outcome::Failed {
                model,
                kind,
                message,
            } => {
                let mut event = Self::status(OperationStatus::Failed);
                event.error_code = Some(kind);
                event.message = Some(message);
                place(&mut event, model);
                event
            }
            Outcome::InProgress {
                model,
                message,
                context,
                delay,
            } => {
                let mut event = Self::status(OperationStatus::InProgress);
                event.message = Some(message);
                event.callback_context = Some(context.to_opaque());
                event.callback_delay_seconds = delay.as_secs();
                place(&mut event, model);
                event
            }
        }
    }
}

impl From<Outcome<Cluster>> for ProgressEvent {
    fn from(outcome: Outcome<Cluster>) -> Self {
        Self::from_outcome(outcome, |event, model| event.resource_model = Some(model))
    }
}

impl From<Outcome<Vec<Cluster>>> for ProgressEvent {
    fn from(outcome: Outcome<Vec<Cluster>>) -> Self {
        Self::from_outcome(outcome, |event, models| event.resource_models = Some(models))
    }
}

/// A request the engine cannot act on at all.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0} request carries no desired resource state")]
    MissingModel(Action),
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Routes one host request to the engine.
///
/// An absent or empty callback context starts a fresh operation.
#[instrument(skip_all, fields(action = %request.action))]
pub async fn dispatch<C>(
    reconciler: &Reconciler<Cluster, C>,
    request: HandlerRequest,
) -> Result<ProgressEvent, DispatchError>
where
    C: ControlPlane<Cluster>,
{
    let HandlerRequest {
        action,
        desired_resource_state,
        callback_context,
    } = request;

    let context = callback_context
        .filter(|map| !map.is_empty())
        .as_ref()
        .map(ContinuationContext::from_opaque)
        .transpose()?;

    let model = move || desired_resource_state.ok_or(DispatchError::MissingModel(action));
    let event = match action {
        Action::Create => ProgressEvent::from(reconciler.create(model()?, context).await),
        Action::Read => ProgressEvent::from(reconciler.read(model()?).await),
        Action::Update => ProgressEvent::from(reconciler.update(model()?, context).await),
        Action::Delete => ProgressEvent::from(reconciler.delete(model()?, context).await),
        Action::List => ProgressEvent::from(reconciler.list().await),
    };
    info!(status = ?event.status, "Dispatched");
    Ok(event)
}
