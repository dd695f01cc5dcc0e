//! # Control Plane Messages
//!
//! Requests sent from [`ControlPlaneClient`](super::ControlPlaneClient) to the
//! [`ControlPlaneService`](super::ControlPlaneService) actor. Every variant carries a
//! one-shot channel for its answer.

use crate::model::{ClusterSnapshot, VpcConfig};
use reconcile_framework::{RemoteError, RemoteStatus};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the service.
pub type Response<T> = oneshot::Sender<Result<T, RemoteError>>;

/// Inputs of a create call.
#[derive(Debug, Clone)]
pub struct CreateClusterInput {
    pub name: String,
    pub role_arn: Option<String>,
    pub version: Option<String>,
    pub vpc: VpcConfig,
}

#[derive(Debug)]
pub enum ControlPlaneRequest {
    Create {
        input: CreateClusterInput,
        respond_to: Response<ClusterSnapshot>,
    },
    Update {
        name: String,
        vpc: VpcConfig,
        respond_to: Response<()>,
    },
    Delete {
        name: String,
        respond_to: Response<()>,
    },
    Describe {
        name: String,
        respond_to: Response<ClusterSnapshot>,
    },
    List {
        respond_to: Response<Vec<String>>,
    },
    /// Test hook: moves an existing cluster straight to `status`.
    ForceStatus {
        name: String,
        status: RemoteStatus,
        respond_to: Response<()>,
    },
    /// Test hook: the next API call fails with `error`.
    InjectError {
        error: RemoteError,
        respond_to: Response<()>,
    },
}
