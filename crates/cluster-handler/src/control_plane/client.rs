//! # Control Plane Client
//!
//! The cloneable handle the reconciler talks to. It implements
//! [`ControlPlane<Cluster>`](reconcile_framework::ControlPlane), so the engine cannot tell
//! the simulator apart from a real remote service.

use super::request::{ControlPlaneRequest, CreateClusterInput};
use crate::model::{Cluster, ClusterSnapshot};
use async_trait::async_trait;
use reconcile_framework::{ControlPlane, RemoteError, RemoteStatus};
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

#[derive(Clone)]
pub struct ControlPlaneClient {
    sender: mpsc::Sender<ControlPlaneRequest>,
}

impl ControlPlaneClient {
    pub fn new(sender: mpsc::Sender<ControlPlaneRequest>) -> Self {
        Self { sender }
    }

    /// Sends one request and waits for its answer.
    ///
    /// A stopped service is a transport failure, not an API error.
    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, RemoteError>>) -> ControlPlaneRequest,
    ) -> Result<T, RemoteError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| RemoteError::transport("control plane closed"))?;
        response
            .await
            .map_err(|_| RemoteError::transport("control plane dropped response channel"))?
    }

    /// Moves a cluster straight to `status`, bypassing the API rules.
    pub async fn force_status(&self, name: &str, status: RemoteStatus) -> Result<(), RemoteError> {
        let name = name.to_string();
        self.call(|respond_to| ControlPlaneRequest::ForceStatus {
            name,
            status,
            respond_to,
        })
        .await
    }

    /// Makes the next API call fail with `error`.
    pub async fn inject_error(&self, error: RemoteError) -> Result<(), RemoteError> {
        self.call(|respond_to| ControlPlaneRequest::InjectError { error, respond_to })
            .await
    }
}

#[async_trait]
impl ControlPlane<Cluster> for ControlPlaneClient {
    #[instrument(skip_all, fields(cluster = model.name.as_deref().unwrap_or_default()))]
    async fn submit_create(&self, model: &Cluster) -> Result<ClusterSnapshot, RemoteError> {
        let input = CreateClusterInput {
            name: model.name.clone().unwrap_or_default(),
            role_arn: model.role_arn.clone(),
            version: model.version.clone(),
            vpc: model.vpc(),
        };
        self.call(|respond_to| ControlPlaneRequest::Create { input, respond_to })
            .await
    }

    #[instrument(skip_all, fields(cluster = model.name.as_deref().unwrap_or_default()))]
    async fn submit_update(&self, model: &Cluster) -> Result<(), RemoteError> {
        let name = model.name.clone().unwrap_or_default();
        let vpc = model.vpc();
        self.call(|respond_to| ControlPlaneRequest::Update {
            name,
            vpc,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    async fn submit_delete(&self, identity: &str) -> Result<(), RemoteError> {
        let name = identity.to_string();
        self.call(|respond_to| ControlPlaneRequest::Delete { name, respond_to })
            .await
    }

    #[instrument(skip(self))]
    async fn describe(&self, identity: &str) -> Result<ClusterSnapshot, RemoteError> {
        let name = identity.to_string();
        self.call(|respond_to| ControlPlaneRequest::Describe { name, respond_to })
            .await
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<String>, RemoteError> {
        self.call(|respond_to| ControlPlaneRequest::List { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::{ControlPlaneService, SimulatorConfig};
    use reconcile_framework::ErrorKind;

    #[tokio::test]
    async fn test_closed_service_is_transport_error() {
        let (service, client) = ControlPlaneService::new(4, SimulatorConfig::default());
        drop(service);

        let err = client.describe("blue").await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::GeneralServiceException);
    }

    #[tokio::test]
    async fn test_roundtrip_through_actor() {
        let (service, client) = ControlPlaneService::new(4, SimulatorConfig::default());
        let handle = tokio::spawn(service.run());

        let model = Cluster::new(
            Some("blue".into()),
            "arn:aws:iam::123456789012:role/eks",
            "1.30",
            crate::model::VpcConfig {
                security_group_ids: vec![],
                subnet_ids: vec!["subnet-1".into()],
            },
        );
        let created = client.submit_create(&model).await.unwrap();
        assert_eq!(created.version.as_deref(), Some("1.30"));
        assert_eq!(client.list().await.unwrap(), vec!["blue".to_string()]);

        client.force_status("blue", RemoteStatus::Failed).await.unwrap();
        assert_eq!(
            client.describe("blue").await.unwrap().status,
            RemoteStatus::Failed
        );

        drop(client);
        handle.await.unwrap();
    }
}
