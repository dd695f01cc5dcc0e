use reconcile_framework::{ManagedResource, RemoteStatus};
use serde::{Deserialize, Serialize};

/// Desired and observed shape of a managed cluster control plane.
///
/// # Reconcile Framework
/// This struct implements the [`ManagedResource`] trait, so the generic
/// [`Reconciler`](reconcile_framework::Reconciler) can drive it.
///
/// - `name`, `role_arn`, `version` and `resources_vpc_config` are creation inputs.
///   Only the VPC configuration can be changed by an update.
/// - `arn`, `endpoint`, `certificate_authority_data` and `cluster_security_group_id`
///   are read-only outputs filled in from describe responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_vpc_config: Option<VpcConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_security_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Network attachment of the control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfig {
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
}

impl Cluster {
    /// A desired cluster with the inputs a create needs.
    pub fn new(
        name: Option<String>,
        role_arn: impl Into<String>,
        version: impl Into<String>,
        vpc: VpcConfig,
    ) -> Self {
        Self {
            name,
            role_arn: Some(role_arn.into()),
            version: Some(version.into()),
            resources_vpc_config: Some(vpc),
            ..Self::default()
        }
    }

    pub fn vpc(&self) -> VpcConfig {
        self.resources_vpc_config.clone().unwrap_or_default()
    }
}

/// One describe response from the control service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSnapshot {
    pub name: String,
    pub status: RemoteStatus,
    pub arn: Option<String>,
    pub role_arn: Option<String>,
    pub version: Option<String>,
    pub endpoint: Option<String>,
    pub certificate_authority_data: Option<String>,
    pub vpc: VpcConfigResponse,
}

/// Network attachment as reported by the service, including what it generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpcConfigResponse {
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
    pub cluster_security_group_id: Option<String>,
    pub vpc_id: Option<String>,
}

impl ManagedResource for Cluster {
    type Snapshot = ClusterSnapshot;
    const KIND: &'static str = "cluster";

    fn identity(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_identity(&mut self, identity: String) {
        self.name = Some(identity);
    }

    fn from_identity(identity: String) -> Self {
        Self {
            name: Some(identity),
            ..Self::default()
        }
    }

    fn status(snapshot: &ClusterSnapshot) -> RemoteStatus {
        snapshot.status
    }

    fn apply_snapshot(&mut self, snapshot: &ClusterSnapshot) {
        self.name = Some(snapshot.name.clone());
        self.role_arn = snapshot.role_arn.clone();
        self.version = snapshot.version.clone();
        self.resources_vpc_config = Some(VpcConfig {
            security_group_ids: snapshot.vpc.security_group_ids.clone(),
            subnet_ids: snapshot.vpc.subnet_ids.clone(),
        });
        self.arn = snapshot.arn.clone();
        self.certificate_authority_data = snapshot.certificate_authority_data.clone();
        self.cluster_security_group_id = snapshot.vpc.cluster_security_group_id.clone();
        self.endpoint = snapshot.endpoint.clone();
    }
}
