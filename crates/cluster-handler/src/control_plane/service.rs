//! # Simulated Control Service
//!
//! An in-memory stand-in for the remote cluster API. It runs as a Tokio actor: one task owns
//! the cluster table and answers [`ControlPlaneRequest`]s one at a time, so the table needs
//! no locking.
//!
//! Clusters move through the same statuses the real service reports. A cluster in a
//! transitional status settles once it has been described
//! [`settle_after`](SimulatorConfig::settle_after) times:
//!
//! | Status     | Settles to                 |
//! |------------|----------------------------|
//! | `CREATING` | `ACTIVE`                   |
//! | `UPDATING` | `ACTIVE`                   |
//! | `DELETING` | removed (describe 404s)    |

use super::client::ControlPlaneClient;
use super::request::{ControlPlaneRequest, CreateClusterInput};
use crate::model::{ClusterSnapshot, VpcConfig, VpcConfigResponse};
use reconcile_framework::{RemoteError, RemoteStatus, ServiceErrorCode};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const CERTIFICATE_AUTHORITY_DATA: &str = "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCg==";

/// Knobs of the simulated service.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Describes a transitional cluster needs before it settles.
    pub settle_after: u32,
    /// Maximum number of clusters in the account.
    pub cluster_limit: usize,
    pub region: String,
    pub account: String,
    /// Version given to clusters created without one.
    pub default_version: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            settle_after: 2,
            cluster_limit: 100,
            region: "us-east-1".to_string(),
            account: "123456789012".to_string(),
            default_version: "1.31".to_string(),
        }
    }
}

impl SimulatorConfig {
    pub fn with_settle_after(mut self, polls: u32) -> Self {
        self.settle_after = polls;
        self
    }

    pub fn with_cluster_limit(mut self, limit: usize) -> Self {
        self.cluster_limit = limit;
        self
    }
}

#[derive(Debug)]
struct ClusterRecord {
    snapshot: ClusterSnapshot,
    seq: u32,
    polls: u32,
}

/// The actor half of the simulator. Pair it with the client returned by [`new`](Self::new).
pub struct ControlPlaneService {
    receiver: mpsc::Receiver<ControlPlaneRequest>,
    clusters: BTreeMap<String, ClusterRecord>,
    config: SimulatorConfig,
    next_seq: u32,
    pending_error: Option<RemoteError>,
}

impl ControlPlaneService {
    /// Creates the service and a client connected to it.
    ///
    /// The service does nothing until [`run`](Self::run) is spawned.
    pub fn new(buffer_size: usize, config: SimulatorConfig) -> (Self, ControlPlaneClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            clusters: BTreeMap::new(),
            config,
            next_seq: 1,
            pending_error: None,
        };
        (service, ControlPlaneClient::new(sender))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!(region = %self.config.region, "Control plane started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ControlPlaneRequest::Create { input, respond_to } => {
                    let result = self.api_call().and_then(|()| self.create(input));
                    let _ = respond_to.send(result);
                }
                ControlPlaneRequest::Update {
                    name,
                    vpc,
                    respond_to,
                } => {
                    let result = self.api_call().and_then(|()| self.update(&name, vpc));
                    let _ = respond_to.send(result);
                }
                ControlPlaneRequest::Delete { name, respond_to } => {
                    let result = self.api_call().and_then(|()| self.delete(&name));
                    let _ = respond_to.send(result);
                }
                ControlPlaneRequest::Describe { name, respond_to } => {
                    let result = self.api_call().and_then(|()| self.describe(&name));
                    let _ = respond_to.send(result);
                }
                ControlPlaneRequest::List { respond_to } => {
                    let result = self
                        .api_call()
                        .map(|()| self.clusters.keys().cloned().collect::<Vec<_>>());
                    debug!(result = ?result, "List");
                    let _ = respond_to.send(result);
                }
                ControlPlaneRequest::ForceStatus {
                    name,
                    status,
                    respond_to,
                } => {
                    let result = match self.clusters.get_mut(&name) {
                        Some(record) => {
                            info!(cluster = %name, %status, "Forced status");
                            record.snapshot.status = status;
                            record.polls = 0;
                            Ok(())
                        }
                        None => Err(not_found(&name)),
                    };
                    let _ = respond_to.send(result);
                }
                ControlPlaneRequest::InjectError { error, respond_to } => {
                    debug!(%error, "Armed one-shot error");
                    self.pending_error = Some(error);
                    let _ = respond_to.send(Ok(()));
                }
            }
        }

        info!(size = self.clusters.len(), "Control plane stopped");
    }

    /// Consumes an injected error, if one is armed.
    fn api_call(&mut self) -> Result<(), RemoteError> {
        match self.pending_error.take() {
            Some(error) => {
                warn!(%error, "Injected error");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn create(&mut self, input: CreateClusterInput) -> Result<ClusterSnapshot, RemoteError> {
        if self.clusters.contains_key(&input.name) {
            warn!(cluster = %input.name, "Create rejected: name taken");
            return Err(RemoteError::service(
                ServiceErrorCode::ResourceInUse,
                format!("Cluster already exists with name: {}", input.name),
            ));
        }
        if input.vpc.subnet_ids.is_empty() {
            warn!(cluster = %input.name, "Create rejected: no subnets");
            return Err(RemoteError::service(
                ServiceErrorCode::InvalidParameter,
                "At least one subnet is required",
            ));
        }
        if self.clusters.len() >= self.config.cluster_limit {
            warn!(cluster = %input.name, limit = self.config.cluster_limit, "Create rejected: limit");
            return Err(RemoteError::service(
                ServiceErrorCode::ResourceLimitExceeded,
                format!(
                    "Cluster limit of {} reached for account {}",
                    self.config.cluster_limit, self.config.account
                ),
            ));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let snapshot = ClusterSnapshot {
            arn: Some(format!(
                "arn:aws:eks:{}:{}:cluster/{}",
                self.config.region, self.config.account, input.name
            )),
            name: input.name.clone(),
            status: RemoteStatus::Creating,
            role_arn: input.role_arn,
            version: input
                .version
                .or_else(|| Some(self.config.default_version.clone())),
            endpoint: None,
            certificate_authority_data: None,
            vpc: VpcConfigResponse {
                security_group_ids: input.vpc.security_group_ids,
                subnet_ids: input.vpc.subnet_ids,
                cluster_security_group_id: Some(format!("sg-{seq:017x}")),
                vpc_id: Some(format!("vpc-{seq:017x}")),
            },
        };
        self.clusters.insert(
            input.name.clone(),
            ClusterRecord {
                snapshot: snapshot.clone(),
                seq,
                polls: 0,
            },
        );
        info!(cluster = %input.name, size = self.clusters.len(), "Creating");
        Ok(snapshot)
    }

    fn update(&mut self, name: &str, vpc: VpcConfig) -> Result<(), RemoteError> {
        let record = self.clusters.get_mut(name).ok_or_else(|| not_found(name))?;
        let status = record.snapshot.status;
        if status != RemoteStatus::Active {
            warn!(cluster = %name, %status, "Update rejected: busy");
            return Err(in_use(name, status));
        }
        record.snapshot.vpc.security_group_ids = vpc.security_group_ids;
        record.snapshot.vpc.subnet_ids = vpc.subnet_ids;
        record.snapshot.status = RemoteStatus::Updating;
        record.polls = 0;
        info!(cluster = %name, "Updating");
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), RemoteError> {
        let record = self.clusters.get_mut(name).ok_or_else(|| not_found(name))?;
        let status = record.snapshot.status;
        if matches!(status, RemoteStatus::Creating | RemoteStatus::Updating) {
            warn!(cluster = %name, %status, "Delete rejected: busy");
            return Err(in_use(name, status));
        }
        record.snapshot.status = RemoteStatus::Deleting;
        record.polls = 0;
        info!(cluster = %name, "Deleting");
        Ok(())
    }

    /// Answers with the current snapshot after counting this describe as a poll.
    fn describe(&mut self, name: &str) -> Result<ClusterSnapshot, RemoteError> {
        let settle_after = self.config.settle_after;
        let region = self.config.region.clone();
        let record = self.clusters.get_mut(name).ok_or_else(|| not_found(name))?;

        if record.snapshot.status.is_transitional() {
            record.polls += 1;
            if record.polls >= settle_after {
                match record.snapshot.status {
                    RemoteStatus::Deleting => {
                        self.clusters.remove(name);
                        info!(cluster = %name, size = self.clusters.len(), "Deleted");
                        return Err(not_found(name));
                    }
                    previous => {
                        record.snapshot.status = RemoteStatus::Active;
                        record.polls = 0;
                        if record.snapshot.endpoint.is_none() {
                            record.snapshot.endpoint = Some(format!(
                                "https://{:032X}.gr7.{region}.eks.amazonaws.com",
                                record.seq
                            ));
                            record.snapshot.certificate_authority_data =
                                Some(CERTIFICATE_AUTHORITY_DATA.to_string());
                        }
                        info!(cluster = %name, from = %previous, "Active");
                    }
                }
            }
        }

        debug!(cluster = %name, status = %record.snapshot.status, polls = record.polls, "Describe");
        Ok(record.snapshot.clone())
    }
}

fn not_found(name: &str) -> RemoteError {
    RemoteError::service(
        ServiceErrorCode::ResourceNotFound,
        format!("No cluster found for name: {name}."),
    )
}

fn in_use(name: &str, status: RemoteStatus) -> RemoteError {
    RemoteError::service(
        ServiceErrorCode::ResourceInUse,
        format!("Cluster {name} is currently {status}"),
    )
}
