//! # Cluster Handler Demo
//!
//! Drives one cluster through its whole lifecycle against the simulated control service:
//!
//! 1.  Create a cluster with a generated name.
//! 2.  Update its network configuration.
//! 3.  List clusters.
//! 4.  Delete it.
//!
//! Re-invocation delays are shortened so the demo finishes immediately. Run with
//! `RUST_LOG=info` (or `debug` to see every poll).

use cluster_handler::lifecycle::{ClusterSystem, SystemConfig};
use cluster_handler::model::{Cluster, VpcConfig};
use reconcile_framework::tracing::setup_tracing;
use reconcile_framework::{HostConfig, Outcome};
use std::time::Duration;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting cluster lifecycle demo");

    let system = ClusterSystem::new(SystemConfig {
        host: HostConfig::default().with_delay_override(Duration::from_millis(50)),
        ..SystemConfig::default()
    });

    let desired = Cluster::new(
        None,
        "arn:aws:iam::123456789012:role/eks-cluster",
        "1.31",
        VpcConfig {
            security_group_ids: vec!["sg-0a1b2c3d".to_string()],
            subnet_ids: vec!["subnet-1".to_string(), "subnet-2".to_string()],
        },
    );

    let span = tracing::info_span!("cluster_creation");
    let created = async {
        info!("Creating cluster");
        system.create(desired).await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let mut cluster = match created {
        Outcome::Success(cluster) => cluster,
        other => return Err(format!("create did not succeed: {other:?}")),
    };
    info!(
        cluster = cluster.name.as_deref().unwrap_or_default(),
        endpoint = cluster.endpoint.as_deref().unwrap_or_default(),
        "Cluster active"
    );

    let span = tracing::info_span!("cluster_update");
    cluster.resources_vpc_config = Some(VpcConfig {
        security_group_ids: vec![],
        subnet_ids: vec!["subnet-3".to_string()],
    });
    let updated = async {
        info!("Updating network configuration");
        system.update(cluster.clone()).await
    }
    .instrument(span)
    .await;
    match updated {
        Ok(outcome) if outcome.is_success() => info!("Cluster updated"),
        Ok(outcome) => error!(reason = outcome.message().unwrap_or_default(), "Update failed"),
        Err(e) => error!(error = %e, "Update did not finish"),
    }

    if let Outcome::Success(clusters) = system.list().await {
        info!(count = clusters.len(), "Listed clusters");
    }

    let span = tracing::info_span!("cluster_deletion");
    let deleted = async {
        info!("Deleting cluster");
        system.delete(cluster).await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    info!(success = deleted.is_success(), "Deletion finished");

    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
