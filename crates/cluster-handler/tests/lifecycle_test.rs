use cluster_handler::control_plane::SimulatorConfig;
use cluster_handler::lifecycle::{ClusterSystem, SystemConfig};
use cluster_handler::model::{Cluster, VpcConfig};
use reconcile_framework::{
    ErrorKind, HostConfig, ManagedResource, Outcome, RemoteError, RemoteStatus, ServiceErrorCode,
};
use std::time::Duration;

// --- Helpers ---

fn system_with(simulator: SimulatorConfig) -> ClusterSystem {
    ClusterSystem::new(SystemConfig {
        host: HostConfig::default()
            .with_max_attempts(20)
            .with_delay_override(Duration::ZERO),
        simulator,
        ..SystemConfig::default()
    })
}

fn system() -> ClusterSystem {
    system_with(SimulatorConfig::default())
}

fn vpc(subnets: &[&str]) -> VpcConfig {
    VpcConfig {
        security_group_ids: vec!["sg-1".to_string()],
        subnet_ids: subnets.iter().map(|s| s.to_string()).collect(),
    }
}

fn desired(name: Option<&str>) -> Cluster {
    Cluster::new(
        name.map(str::to_string),
        "arn:aws:iam::123456789012:role/eks",
        "1.31",
        vpc(&["subnet-1", "subnet-2"]),
    )
}

fn expect_success<T: std::fmt::Debug>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Success(value) => value,
        other => panic!("expected Success, got {other:?}"),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_full_lifecycle() {
    let system = system();

    // Create with a generated name.
    let created = expect_success(system.create(desired(None)).await.unwrap());
    let name = created.name.clone().unwrap();
    assert!(name.starts_with("EKS-"));
    assert_eq!(name.len(), 12);
    assert_eq!(
        created.arn.as_deref(),
        Some(format!("arn:aws:eks:us-east-1:123456789012:cluster/{name}").as_str())
    );
    assert!(created.endpoint.is_some());
    assert!(created.certificate_authority_data.is_some());
    assert!(created.cluster_security_group_id.is_some());

    // Read by name only.
    let read = expect_success(system.read(Cluster::from_identity(name.clone())).await);
    assert_eq!(read.endpoint, created.endpoint);
    assert_eq!(read.role_arn.as_deref(), Some("arn:aws:iam::123456789012:role/eks"));

    // Update the network configuration.
    let mut change = read.clone();
    change.resources_vpc_config = Some(vpc(&["subnet-9"]));
    let updated = expect_success(system.update(change).await.unwrap());
    assert_eq!(updated.vpc().subnet_ids, vec!["subnet-9"]);

    // List sees it.
    let listed = expect_success(system.list().await);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name.as_deref(), Some(name.as_str()));
    assert_eq!(listed[0].endpoint, created.endpoint);

    // Delete, then it is gone.
    let deleted = system.delete(updated).await.unwrap();
    assert!(deleted.is_success());

    let gone = system.read(Cluster::from_identity(name)).await;
    assert_eq!(gone.error_kind(), Some(ErrorKind::NotFound));
    assert!(expect_success(system.list().await).is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_update_blocked_while_creating() {
    let system = system();

    // Submit the create but do not wait for it.
    let first = system.reconciler.create(desired(Some("blue")), None).await;
    assert!(first.is_in_progress());

    let mut change = desired(Some("blue"));
    change.resources_vpc_config = Some(vpc(&["subnet-9"]));
    let updated = expect_success(system.update(change).await.unwrap());

    // The change submitted after the wait is the desired one, not the remote's.
    assert_eq!(updated.vpc().subnet_ids, vec!["subnet-9"]);
    let read = expect_success(system.read(Cluster::from_identity("blue".into())).await);
    assert_eq!(read.vpc().subnet_ids, vec!["subnet-9"]);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_delete_blocked_while_updating() {
    let system = system();
    let created = expect_success(system.create(desired(Some("blue"))).await.unwrap());

    // Leave the cluster UPDATING.
    let first = system.reconciler.update(created.clone(), None).await;
    assert!(first.is_in_progress());

    let deleted = system.delete(created).await.unwrap();
    assert!(deleted.is_success());
    assert!(expect_success(system.list().await).is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_blocked_delete_removes_failed_cluster() {
    let system = system();

    // Delete arrives while the create is still running.
    let created = system.reconciler.create(desired(Some("blue")), None).await;
    let blocked = system.reconciler.delete(created.into_model(), None).await;
    assert_eq!(blocked.context().map(|c| c.op_complete()), Some(false));

    // The create then fails; the queued delete must still go through.
    system
        .control_plane
        .force_status("blue", RemoteStatus::Failed)
        .await
        .unwrap();
    let context = blocked.context().cloned();
    let resubmitted = system.reconciler.delete(blocked.into_model(), context).await;
    assert_eq!(resubmitted.context().map(|c| c.op_complete()), Some(true));

    let mut outcome = resubmitted;
    while outcome.is_in_progress() {
        let context = outcome.context().cloned();
        outcome = system.reconciler.delete(outcome.into_model(), context).await;
    }
    assert!(outcome.is_success());
    assert!(expect_success(system.list().await).is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_cluster_is_terminal() {
    let system = system();

    let first = system.reconciler.create(desired(Some("blue")), None).await;
    let context = first.context().cloned();
    system
        .control_plane
        .force_status("blue", RemoteStatus::Failed)
        .await
        .unwrap();

    let second = system.reconciler.create(first.into_model(), context).await;
    assert_eq!(second.error_kind(), Some(ErrorKind::GeneralServiceException));
    assert_eq!(second.message(), Some("cluster status is FAILED"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_create_rejections_are_classified() {
    let system = system_with(SimulatorConfig::default().with_cluster_limit(1));
    expect_success(system.create(desired(Some("blue"))).await.unwrap());

    let duplicate = system.create(desired(Some("blue"))).await.unwrap();
    assert_eq!(duplicate.error_kind(), Some(ErrorKind::AlreadyExists));

    let mut no_subnets = desired(Some("green"));
    no_subnets.resources_vpc_config = Some(vpc(&[]));
    let invalid = system.create(no_subnets).await.unwrap();
    assert_eq!(invalid.error_kind(), Some(ErrorKind::InvalidRequest));

    let over_limit = system.create(desired(Some("green"))).await.unwrap();
    assert_eq!(over_limit.error_kind(), Some(ErrorKind::ServiceLimitExceeded));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_update_unknown_cluster_is_not_found() {
    let system = system();

    let outcome = system.update(desired(Some("ghost"))).await.unwrap();
    assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_list_error_fails_listing() {
    let system = system();
    expect_success(system.create(desired(Some("blue"))).await.unwrap());

    system
        .control_plane
        .inject_error(RemoteError::service(ServiceErrorCode::Server, "internal"))
        .await
        .unwrap();
    let listed = system.list().await;
    assert_eq!(listed.error_kind(), Some(ErrorKind::GeneralServiceException));
    assert!(listed.model().is_empty());

    // The injected error fires once.
    assert_eq!(expect_success(system.list().await).len(), 1);

    system.shutdown().await.unwrap();
}
