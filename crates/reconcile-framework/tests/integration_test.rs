use reconcile_framework::mock::MockControlPlane;
use reconcile_framework::{
    ContinuationContext, ErrorKind, HostConfig, HostError, InvocationHost, ManagedResource,
    Outcome, Reconciler, ReconcilerConfig, RemoteError, RemoteStatus, ServiceErrorCode,
};
use std::time::Duration;

// --- Test Resource ---

#[derive(Clone, Debug, Default, PartialEq)]
struct Cache {
    name: Option<String>,
    arn: Option<String>,
    endpoint: Option<String>,
}

#[derive(Clone, Debug)]
struct CacheSnapshot {
    name: String,
    status: RemoteStatus,
    arn: String,
    endpoint: Option<String>,
}

impl ManagedResource for Cache {
    type Snapshot = CacheSnapshot;
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

    fn status(snapshot: &CacheSnapshot) -> RemoteStatus {
        snapshot.status
    }

    fn apply_snapshot(&mut self, snapshot: &CacheSnapshot) {
        self.name = Some(snapshot.name.clone());
        self.arn = Some(snapshot.arn.clone());
        self.endpoint = snapshot.endpoint.clone();
    }
}

fn snapshot(name: &str, status: RemoteStatus) -> CacheSnapshot {
    CacheSnapshot {
        name: name.to_string(),
        status,
        arn: format!("arn:test:cache/{name}"),
        endpoint: (status == RemoteStatus::Active).then(|| format!("https://{name}.local")),
    }
}

fn fast_host(max_attempts: u32) -> InvocationHost {
    InvocationHost::new(
        HostConfig::default()
            .with_max_attempts(max_attempts)
            .with_delay_override(Duration::ZERO),
    )
}

// --- Tests ---

/// Submit, one converging poll, then the poll that sees ACTIVE.
#[tokio::test]
async fn test_create_happy_path_across_invocations() {
    let mut mock = MockControlPlane::<Cache>::new();
    mock.expect_submit_create()
        .return_ok(snapshot("blue", RemoteStatus::Creating));
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Creating));
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Active));

    let reconciler = Reconciler::new(mock.clone());
    let desired = Cache::from_identity("blue".into());

    let first = reconciler.create(desired, None).await;
    assert_eq!(first.context(), Some(&ContinuationContext::submitted("blue")));

    let ctx = first.context().cloned();
    let second = reconciler.create(first.into_model(), ctx).await;
    assert_eq!(second.message(), Some("cluster CREATING"));
    assert_eq!(second.context().map(|c| c.op_complete()), Some(true));

    let ctx = second.context().cloned();
    match reconciler.create(second.into_model(), ctx).await {
        Outcome::Success(cache) => {
            assert_eq!(cache.name.as_deref(), Some("blue"));
            assert_eq!(cache.arn.as_deref(), Some("arn:test:cache/blue"));
            assert_eq!(cache.endpoint.as_deref(), Some("https://blue.local"));
        }
        other => panic!("expected Success, got {other:?}"),
    }
    mock.verify();
}

#[tokio::test]
async fn test_host_drives_generated_identity_through_context() {
    let mut mock = MockControlPlane::<Cache>::new();
    // Snapshot names are ignored below; only the identity the engine generated matters.
    mock.expect_submit_create()
        .return_ok(snapshot("EKS-PLACEHOLD", RemoteStatus::Creating));
    mock.expect_describe()
        .return_ok(snapshot("EKS-PLACEHOLD", RemoteStatus::Active));

    let reconciler = Reconciler::new(mock.clone());
    let reconciler = &reconciler;
    let outcome = fast_host(5)
        .drive(Cache::default(), move |model, ctx| reconciler.create(model, ctx))
        .await
        .unwrap();

    assert!(outcome.is_success());
    let submitted = mock.submitted_identities();
    assert!(submitted[0].starts_with("EKS-"));
    // The poll asked about the name returned by the submission.
    assert_eq!(mock.described_identities(), vec!["EKS-PLACEHOLD".to_string()]);
}

#[tokio::test]
async fn test_host_reports_blocked_update_then_success() {
    let mut mock = MockControlPlane::<Cache>::new();
    mock.expect_submit_update().return_err(RemoteError::service(
        ServiceErrorCode::ResourceInUse,
        "Cluster has update in progress",
    ));
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Updating));
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Active));
    mock.expect_submit_update().return_ok(());
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Active));

    let reconciler = Reconciler::new(mock.clone());
    let reconciler = &reconciler;
    let outcome = fast_host(10)
        .drive(Cache::from_identity("blue".into()), move |model, ctx| {
            reconciler.update(model, ctx)
        })
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(mock.submitted_identities(), vec!["blue", "blue"]);
    mock.verify();
}

#[tokio::test]
async fn test_host_stops_on_terminal_failure() {
    let mut mock = MockControlPlane::<Cache>::new();
    mock.expect_submit_delete().return_ok(());
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Failed));

    let reconciler = Reconciler::new(mock.clone());
    let reconciler = &reconciler;
    let outcome = fast_host(10)
        .drive(Cache::from_identity("blue".into()), move |model, ctx| {
            reconciler.delete(model, ctx)
        })
        .await
        .unwrap();

    assert_eq!(outcome.error_kind(), Some(ErrorKind::GeneralServiceException));
    assert_eq!(outcome.message(), Some("cluster status is FAILED"));
}

#[tokio::test]
async fn test_host_gives_up_after_budget() {
    let mut mock = MockControlPlane::<Cache>::new();
    mock.expect_submit_delete().return_ok(());
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Deleting));
    mock.expect_describe()
        .return_ok(snapshot("blue", RemoteStatus::Deleting));

    let reconciler = Reconciler::new(mock.clone());
    let reconciler = &reconciler;
    let result = fast_host(3)
        .drive(Cache::from_identity("blue".into()), move |model, ctx| {
            reconciler.delete(model, ctx)
        })
        .await;

    assert!(matches!(result, Err(HostError::AttemptsExhausted(3))));
    mock.verify();
}

#[tokio::test]
async fn test_configured_delay_reaches_host() {
    let mut mock = MockControlPlane::<Cache>::new();
    mock.expect_submit_delete().return_ok(());

    let config = ReconcilerConfig::default().with_callback_delay(Duration::from_secs(30));
    let reconciler = Reconciler::with_config(mock, config);

    match reconciler.delete(Cache::from_identity("blue".into()), None).await {
        Outcome::InProgress { delay, .. } => assert_eq!(delay, Duration::from_secs(30)),
        other => panic!("expected InProgress, got {other:?}"),
    }
}
