use crate::control_plane::{ControlPlaneClient, ControlPlaneService, SimulatorConfig};
use crate::model::Cluster;
use reconcile_framework::{
    HostConfig, HostError, InvocationHost, Outcome, Reconciler, ReconcilerConfig,
};
use tracing::{error, info};

/// The runtime for reconciling clusters against the simulated control service.
///
/// `ClusterSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the control service actor
/// - **Dependency Wiring**: Handing the service client to the [`Reconciler`]
/// - **Driving**: Running mutations to completion through an [`InvocationHost`]
///
/// # Example
///
/// ```ignore
/// let system = ClusterSystem::new(SystemConfig::default());
///
/// let created = system.create(desired).await?;
/// let listed = system.list().await;
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct ClusterSystem {
    pub reconciler: Reconciler<Cluster, ControlPlaneClient>,

    /// Direct handle to the service, for test hooks.
    pub control_plane: ControlPlaneClient,

    host: InvocationHost,
    handle: tokio::task::JoinHandle<()>,
}

/// Everything needed to start a [`ClusterSystem`].
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    pub reconciler: ReconcilerConfig,
    pub host: HostConfig,
    pub simulator: SimulatorConfig,
}

impl ClusterSystem {
    /// Spawns the control service and wires a reconciler to it.
    pub fn new(config: SystemConfig) -> Self {
        let (service, control_plane) = ControlPlaneService::new(32, config.simulator);
        let handle = tokio::spawn(service.run());

        Self {
            reconciler: Reconciler::with_config(control_plane.clone(), config.reconciler),
            control_plane,
            host: InvocationHost::new(config.host),
            handle,
        }
    }

    pub async fn create(&self, desired: Cluster) -> Result<Outcome<Cluster>, HostError> {
        let reconciler = &self.reconciler;
        self.host
            .drive(desired, move |model, ctx| reconciler.create(model, ctx))
            .await
    }

    pub async fn update(&self, desired: Cluster) -> Result<Outcome<Cluster>, HostError> {
        let reconciler = &self.reconciler;
        self.host
            .drive(desired, move |model, ctx| reconciler.update(model, ctx))
            .await
    }

    pub async fn delete(&self, desired: Cluster) -> Result<Outcome<Cluster>, HostError> {
        let reconciler = &self.reconciler;
        self.host
            .drive(desired, move |model, ctx| reconciler.delete(model, ctx))
            .await
    }

    pub async fn read(&self, model: Cluster) -> Outcome<Cluster> {
        self.reconciler.read(model).await
    }

    pub async fn list(&self) -> Outcome<Vec<Cluster>> {
        self.reconciler.list().await
    }

    /// Gracefully shuts down the control service.
    ///
    /// Dropping the reconciler and the test handle closes the service's channel; the actor
    /// then leaves its loop and the task completes.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.reconciler);
        drop(self.control_plane);

        if let Err(e) = self.handle.await {
            error!("Control plane task failed: {:?}", e);
            return Err(format!("Control plane task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
