//! Simulated remote control service: an actor owning the cluster table plus the client
//! the reconciler calls through.

pub mod client;
pub mod request;
pub mod service;

pub use client::ControlPlaneClient;
pub use request::{ControlPlaneRequest, CreateClusterInput};
pub use service::{ControlPlaneService, SimulatorConfig};
