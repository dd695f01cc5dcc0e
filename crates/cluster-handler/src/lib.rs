//! # Cluster Handler Library
//!
//! The managed-cluster resource on top of `reconcile_framework`, plus a simulated control
//! service to run it against. Exposed as a library for integration testing.

pub mod control_plane;
pub mod handler;
pub mod lifecycle;
pub mod model;
