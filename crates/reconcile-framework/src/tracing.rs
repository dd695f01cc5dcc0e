//! # Observability & Tracing
//!
//! The engine logs every state transition with structured fields:
//!
//! - `identity`: the resource being reconciled
//! - `status` / `target`: what the last describe saw and what the engine waits for
//! - `phase`: `submitted` or `blocked`
//! - `verb`: creation, update or deletion
//!
//! Public engine operations open a span carrying `kind` and whether the call resumed an
//! in-flight operation (`resumed`).
//!
//! ```bash
//! RUST_LOG=info cargo run      # transitions only
//! RUST_LOG=debug cargo run     # every poll, including converging statuses
//! ```
//!
//! Example output at `info`:
//!
//! ```text
//! INFO create{kind="cluster" resumed=false}: Submitted identity=EKS-7Q2M0ZKD verb=creation
//! INFO In progress attempt=1 message=cluster creation initiated identity=EKS-7Q2M0ZKD
//! INFO create{kind="cluster" resumed=true}: Stable identity=EKS-7Q2M0ZKD status=ACTIVE
//! ```

/// Installs a compact fmt subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // spans already carry the resource kind
        .compact()
        .init();
}
