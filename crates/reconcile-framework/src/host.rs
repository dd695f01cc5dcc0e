//! # Invocation Host
//!
//! A reference host for the reconciler's re-invocation contract. Production hosts live
//! outside this crate; this one backs the demo binary and end-to-end tests.
//!
//! ## Contract
//!
//! 1. Invoke with no context.
//! 2. On `InProgress`, persist the context as the opaque map, wait the requested delay,
//!    decode the map and invoke again with the returned model.
//! 3. Stop on the first terminal outcome.
//!
//! The host never invokes two rounds of the same operation at once, and it owns the
//! give-up policy ([`HostConfig::max_attempts`]).

use crate::context::{ContinuationContext, OpaqueContext};
use crate::error::HostError;
use crate::outcome::Outcome;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retry-count and timing policy above the engine.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub max_attempts: u32,
    /// Replaces the engine's requested delay (demos and tests).
    pub delay_override: Option<Duration>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            delay_override: None,
        }
    }
}

impl HostConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay_override(mut self, delay: Duration) -> Self {
        self.delay_override = Some(delay);
        self
    }
}

/// Drives one operation from first invocation to terminal outcome.
#[derive(Debug, Clone, Default)]
pub struct InvocationHost {
    config: HostConfig,
}

impl InvocationHost {
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Invokes `invoke` until it returns a terminal outcome.
    ///
    /// Each round receives the model from the previous outcome and the context decoded
    /// from the persisted opaque map.
    pub async fn drive<T, F, Fut>(&self, model: T, mut invoke: F) -> Result<Outcome<T>, HostError>
    where
        F: FnMut(T, Option<ContinuationContext>) -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let mut model = model;
        let mut persisted: Option<OpaqueContext> = None;

        for attempt in 1..=self.config.max_attempts {
            let context = persisted
                .as_ref()
                .map(ContinuationContext::from_opaque)
                .transpose()?;

            match invoke(model, context).await {
                Outcome::InProgress {
                    model: next,
                    message,
                    context,
                    delay,
                } => {
                    let delay = self.config.delay_override.unwrap_or(delay);
                    info!(attempt, %message, identity = %context.identity, "In progress");
                    debug!(?delay, "Waiting before re-invoking");
                    persisted = Some(context.to_opaque());
                    model = next;
                    tokio::time::sleep(delay).await;
                }
                terminal => {
                    info!(attempt, success = terminal.is_success(), "Terminal outcome");
                    return Ok(terminal);
                }
            }
        }

        warn!(attempts = self.config.max_attempts, "Giving up");
        Err(HostError::AttemptsExhausted(self.config.max_attempts))
    }
}
