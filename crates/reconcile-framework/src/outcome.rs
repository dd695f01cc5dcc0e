//! # Outcomes
//!
//! Every engine operation answers with exactly one [`Outcome`]: terminal success,
//! terminal failure, or "call me again later with this context".

use crate::context::ContinuationContext;
use crate::error::{ErrorKind, RemoteError};
use std::time::Duration;

/// Result of one engine invocation.
///
/// `T` is the resource model for single-resource operations and `Vec<model>` for `list`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failed {
        model: T,
        kind: ErrorKind,
        message: String,
    },
    InProgress {
        model: T,
        message: String,
        context: ContinuationContext,
        /// How long the host should wait before re-invoking.
        delay: Duration,
    },
}

impl<T> Outcome<T> {
    /// A failure carrying the classified kind and the original error text.
    pub fn failed(model: T, error: &RemoteError) -> Self {
        Outcome::Failed {
            model,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Outcome::InProgress { .. })
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_in_progress()
    }

    pub fn model(&self) -> &T {
        match self {
            Outcome::Success(model)
            | Outcome::Failed { model, .. }
            | Outcome::InProgress { model, .. } => model,
        }
    }

    pub fn into_model(self) -> T {
        match self {
            Outcome::Success(model)
            | Outcome::Failed { model, .. }
            | Outcome::InProgress { model, .. } => model,
        }
    }

    pub fn context(&self) -> Option<&ContinuationContext> {
        match self {
            Outcome::InProgress { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failed { message, .. } | Outcome::InProgress { message, .. } => {
                Some(message)
            }
        }
    }
}
