//! # Continuation Context
//!
//! The only state that survives between invocations. The engine hands a
//! [`ContinuationContext`] out with every in-progress outcome and gets it back, verbatim,
//! on the next invocation.
//!
//! Inside the crate the context is a typed struct with an explicit [`Phase`]. The host
//! only ever sees the opaque string-keyed map produced by
//! [`ContinuationContext::to_opaque`]; decoding it back is the single place a malformed
//! context can be detected.

use crate::error::ContextError;
use serde_json::{Map, Value};
use std::fmt;

/// Key holding the resource identity in the opaque map.
pub const IDENTITY_KEY: &str = "Identity";
/// Older hosts persisted the identity under this key; it is still accepted on decode.
pub const CLUSTER_NAME_KEY: &str = "ClusterName";
/// Key holding the operation-submitted flag in the opaque map.
pub const OP_COMPLETE_KEY: &str = "OpComplete";

/// The host's view of a continuation context.
pub type OpaqueContext = Map<String, Value>;

/// Where an in-flight operation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The mutation was accepted; subsequent invocations poll status.
    Submitted,
    /// The mutation was refused because another operation is still settling.
    /// Subsequent invocations wait for the resource to go quiet, then resubmit.
    Blocked,
}

impl Phase {
    /// The `OpComplete` flag this phase is persisted as.
    pub fn op_complete(self) -> bool {
        matches!(self, Phase::Submitted)
    }

    pub fn from_op_complete(op_complete: bool) -> Self {
        if op_complete {
            Phase::Submitted
        } else {
            Phase::Blocked
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Submitted => f.write_str("submitted"),
            Phase::Blocked => f.write_str("blocked"),
        }
    }
}

/// Typed continuation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationContext {
    pub identity: String,
    pub phase: Phase,
}

impl ContinuationContext {
    pub fn new(identity: impl Into<String>, phase: Phase) -> Self {
        Self {
            identity: identity.into(),
            phase,
        }
    }

    pub fn submitted(identity: impl Into<String>) -> Self {
        Self::new(identity, Phase::Submitted)
    }

    pub fn blocked(identity: impl Into<String>) -> Self {
        Self::new(identity, Phase::Blocked)
    }

    pub fn op_complete(&self) -> bool {
        self.phase.op_complete()
    }

    /// Serializes into the host's opaque map.
    pub fn to_opaque(&self) -> OpaqueContext {
        let mut map = Map::new();
        map.insert(IDENTITY_KEY.to_string(), Value::String(self.identity.clone()));
        map.insert(OP_COMPLETE_KEY.to_string(), Value::Bool(self.op_complete()));
        map
    }

    /// Decodes a map previously produced by [`to_opaque`](Self::to_opaque).
    ///
    /// Unknown keys are ignored so a host may stash its own bookkeeping alongside ours.
    pub fn from_opaque(map: &OpaqueContext) -> Result<Self, ContextError> {
        let found = map
            .get(IDENTITY_KEY)
            .map(|value| (IDENTITY_KEY, value))
            .or_else(|| map.get(CLUSTER_NAME_KEY).map(|value| (CLUSTER_NAME_KEY, value)));
        let identity = match found {
            Some((_, Value::String(identity))) => identity.clone(),
            Some((field, _)) => {
                return Err(ContextError::WrongType {
                    field,
                    expected: "string",
                })
            }
            None => return Err(ContextError::MissingField(IDENTITY_KEY)),
        };
        let op_complete = match map.get(OP_COMPLETE_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(ContextError::WrongType {
                    field: OP_COMPLETE_KEY,
                    expected: "boolean",
                })
            }
            None => return Err(ContextError::MissingField(OP_COMPLETE_KEY)),
        };
        Ok(Self::new(identity, Phase::from_op_complete(op_complete)))
    }
}
