//! Per-host execution results.
//!
//! A [`HostResult`] is produced once per host per dispatch and owned by the
//! collector thereafter. Payloads are free-form JSON mappings (stdout,
//! stderr, diffs, module-specific keys) and are never mutated after
//! creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form result payload: string keys mapped to arbitrary JSON values.
pub type Payload = serde_json::Map<String, Value>;

/// Terminal outcome of one host's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The action completed without reporting failure.
    Ok,
    /// The action executed but reported failure.
    Failed,
    /// The connection could not be established or timed out.
    Unreachable,
}

impl Outcome {
    /// Ranking used when merging reports across tasks: a host's terminal
    /// outcome is the worst it ever produced.
    pub(crate) fn severity(self) -> u8 {
        match self {
            Outcome::Ok => 0,
            Outcome::Failed => 1,
            Outcome::Unreachable => 2,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ok => write!(f, "ok"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// The result of executing one action on one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResult {
    /// Host identifier.
    pub host: String,
    /// Outcome classification.
    pub outcome: Outcome,
    /// Raw structured payload from the action.
    pub payload: Payload,
    /// When the result was produced.
    pub timestamp: DateTime<Utc>,
}

impl HostResult {
    fn new(host: impl Into<String>, outcome: Outcome, payload: Payload) -> Self {
        Self {
            host: host.into(),
            outcome,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// A successful result.
    pub fn ok(host: impl Into<String>, payload: Payload) -> Self {
        Self::new(host, Outcome::Ok, payload)
    }

    /// The action executed but reported failure.
    pub fn failed(host: impl Into<String>, payload: Payload) -> Self {
        Self::new(host, Outcome::Failed, payload)
    }

    /// The host could not be reached.
    pub fn unreachable(host: impl Into<String>, payload: Payload) -> Self {
        Self::new(host, Outcome::Unreachable, payload)
    }

    /// Render the legacy record form: one JSON object keyed by the host
    /// identifier, containing the raw payload.
    pub fn record(&self) -> Value {
        let mut record = Payload::new();
        record.insert(self.host.clone(), Value::Object(self.payload.clone()));
        Value::Object(record)
    }
}
