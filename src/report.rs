//! Aggregated run reports.
//!
//! A [`RunReport`] partitions the hosts of a run into three disjoint outcome
//! sets and keeps the ordered sequence of raw per-host results (completion
//! order, not host-list order). Reports are created fresh per run, merged
//! across playbook tasks, and owned by the caller once the run completes.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::{HostResult, Outcome, Payload};

/// Aggregation of all [`HostResult`]s for one run.
///
/// Invariant: a host identifier appears in at most one of `ok`, `failed`,
/// and `unreachable`; by run completion every in-scope host appears in
/// exactly one. Hosts absent from all three sets were never dispatched
/// (e.g. after cancellation) and must be treated as unknown, not as
/// successful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Hosts whose actions completed without failure.
    pub ok: IndexSet<String>,
    /// Hosts whose actions executed but reported failure.
    pub failed: IndexSet<String>,
    /// Hosts that could not be reached.
    pub unreachable: IndexSet<String>,
    /// Raw per-host results in completion order.
    pub results: Vec<HostResult>,
    /// Registered task payloads: register name -> host -> payload.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub registers: IndexMap<String, IndexMap<String, Payload>>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given host already has a terminal outcome in this report.
    pub fn contains(&self, host: &str) -> bool {
        self.ok.contains(host) || self.failed.contains(host) || self.unreachable.contains(host)
    }

    /// The outcome currently recorded for a host, if any.
    pub fn outcome_of(&self, host: &str) -> Option<Outcome> {
        if self.ok.contains(host) {
            Some(Outcome::Ok)
        } else if self.failed.contains(host) {
            Some(Outcome::Failed)
        } else if self.unreachable.contains(host) {
            Some(Outcome::Unreachable)
        } else {
            None
        }
    }

    /// All hosts with a terminal outcome, in first-recorded order per bucket.
    pub fn hosts(&self) -> IndexSet<String> {
        let mut hosts = IndexSet::new();
        hosts.extend(self.ok.iter().cloned());
        hosts.extend(self.failed.iter().cloned());
        hosts.extend(self.unreachable.iter().cloned());
        hosts
    }

    fn bucket_mut(&mut self, outcome: Outcome) -> &mut IndexSet<String> {
        match outcome {
            Outcome::Ok => &mut self.ok,
            Outcome::Failed => &mut self.failed,
            Outcome::Unreachable => &mut self.unreachable,
        }
    }

    /// Record a result for a host not yet present in this report.
    ///
    /// The collector guarantees uniqueness within one dispatch; merging
    /// across dispatches goes through [`merge`](RunReport::merge) instead.
    pub(crate) fn push(&mut self, result: HostResult) {
        debug_assert!(!self.contains(&result.host));
        self.bucket_mut(result.outcome).insert(result.host.clone());
        self.results.push(result);
    }

    /// Merge another report into this one.
    ///
    /// A host's terminal outcome set is the worst outcome it produced across
    /// the merged reports (`Unreachable` over `Failed` over `Ok`). Result
    /// sequences concatenate in completion order; register maps union, with
    /// the incoming report winning on key collisions.
    pub fn merge(&mut self, other: RunReport) {
        for result in other.results {
            match self.outcome_of(&result.host) {
                None => {
                    self.bucket_mut(result.outcome).insert(result.host.clone());
                }
                Some(current) if result.outcome.severity() > current.severity() => {
                    self.bucket_mut(current).shift_remove(&result.host);
                    self.bucket_mut(result.outcome).insert(result.host.clone());
                }
                Some(_) => {}
            }
            self.results.push(result);
        }
        for (name, hosts) in other.registers {
            let entry = self.registers.entry(name).or_default();
            for (host, payload) in hosts {
                entry.insert(host, payload);
            }
        }
    }

    /// Store one dispatch's per-host payloads under a register name.
    pub(crate) fn register(&mut self, name: &str, dispatch: &RunReport) {
        let entry = self.registers.entry(name.to_string()).or_default();
        for result in &dispatch.results {
            entry.insert(result.host.clone(), result.payload.clone());
        }
    }

    /// Render the legacy record sequence: one JSON object per result, keyed
    /// by host identifier, in completion order.
    pub fn to_records(&self) -> Vec<Value> {
        self.results.iter().map(HostResult::record).collect()
    }

    /// One-line outcome summary, for logging.
    pub fn summary(&self) -> String {
        format!(
            "ok={} failed={} unreachable={}",
            self.ok.len(),
            self.failed.len(),
            self.unreachable.len()
        )
    }
}
