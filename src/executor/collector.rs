//! Thread-safe accumulation of per-host results.

use parking_lot::Mutex;
use tracing::warn;

use crate::report::RunReport;
use crate::result::HostResult;

/// Accumulates [`HostResult`]s into a [`RunReport`] under a short-held lock.
///
/// `record` does O(1) work inside the lock and never blocks indefinitely.
/// A duplicate terminal result for a host is an internal invariant violation
/// (it cannot happen under correct dispatch); the collector keeps the
/// first-recorded result, logs the incident, and carries on.
#[derive(Debug, Default)]
pub struct ResultCollector {
    inner: Mutex<RunReport>,
}

impl ResultCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one host's terminal result.
    pub fn record(&self, result: HostResult) {
        let mut report = self.inner.lock();
        if report.contains(&result.host) {
            warn!(
                host = %result.host,
                outcome = %result.outcome,
                "duplicate terminal result discarded, keeping the first"
            );
            return;
        }
        report.push(result);
    }

    /// A consistent point-in-time view of the report so far.
    pub fn snapshot(&self) -> RunReport {
        self.inner.lock().clone()
    }

    /// Consume the collector, yielding the final report.
    pub fn into_report(self) -> RunReport {
        self.inner.into_inner()
    }
}
