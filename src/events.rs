//! Optional per-run event notifications.
//!
//! The core call contract is synchronous: `run(...)` blocks until the run
//! finishes. An [`EventSink`] is an extension point for callers that want
//! per-host completion notifications while a run is in flight. Sinks receive
//! borrowed data and must not block; [`ChannelSink`] forwards results over a
//! channel for callers that want to consume them elsewhere.

use tokio::sync::mpsc;

use crate::result::HostResult;
use crate::task::Task;

/// Receiver of run progress notifications.
///
/// All methods have empty default implementations; implement only what you
/// need. Implementations must be cheap: they are invoked on the dispatch
/// path.
pub trait EventSink: Send + Sync {
    /// A dispatch is starting for `name` (module or playbook) across
    /// `host_count` hosts.
    fn on_run_start(&self, _name: &str, _host_count: usize) {}

    /// A playbook task is about to be dispatched.
    fn on_task_start(&self, _task: &Task) {}

    /// A host finished its action and produced a terminal result.
    fn on_host_result(&self, _result: &HostResult) {}
}

/// Sink that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}

/// Sink that forwards each [`HostResult`] into an unbounded channel.
///
/// Dropping the receiver is harmless; further sends are silently discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<HostResult>,
}

impl ChannelSink {
    /// Create a sink and the receiving half for consuming results.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn on_host_result(&self, result: &HostResult) {
        let _ = self.tx.send(result.clone());
    }
}
