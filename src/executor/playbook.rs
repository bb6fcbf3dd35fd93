//! Batch-synchronous playbook execution.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::connection::Connection;
use crate::error::Result;
use crate::events::EventSink;
use crate::executor::dispatch::TaskDispatcher;
use crate::host::Host;
use crate::options::RunOptions;
use crate::report::RunReport;
use crate::task::Task;

/// Runs an ordered task list across a host set, one task at a time.
///
/// The defining property over plain fan-out is the barrier: task `i + 1`
/// does not begin until every in-scope host has finished task `i` (success,
/// failure, or unreachable). Tag filters drop tasks from scope entirely;
/// filtered tasks produce no results.
///
/// Unreachable-host policy: a host that becomes unreachable on task N is
/// removed from scope for the remaining tasks and reported as unreachable.
/// Hosts whose actions merely fail stay in scope.
pub struct PlaybookRunner {
    dispatcher: TaskDispatcher,
}

impl PlaybookRunner {
    /// Create a runner over the given connection.
    pub fn new(options: RunOptions, connection: Arc<dyn Connection>) -> Self {
        Self {
            dispatcher: TaskDispatcher::new(options, connection),
        }
    }

    /// Use an externally-owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.dispatcher = self.dispatcher.with_cancellation(cancel);
        self
    }

    /// Attach an event sink for task and per-host notifications.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.dispatcher = self.dispatcher.with_event_sink(events);
        self
    }

    /// A clone of the run-scoped cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.dispatcher.cancellation_token()
    }

    /// The options this runner runs with.
    pub fn options(&self) -> &RunOptions {
        self.dispatcher.options()
    }

    /// Run the ordered task list across the host set.
    ///
    /// Returns the aggregate report once the last task completes or the run
    /// is cancelled. On cancellation the report covers completed tasks only;
    /// hosts and tasks never dispatched are absent from the outcome sets.
    #[instrument(skip(self, hosts, tasks), fields(hosts = hosts.len(), tasks = tasks.len()))]
    pub async fn run(&self, hosts: &[Host], tasks: &[Task]) -> Result<RunReport> {
        let options = self.dispatcher.options();
        options.validate()?;
        TaskDispatcher::validate_hosts(hosts)?;
        for task in tasks {
            task.action.validate()?;
        }

        self.dispatcher.events().on_run_start("playbook", hosts.len());

        let mut aggregate = RunReport::new();
        let mut in_scope: Vec<Host> = hosts.to_vec();

        for (index, task) in tasks.iter().enumerate() {
            if !task.selected(&options.tags, &options.skip_tags) {
                debug!(task = %task.name, "task filtered by tags");
                continue;
            }
            if self.dispatcher.is_cancelled() {
                info!(task = %task.name, index, "run cancelled, stopping before task");
                break;
            }
            if in_scope.is_empty() {
                warn!("no hosts remaining in scope");
                break;
            }

            self.dispatcher.events().on_task_start(task);
            debug!(task = %task.name, hosts = in_scope.len(), "dispatching task");

            // Barrier: dispatch returns only once every in-scope host has a
            // terminal result for this task.
            let report = self.dispatcher.dispatch(&in_scope, &task.action).await;

            if !report.unreachable.is_empty() {
                in_scope.retain(|host| !report.unreachable.contains(host.name.as_str()));
            }
            if let Some(register) = &task.register {
                aggregate.register(register, &report);
            }
            aggregate.merge(report);
        }

        info!(summary = %aggregate.summary(), "playbook finished");
        Ok(aggregate)
    }
}
