//! Ad-hoc fan-out: one action across a host set.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::connection::{
    ActionOutput, Connection, ConnectionError, ConnectionResult, ExecuteContext,
};
use crate::error::{Error, Result};
use crate::events::{EventSink, NoopSink};
use crate::executor::collector::ResultCollector;
use crate::host::Host;
use crate::options::RunOptions;
use crate::report::RunReport;
use crate::result::{HostResult, Payload};
use crate::task::Action;

/// Fans a single action out across hosts with at most `forks` concurrent
/// in-flight executions.
///
/// The dispatcher waits for all hosts to finish (or fail, or time out)
/// before returning; there is no early exit. Per-host failures are recorded,
/// never propagated. Construction takes the immutable [`RunOptions`] and the
/// supplied [`Connection`]; each `run` call produces a fresh
/// [`RunReport`].
pub struct TaskDispatcher {
    options: RunOptions,
    connection: Arc<dyn Connection>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    events: Arc<dyn EventSink>,
}

impl TaskDispatcher {
    /// Create a dispatcher over the given connection.
    pub fn new(options: RunOptions, connection: Arc<dyn Connection>) -> Self {
        let forks = options.forks.max(1);
        Self {
            options,
            connection,
            semaphore: Arc::new(Semaphore::new(forks)),
            cancel: CancellationToken::new(),
            events: Arc::new(NoopSink),
        }
    }

    /// Use an externally-owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attach an event sink for per-host completion notifications.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// The options this dispatcher runs with.
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// A clone of the run-scoped cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    pub(crate) fn validate_hosts(hosts: &[Host]) -> Result<()> {
        if hosts.is_empty() {
            return Err(Error::EmptyHostSet);
        }
        let mut seen = HashSet::with_capacity(hosts.len());
        for host in hosts {
            if !seen.insert(host.name.as_str()) {
                return Err(Error::DuplicateHost(host.name.clone()));
            }
        }
        Ok(())
    }

    /// Run `action` on every host.
    ///
    /// Fatal configuration errors (empty or duplicated host set, empty
    /// module name, `forks == 0`) are raised before any dispatch begins.
    /// The report's outcome sets partition the host set, except for hosts
    /// skipped by cancellation, which are absent and must be treated as
    /// unknown.
    #[instrument(skip(self, hosts, action), fields(module = %action.module, hosts = hosts.len()))]
    pub async fn run(&self, hosts: &[Host], action: &Action) -> Result<RunReport> {
        self.options.validate()?;
        action.validate()?;
        Self::validate_hosts(hosts)?;

        self.events.on_run_start(&action.module, hosts.len());
        let report = self.dispatch(hosts, action).await;
        debug!(summary = %report.summary(), "dispatch finished");
        Ok(report)
    }

    /// Fan out without re-validating; used per task by the playbook runner.
    pub(crate) async fn dispatch(&self, hosts: &[Host], action: &Action) -> RunReport {
        let collector = ResultCollector::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<HostResult>();

        let mut workers = Vec::with_capacity(hosts.len());
        for host in hosts {
            let host = host.clone();
            let action = action.clone();
            let ctx = ExecuteContext::resolve(&action, &host, &self.options);
            let connection = Arc::clone(&self.connection);
            let semaphore = Arc::clone(&self.semaphore);
            let cancel = self.cancel.clone();
            let timeout = self.options.task_timeout;
            let tx = tx.clone();

            workers.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    debug!(host = %host.name, "cancelled before start, skipping host");
                    return;
                }

                let execution = connection.execute(&host, &action, &ctx);
                let outcome = match timeout {
                    Some(limit) => match time::timeout(limit, execution).await {
                        Ok(result) => result,
                        Err(_) => Err(ConnectionError::Timeout {
                            host: host.name.clone(),
                            timeout_secs: limit.as_secs(),
                        }),
                    },
                    None => execution.await,
                };

                let _ = tx.send(classify(&host.name, outcome));
            }));
        }
        drop(tx);

        while let Some(result) = rx.recv().await {
            self.events.on_host_result(&result);
            collector.record(result);
        }

        for joined in join_all(workers).await {
            if let Err(err) = joined {
                error!(error = %err, "dispatch worker panicked");
            }
        }

        collector.into_report()
    }
}

/// Map a connection-layer outcome to a terminal [`HostResult`].
fn classify(host: &str, outcome: ConnectionResult<ActionOutput>) -> HostResult {
    match outcome {
        Ok(output) if output.failed => HostResult::failed(host, output.payload),
        Ok(output) => HostResult::ok(host, output.payload),
        Err(err) => {
            let mut payload = Payload::new();
            payload.insert("msg".into(), serde_json::json!(err.to_string()));
            payload.insert("unreachable".into(), serde_json::json!(true));
            HostResult::unreachable(host, payload)
        }
    }
}
