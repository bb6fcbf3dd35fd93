//! Shared test utilities for the Fleetrun test suite.
//!
//! Provides a scripted [`MockConnection`] with per-host planned outcomes,
//! injectable delays, a timestamped call log, and an execute hook for
//! driving cancellation from inside a run.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::json;

use fleetrun::connection::{
    ActionOutput, Connection, ConnectionError, ConnectionResult, ExecuteContext,
};
use fleetrun::{Action, Host, Payload};

/// Outcome a mock host is scripted to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planned {
    Ok,
    Failed,
    Unreachable,
}

/// Per-host script: an outcome plus an optional artificial delay.
#[derive(Debug, Clone)]
pub struct HostPlan {
    pub outcome: Planned,
    pub delay: Option<Duration>,
}

impl Default for HostPlan {
    fn default() -> Self {
        Self {
            outcome: Planned::Ok,
            delay: None,
        }
    }
}

/// One recorded `execute` invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub host: String,
    pub module: String,
    pub started: Instant,
    pub finished: Instant,
}

type ExecuteHook = Box<dyn Fn(&str, &str) + Send + Sync>;

/// A scripted connection for exercising the dispatcher and runner.
///
/// Hosts without an explicit plan use the default plan (ok, no delay).
/// The execute hook runs at the start of every invocation and receives
/// `(host, module)`; tests use it to cancel runs mid-flight.
#[derive(Default)]
pub struct MockConnection {
    plans: RwLock<HashMap<String, HostPlan>>,
    default_plan: RwLock<HostPlan>,
    calls: Mutex<Vec<Call>>,
    on_execute: RwLock<Option<ExecuteHook>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a host's outcome.
    pub fn plan(&self, host: impl Into<String>, outcome: Planned) {
        self.plans.write().insert(
            host.into(),
            HostPlan {
                outcome,
                delay: None,
            },
        );
    }

    /// Script a host's outcome with an artificial delay before completion.
    pub fn plan_delayed(&self, host: impl Into<String>, outcome: Planned, delay: Duration) {
        self.plans.write().insert(
            host.into(),
            HostPlan {
                outcome,
                delay: Some(delay),
            },
        );
    }

    /// Set the plan used by hosts without an explicit one.
    pub fn set_default_plan(&self, plan: HostPlan) {
        *self.default_plan.write() = plan;
    }

    /// Install a hook invoked at the start of every execute call.
    pub fn on_execute(&self, hook: impl Fn(&str, &str) + Send + Sync + 'static) {
        *self.on_execute.write() = Some(Box::new(hook));
    }

    /// All recorded calls, in completion order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Recorded calls for one module.
    pub fn calls_for_module(&self, module: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.module == module)
            .collect()
    }

    /// Hosts that executed a given module.
    pub fn hosts_for_module(&self, module: &str) -> Vec<String> {
        self.calls_for_module(module)
            .into_iter()
            .map(|call| call.host)
            .collect()
    }

    fn plan_for(&self, host: &str) -> HostPlan {
        self.plans
            .read()
            .get(host)
            .cloned()
            .unwrap_or_else(|| self.default_plan.read().clone())
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(
        &self,
        host: &Host,
        action: &Action,
        _ctx: &ExecuteContext,
    ) -> ConnectionResult<ActionOutput> {
        let started = Instant::now();
        if let Some(hook) = self.on_execute.read().as_ref() {
            hook(&host.name, &action.module);
        }

        let plan = self.plan_for(&host.name);
        if let Some(delay) = plan.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().push(Call {
            host: host.name.clone(),
            module: action.module.clone(),
            started,
            finished: Instant::now(),
        });

        match plan.outcome {
            Planned::Ok => {
                let mut payload = Payload::new();
                payload.insert("module".into(), json!(action.module));
                Ok(ActionOutput::ok(payload))
            }
            Planned::Failed => {
                let mut payload = Payload::new();
                payload.insert("module".into(), json!(action.module));
                payload.insert("msg".into(), json!("scripted failure"));
                Ok(ActionOutput::failure(payload))
            }
            Planned::Unreachable => Err(ConnectionError::ConnectFailed {
                host: host.name.clone(),
                message: "scripted refusal".into(),
            }),
        }
    }
}

/// Build a host list `h0..hN`.
pub fn hosts(count: usize) -> Vec<Host> {
    (0..count).map(|i| Host::new(format!("h{i}"))).collect()
}

/// Install the test tracing subscriber; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
