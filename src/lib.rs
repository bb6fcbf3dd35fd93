//! # Fleetrun - A Remote Task Execution Orchestrator
//!
//! Fleetrun is the execution core of an automation tool: it fans module
//! invocations out across a host set with bounded concurrency, tracks
//! per-host outcomes, and supports two execution modes: a single ad-hoc
//! action, or an ordered multi-task playbook with batch-synchronous
//! sequencing.
//!
//! ## Core Concepts
//!
//! - **Hosts**: execution targets with per-host connection parameters
//! - **Actions**: one module invocation with an ordered argument mapping
//! - **Tasks**: actions plus playbook metadata (tags, register names)
//! - **Connections**: transport layer executing one action on one host
//! - **Forks**: the maximum number of concurrent in-flight host executions
//! - **Reports**: per-run aggregation of host outcomes (`ok`, `failed`,
//!   `unreachable`) plus the ordered raw result sequence
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Caller                            │
//! │        (builds RunOptions, hosts, actions/tasks)         │
//! └──────────────────────────────────────────────────────────┘
//!                │                            │
//!                ▼                            ▼
//! ┌───────────────────────────┐ ┌───────────────────────────┐
//! │       TaskDispatcher      │ │       PlaybookRunner      │
//! │  (ad-hoc fan-out, forks)  │ │ (barrier-sequenced tasks) │
//! └───────────────────────────┘ └───────────────────────────┘
//!                │                            │
//!                └─────────────┬──────────────┘
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Connection (trait)                      │
//! │       (local built-in; remote supplied by caller)        │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │          ResultCollector  →  RunReport                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use fleetrun::connection::LocalConnection;
//! use fleetrun::{Action, Host, RunOptions, TaskDispatcher};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> fleetrun::Result<()> {
//! let options = RunOptions::new().with_forks(2);
//! let hosts = vec![Host::new("h1"), Host::new("h2")];
//!
//! let dispatcher = TaskDispatcher::new(options, Arc::new(LocalConnection::new()));
//! let report = dispatcher.run(&hosts, &Action::new("ping")).await?;
//!
//! assert_eq!(report.ok.len(), 2);
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! Scheduling, retry policy, playbook-language features (conditionals,
//! loops, templating), and transport protocols are intentionally out of
//! scope; see individual module docs for the exact contracts.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod connection;
pub mod error;
pub mod events;
pub mod executor;
pub mod host;
pub mod options;
pub mod report;
pub mod result;
pub mod secret;
pub mod task;

pub use error::{Error, Result};
pub use executor::{PlaybookRunner, ResultCollector, TaskDispatcher};
pub use host::{ConnectionKind, Host};
pub use options::{RunOptions, DEFAULT_FORKS};
pub use report::RunReport;
pub use result::{HostResult, Outcome, Payload};
pub use secret::Secret;
pub use task::{Action, Task};

/// Convenient re-exports of commonly used types and traits.
pub mod prelude {
    pub use crate::connection::{
        ActionOutput, Connection, ConnectionError, ConnectionResult, ExecuteContext,
        LocalConnection,
    };
    pub use crate::error::{Error, Result};
    pub use crate::events::{ChannelSink, EventSink, NoopSink};
    pub use crate::executor::{PlaybookRunner, ResultCollector, TaskDispatcher};
    pub use crate::host::{ConnectionKind, Host};
    pub use crate::options::RunOptions;
    pub use crate::report::RunReport;
    pub use crate::result::{HostResult, Outcome, Payload};
    pub use crate::secret::Secret;
    pub use crate::task::{Action, Task};
}
