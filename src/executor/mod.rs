//! Execution engine.
//!
//! Two entry points share the same machinery:
//!
//! - [`TaskDispatcher`]: fan one action out across a host set with a bounded
//!   worker pool (ad-hoc mode);
//! - [`PlaybookRunner`]: sequence an ordered task list with a barrier between
//!   tasks (batch-synchronous mode).
//!
//! Workers post each [`HostResult`](crate::result::HostResult) over a
//! channel; the dispatch loop drains it into a [`collector::ResultCollector`]
//! and returns the aggregated [`RunReport`](crate::report::RunReport) once
//! every host has finished.

pub mod collector;
pub mod dispatch;
pub mod playbook;

pub use collector::ResultCollector;
pub use dispatch::TaskDispatcher;
pub use playbook::PlaybookRunner;
