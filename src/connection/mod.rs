//! Connection layer: executing one action on one host.
//!
//! The [`Connection`] trait abstracts the transport so the dispatcher does
//! not care whether an action runs locally or over a remote protocol. The
//! crate ships a [`LocalConnection`] for development and tests; remote
//! transports (SSH and friends) are supplied by the caller as trait
//! implementations.
//!
//! A connection executes exactly one action per call and reports either an
//! [`ActionOutput`] (the action ran, successfully or not) or a
//! [`ConnectionError`] (the host could not be reached). Retry policy lives
//! with the caller, never at this layer.

/// Local execution connection implementation.
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::Error;
use crate::host::{ConnectionKind, Host};
use crate::options::RunOptions;
use crate::result::Payload;
use crate::task::Action;

pub use local::LocalConnection;

/// Errors raised when a host cannot be reached or an action cannot be
/// delivered. These classify as `Unreachable`; they never abort a run.
///
/// Variants carry host identifiers and operational context only. Credential
/// material must never appear in these messages.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection to the host.
    #[error("failed to connect to '{host}': {message}")]
    ConnectFailed {
        /// Target host identifier.
        host: String,
        /// Transport-level detail.
        message: String,
    },

    /// The action did not complete within the per-host timeout.
    #[error("action timed out on '{host}' after {timeout_secs} seconds")]
    Timeout {
        /// Target host identifier.
        host: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },

    /// The transport does not support the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// I/O error while delivering the action.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for connection operations.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Execution context resolved from run options, the host, and the action.
///
/// Carries everything a transport needs beyond the action itself: check/diff
/// flags and the resolved privilege escalation request.
#[derive(Debug, Clone, Default)]
pub struct ExecuteContext {
    /// Report what would change without changing it.
    pub check_mode: bool,
    /// Include diffs in payloads where the module produces them.
    pub diff_mode: bool,
    /// Whether to escalate privileges for this action.
    pub escalate: bool,
    /// Escalation method (`sudo`, `su`, `doas`).
    pub escalate_method: String,
    /// User to escalate to.
    pub escalate_user: String,
}

impl ExecuteContext {
    /// Resolve the context for one action on one host.
    ///
    /// Escalation is requested when the action asks for it, or the host
    /// overrides the default, or the run-level default is on. Action-level
    /// method/user win over the run-level defaults.
    pub fn resolve(action: &Action, host: &Host, options: &RunOptions) -> Self {
        let escalate = action.r#become || host.r#become.unwrap_or(options.r#become);
        Self {
            check_mode: options.check_mode,
            diff_mode: options.diff_mode,
            escalate,
            escalate_method: action
                .become_method
                .clone()
                .unwrap_or_else(|| options.become_method.clone()),
            escalate_user: action
                .become_user
                .clone()
                .unwrap_or_else(|| options.become_user.clone()),
        }
    }
}

/// What an action produced when it actually executed.
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    /// The action reported failure (non-zero exit, explicit failure key).
    pub failed: bool,
    /// The action changed something on the host.
    pub changed: bool,
    /// Raw structured payload.
    pub payload: Payload,
}

impl ActionOutput {
    /// A successful output with the given payload.
    pub fn ok(payload: Payload) -> Self {
        Self {
            failed: false,
            changed: false,
            payload,
        }
    }

    /// A failed output with the given payload.
    pub fn failure(payload: Payload) -> Self {
        Self {
            failed: true,
            changed: false,
            payload,
        }
    }

    /// Mark the output as having changed the host.
    pub fn with_changed(mut self) -> Self {
        self.changed = true;
        self
    }
}

/// Transport abstraction: execute one action on one host.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Short transport name, for logging.
    fn name(&self) -> &str;

    /// Execute `action` on `host`.
    ///
    /// `Err` means the host could not be reached or the action could not be
    /// delivered; an action that ran and failed is an `Ok` output with
    /// `failed` set.
    async fn execute(
        &self,
        host: &Host,
        action: &Action,
        ctx: &ExecuteContext,
    ) -> ConnectionResult<ActionOutput>;
}

/// Build the built-in connection for a connection kind.
///
/// `Local` and `Smart` resolve to the local transport. `Ssh` has no built-in
/// implementation (transports are supplied by the caller) and is rejected as
/// a configuration error.
pub fn for_kind(kind: ConnectionKind, options: &RunOptions) -> crate::Result<Arc<dyn Connection>> {
    match kind {
        ConnectionKind::Local | ConnectionKind::Smart => Ok(Arc::new(
            LocalConnection::with_module_paths(options.module_paths.clone()),
        )),
        ConnectionKind::Ssh => Err(Error::UnsupportedConnection(kind)),
    }
}
