//! Error types for Fleetrun.
//!
//! Configuration-time errors are fatal and raised to the caller before any
//! dispatch begins. Per-host failures are never surfaced through this type:
//! they are recorded in the [`RunReport`](crate::report::RunReport) as
//! `Failed` or `Unreachable` outcomes and do not abort a run.

use thiserror::Error;

use crate::host::ConnectionKind;

/// Result type alias for Fleetrun operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Fleetrun.
///
/// Every variant is a configuration error: something the caller got wrong
/// before the run started. When one of these is returned, no partial
/// [`RunReport`](crate::report::RunReport) exists.
#[derive(Error, Debug)]
pub enum Error {
    /// The host set passed to a run was empty.
    #[error("host set must not be empty")]
    EmptyHostSet,

    /// The same host identifier appeared more than once in the host set.
    #[error("duplicate host '{0}' in host set")]
    DuplicateHost(String),

    /// `forks` must be at least 1.
    #[error("invalid forks value {0}: must be at least 1")]
    InvalidForks(usize),

    /// An action was built without a module name.
    #[error("action module name must not be empty")]
    EmptyModuleName,

    /// The requested connection kind has no built-in transport.
    #[error("connection kind '{0}' has no built-in transport; supply a Connection implementation")]
    UnsupportedConnection(ConnectionKind),

    /// A connection kind string did not match any known kind.
    #[error("unknown connection kind '{0}'")]
    UnknownConnectionKind(String),
}
