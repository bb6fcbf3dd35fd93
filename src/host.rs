//! Host definitions for Fleetrun.
//!
//! A [`Host`] is an execution target: an identifier plus the per-host
//! connection parameters a transport needs. Hosts are created at run start
//! from the caller-supplied host set and are immutable during a run.
//! Inventory-file parsing is out of scope; callers hand over pre-parsed
//! hosts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::secret::Secret;

/// Connection mode for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// Pick the best available transport (currently local).
    #[default]
    Smart,
    /// Execute on the control node, no network transport.
    Local,
    /// SSH transport. Not built in; callers supply the implementation.
    Ssh,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKind::Smart => write!(f, "smart"),
            ConnectionKind::Local => write!(f, "local"),
            ConnectionKind::Ssh => write!(f, "ssh"),
        }
    }
}

impl FromStr for ConnectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" => Ok(ConnectionKind::Smart),
            "local" => Ok(ConnectionKind::Local),
            "ssh" => Ok(ConnectionKind::Ssh),
            other => Err(Error::UnknownConnectionKind(other.to_string())),
        }
    }
}

/// A single execution target.
///
/// The identifier doubles as the key under which results are reported; it
/// must be unique within one run's host set.
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    /// Host identifier (name or address).
    pub name: String,
    /// Remote user to connect as.
    pub user: Option<String>,
    /// Remote port, when the transport uses one.
    pub port: Option<u16>,
    /// Authentication secret for this host. Never serialized or logged.
    pub password: Option<Secret>,
    /// Per-host privilege escalation override. `None` falls back to the
    /// run-level default.
    pub r#become: Option<bool>,
}

impl Host {
    /// Create a host with the given identifier and no extra parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user: None,
            port: None,
            password: None,
            r#become: None,
        }
    }

    /// Set the remote user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the remote port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Attach an authentication secret.
    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Override the run-level privilege escalation default for this host.
    pub fn with_become(mut self, escalate: bool) -> Self {
        self.r#become = Some(escalate);
        self
    }

    /// The host identifier.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
