//! Run configuration.
//!
//! [`RunOptions`] is an immutable value constructed once per run invocation
//! and passed explicitly to the dispatcher or runner. There is no
//! process-wide mutable configuration: changing forks, tags, or become
//! settings means building a new options value for the next run.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::host::ConnectionKind;

/// Default maximum number of concurrent in-flight host executions.
pub const DEFAULT_FORKS: usize = 5;

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Connection mode used by [`connection::for_kind`](crate::connection::for_kind).
    pub connection: ConnectionKind,
    /// Directories searched for non-builtin modules by the local transport.
    pub module_paths: Vec<PathBuf>,
    /// Maximum concurrent in-flight host executions per dispatch.
    pub forks: usize,
    /// Run-level privilege escalation default.
    pub r#become: bool,
    /// Escalation method default.
    pub become_method: String,
    /// Escalation user default.
    pub become_user: String,
    /// Check mode: report what would change without changing it.
    pub check_mode: bool,
    /// Diff mode: include diffs in payloads where modules produce them.
    pub diff_mode: bool,
    /// Inclusion tag filter. Empty means all tasks are in scope.
    pub tags: Vec<String>,
    /// Exclusion tag filter.
    pub skip_tags: Vec<String>,
    /// Per-host-action timeout. `None` disables the timeout.
    pub task_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            connection: ConnectionKind::Smart,
            module_paths: Vec::new(),
            forks: DEFAULT_FORKS,
            r#become: false,
            become_method: "sudo".to_string(),
            become_user: "root".to_string(),
            check_mode: false,
            diff_mode: false,
            tags: Vec::new(),
            skip_tags: Vec::new(),
            task_timeout: None,
        }
    }
}

impl RunOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection mode.
    pub fn with_connection(mut self, kind: ConnectionKind) -> Self {
        self.connection = kind;
        self
    }

    /// Add a module search path.
    pub fn with_module_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_paths.push(path.into());
        self
    }

    /// Set the concurrency limit.
    pub fn with_forks(mut self, forks: usize) -> Self {
        self.forks = forks;
        self
    }

    /// Enable privilege escalation by default, optionally to a given user.
    pub fn with_become(mut self, user: Option<String>) -> Self {
        self.r#become = true;
        if let Some(user) = user {
            self.become_user = user;
        }
        self
    }

    /// Set the escalation method default.
    pub fn with_become_method(mut self, method: impl Into<String>) -> Self {
        self.become_method = method.into();
        self
    }

    /// Enable check mode.
    pub fn with_check_mode(mut self) -> Self {
        self.check_mode = true;
        self
    }

    /// Enable diff mode.
    pub fn with_diff_mode(mut self) -> Self {
        self.diff_mode = true;
        self
    }

    /// Set the inclusion tag filter.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the exclusion tag filter.
    pub fn with_skip_tags(mut self, skip_tags: Vec<String>) -> Self {
        self.skip_tags = skip_tags;
        self
    }

    /// Set the per-host-action timeout.
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.forks == 0 {
            return Err(Error::InvalidForks(self.forks));
        }
        Ok(())
    }
}
