//! Actions, tasks, and tag selection.
//!
//! An [`Action`] is one module invocation: a module name plus an ordered
//! argument mapping and an optional privilege escalation request. A [`Task`]
//! wraps an action with playbook metadata (display name, register name,
//! tags). A playbook is simply an ordered slice of tasks; the full
//! declarative playbook language (conditionals, loops, templating, handlers)
//! is out of scope.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A module invocation to run on a host.
///
/// Immutable once built; construct with [`Action::new`] and the `with_*`
/// builder methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Module name, e.g. `ping` or `shell`.
    pub module: String,
    /// Ordered mapping of argument names to values.
    #[serde(default)]
    pub args: IndexMap<String, Value>,
    /// Request privilege escalation for this action.
    #[serde(default)]
    pub r#become: bool,
    /// Escalation method override (`sudo`, `su`, `doas`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub become_method: Option<String>,
    /// User to escalate to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub become_user: Option<String>,
}

impl Action {
    /// Create an action invoking the given module with no arguments.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            args: IndexMap::new(),
            r#become: false,
            become_method: None,
            become_user: None,
        }
    }

    /// Add a module argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Request privilege escalation, optionally to a specific user.
    pub fn with_become(mut self, user: Option<String>) -> Self {
        self.r#become = true;
        self.become_user = user;
        self
    }

    /// Set the escalation method.
    pub fn with_become_method(mut self, method: impl Into<String>) -> Self {
        self.become_method = Some(method.into());
        self
    }

    /// Fetch a string argument, if present and a string.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.module.trim().is_empty() {
            return Err(Error::EmptyModuleName);
        }
        Ok(())
    }
}

/// An [`Action`] plus playbook metadata.
#[derive(Debug, Clone)]
pub struct Task {
    /// Stable identifier for event correlation.
    pub id: Uuid,
    /// Display name; defaults to the module name.
    pub name: String,
    /// The action to dispatch.
    pub action: Action,
    /// When set, per-host payloads of this task are stored in the report's
    /// register map under this name.
    pub register: Option<String>,
    /// Tags used by inclusion/exclusion filters.
    pub tags: Vec<String>,
}

impl Task {
    /// Create a named task.
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            action,
            register: None,
            tags: Vec::new(),
        }
    }

    /// Create a task named after its module.
    pub fn from_action(action: Action) -> Self {
        let name = action.module.clone();
        Self::new(name, action)
    }

    /// Record this task's per-host payloads under the given register name.
    pub fn with_register(mut self, name: impl Into<String>) -> Self {
        self.register = Some(name.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replace the tag set.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Whether this task is in scope under the given filters.
    ///
    /// A task is excluded when it carries any tag in `skip_tags`. When `tags`
    /// is non-empty it acts as an inclusion filter: the task must carry at
    /// least one of those tags. Untagged tasks survive an empty inclusion
    /// filter only.
    pub fn selected(&self, tags: &[String], skip_tags: &[String]) -> bool {
        if self.tags.iter().any(|t| skip_tags.contains(t)) {
            return false;
        }
        if tags.is_empty() {
            return true;
        }
        self.tags.iter().any(|t| tags.contains(t))
    }
}
