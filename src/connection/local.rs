//! Local connection: execute actions on the control node.
//!
//! This is the built-in transport used for development and tests. It
//! understands a small set of built-in modules (`ping`, `command`, `shell`,
//! `raw`) and falls back to executables resolved under the configured module
//! search paths. Everything runs as a child process on the current machine;
//! the host's user/port parameters are ignored.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::{debug, trace};

use super::{ActionOutput, Connection, ConnectionResult, ExecuteContext};
use crate::host::Host;
use crate::result::Payload;
use crate::task::Action;

/// Connection executing actions on the current host.
#[derive(Debug, Clone, Default)]
pub struct LocalConnection {
    module_paths: Vec<PathBuf>,
}

impl LocalConnection {
    /// Create a local connection with no module search paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a local connection resolving non-builtin modules under the
    /// given directories.
    pub fn with_module_paths(module_paths: Vec<PathBuf>) -> Self {
        Self { module_paths }
    }

    /// Build the shell command, applying privilege escalation when asked.
    fn build_command(&self, command: &str, ctx: &ExecuteContext) -> Command {
        let mut cmd = if ctx.escalate {
            match ctx.escalate_method.as_str() {
                "su" => {
                    let mut c = Command::new("su");
                    c.arg("-").arg(&ctx.escalate_user).arg("-c").arg(command);
                    c
                }
                "doas" => {
                    let mut c = Command::new("doas");
                    c.arg("-u")
                        .arg(&ctx.escalate_user)
                        .arg("sh")
                        .arg("-c")
                        .arg(command);
                    c
                }
                _ => {
                    let mut c = Command::new("sudo");
                    c.arg("-n")
                        .arg("-u")
                        .arg(&ctx.escalate_user)
                        .arg("--")
                        .arg("sh")
                        .arg("-c")
                        .arg(command);
                    c
                }
            }
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Rendered argv of the command that would run, for inspection in tests.
    #[cfg(test)]
    fn rendered_command(&self, command: &str, ctx: &ExecuteContext) -> Vec<String> {
        let cmd = self.build_command(command, ctx);
        let std_cmd = cmd.as_std();
        let mut argv = vec![std_cmd.get_program().to_string_lossy().into_owned()];
        argv.extend(
            std_cmd
                .get_args()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        argv
    }

    async fn run_shell(&self, command: &str, ctx: &ExecuteContext) -> ConnectionResult<ActionOutput> {
        if ctx.check_mode {
            let mut payload = Payload::new();
            payload.insert("cmd".into(), json!(command));
            payload.insert("check_mode".into(), json!(true));
            payload.insert("msg".into(), json!("skipped, running in check mode"));
            return Ok(ActionOutput::ok(payload));
        }

        trace!(command, "spawning local command");
        let output = self.build_command(command, ctx).output().await?;
        let rc = output.status.code().unwrap_or(-1);

        let mut payload = Payload::new();
        payload.insert("cmd".into(), json!(command));
        payload.insert("rc".into(), json!(rc));
        payload.insert(
            "stdout".into(),
            json!(String::from_utf8_lossy(&output.stdout).trim_end().to_string()),
        );
        payload.insert(
            "stderr".into(),
            json!(String::from_utf8_lossy(&output.stderr).trim_end().to_string()),
        );

        if rc == 0 {
            Ok(ActionOutput::ok(payload).with_changed())
        } else {
            payload.insert("msg".into(), json!("non-zero return code"));
            Ok(ActionOutput::failure(payload))
        }
    }

    fn ping(&self, action: &Action) -> ActionOutput {
        let data = action.str_arg("data").unwrap_or("pong");
        let mut payload = Payload::new();
        if data == "crash" {
            payload.insert("msg".into(), json!("boom"));
            return ActionOutput::failure(payload);
        }
        payload.insert("ping".into(), json!(data));
        ActionOutput::ok(payload)
    }

    fn find_module(&self, name: &str) -> Option<PathBuf> {
        self.module_paths
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    async fn run_module(
        &self,
        path: &Path,
        action: &Action,
        ctx: &ExecuteContext,
    ) -> ConnectionResult<ActionOutput> {
        if ctx.check_mode {
            let mut payload = Payload::new();
            payload.insert("module".into(), json!(action.module));
            payload.insert("check_mode".into(), json!(true));
            payload.insert("msg".into(), json!("skipped, running in check mode"));
            return Ok(ActionOutput::ok(payload));
        }

        let args_json = serde_json::to_string(&action.args).unwrap_or_else(|_| "{}".to_string());
        let mut cmd = if ctx.escalate {
            let mut c = Command::new("sudo");
            c.arg("-n")
                .arg("-u")
                .arg(&ctx.escalate_user)
                .arg("--")
                .arg(path)
                .arg(&args_json);
            c
        } else {
            let mut c = Command::new(path);
            c.arg(&args_json);
            c
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().await?;
        let rc = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);

        // Modules speak JSON on stdout; anything else is wrapped verbatim.
        let mut payload = match serde_json::from_str::<Value>(stdout.trim()) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut payload = Payload::new();
                payload.insert("stdout".into(), json!(stdout.trim_end()));
                payload
            }
        };
        payload.insert("rc".into(), json!(rc));

        let failed = rc != 0
            || payload
                .get("failed")
                .and_then(Value::as_bool)
                .unwrap_or(false);
        let changed = payload
            .get("changed")
            .and_then(Value::as_bool)
            .unwrap_or(rc == 0 && !failed);

        let mut out = if failed {
            ActionOutput::failure(payload)
        } else {
            ActionOutput::ok(payload)
        };
        out.changed = changed && !failed;
        Ok(out)
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[async_trait]
impl Connection for LocalConnection {
    fn name(&self) -> &str {
        "local"
    }

    async fn execute(
        &self,
        host: &Host,
        action: &Action,
        ctx: &ExecuteContext,
    ) -> ConnectionResult<ActionOutput> {
        debug!(host = %host.name, module = %action.module, "executing local action");
        match action.module.as_str() {
            "ping" => Ok(self.ping(action)),
            "command" | "shell" | "raw" => {
                let command = action
                    .str_arg("cmd")
                    .or_else(|| action.str_arg("_raw_params"));
                match command {
                    Some(command) => self.run_shell(command, ctx).await,
                    None => {
                        let mut payload = Payload::new();
                        payload.insert(
                            "msg".into(),
                            json!(format!("module '{}' requires a 'cmd' argument", action.module)),
                        );
                        Ok(ActionOutput::failure(payload))
                    }
                }
            }
            other => match self.find_module(other) {
                Some(path) => self.run_module(&path, action, ctx).await,
                None => {
                    let mut payload = Payload::new();
                    payload.insert("msg".into(), json!(format!("module '{}' not found", other)));
                    Ok(ActionOutput::failure(payload))
                }
            },
        }
    }
}
