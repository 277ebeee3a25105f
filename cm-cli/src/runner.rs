use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use cm_core::error::ProcessError;
use cm_core::process::{ExitOutcome, ProcessRunner, ProcessSpec};

/// Runs external commands in the foreground, attached to the terminal.
pub struct CommandRunner {
    cwd: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self { cwd: None }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ExitOutcome, ProcessError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        // interactive shells need the operator's terminal
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd.status().await.map_err(|source| ProcessError::Spawn {
            command: spec.to_string(),
            source,
        })?;

        debug!(command = %spec, code = ?status.code(), "command finished");
        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}
