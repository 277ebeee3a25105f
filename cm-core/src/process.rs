//! External commands: `make` targets and `docker` / `docker compose` calls.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ProcessError;
use crate::settings::Settings;

/// A command line to spawn with the operator's terminal attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build from a `[program, args...]` list
    pub fn from_argv(argv: &[String]) -> Result<Self, ProcessError> {
        let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;
        Ok(Self::new(program.clone()).args(args.iter().cloned()))
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a spawned command ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns commands and waits for them to finish.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &ProcessSpec) -> Result<ExitOutcome, ProcessError>;
}

/// Builds every command cm issues, from the settings of one invocation.
#[derive(Clone, Debug)]
pub struct CommandSet {
    start: Vec<String>,
    stop: Vec<String>,
    shell: String,
    env_file: Option<PathBuf>,
}

impl CommandSet {
    /// `env_file` is only passed along when it exists on disk.
    pub fn new(settings: &Settings, env_file: Option<PathBuf>) -> Self {
        Self {
            start: settings.start_command.clone(),
            stop: settings.stop_command.clone(),
            shell: settings.shell.clone(),
            env_file,
        }
    }

    pub fn bulk_start(&self) -> Result<ProcessSpec, ProcessError> {
        ProcessSpec::from_argv(&self.start)
    }

    pub fn bulk_stop(&self) -> Result<ProcessSpec, ProcessError> {
        ProcessSpec::from_argv(&self.stop)
    }

    pub fn relaunch(&self, service_id: &str) -> ProcessSpec {
        self.compose()
            .args(["up", "-d"])
            .arg(service_id)
    }

    pub fn exec_shell(&self, container_id: &str) -> ProcessSpec {
        ProcessSpec::new("docker")
            .args(["exec", "-ti"])
            .arg(container_id)
            .arg(self.shell.clone())
    }

    pub fn run_shell(&self, service_id: &str) -> ProcessSpec {
        self.compose()
            .args(["run", "--rm", "-ti"])
            .arg(service_id)
            .arg(self.shell.clone())
    }

    fn compose(&self) -> ProcessSpec {
        let spec = ProcessSpec::new("docker").arg("compose");
        match &self.env_file {
            Some(path) => spec.arg(format!("--env-file={}", path.display())),
            None => spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_commands() {
        let commands = CommandSet::new(&Settings::default(), None);
        assert_eq!(commands.bulk_start().unwrap().to_string(), "make docker-run");
        assert_eq!(commands.bulk_stop().unwrap().to_string(), "make docker-stop");
        assert_eq!(commands.relaunch("api").to_string(), "docker compose up -d api");
        assert_eq!(
            commands.exec_shell("abc123").to_string(),
            "docker exec -ti abc123 sh"
        );
        assert_eq!(
            commands.run_shell("api").to_string(),
            "docker compose run --rm -ti api sh"
        );
    }

    #[test]
    fn test_env_file_is_passed_to_compose_only() {
        let commands = CommandSet::new(
            &Settings::default(),
            Some(PathBuf::from("docker-compose.env")),
        );
        assert_eq!(
            commands.run_shell("api").args[..2],
            ["compose".to_string(), "--env-file=docker-compose.env".to_string()]
        );
        assert!(!commands.exec_shell("abc").to_string().contains("--env-file"));
    }

    #[test]
    fn test_empty_bulk_command() {
        let settings = Settings {
            start_command: vec![],
            ..Settings::default()
        };
        let commands = CommandSet::new(&settings, None);
        assert!(matches!(commands.bulk_start(), Err(ProcessError::EmptyCommand)));
    }
}
