//! Error types for cm operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading compose files or tool settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid service definition '{service}': {source}")]
    InvalidService {
        service: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors reported by a container runtime.
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("failed to connect to Docker: {0}")]
    Connect(String),

    #[error("Docker request failed: {0}")]
    Request(String),

    #[error("log stream failed: {0}")]
    Stream(String),
}

/// Errors raised while spawning an external command.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top level taxonomy surfaced to the operator.
#[derive(Error, Debug)]
pub enum CmError {
    #[error("No docker-compose.yml found in {}", .0.display())]
    NoConfiguration(PathBuf),

    #[error("No corresponding service for '{0}'")]
    NoCorrespondingService(String),

    #[error("No matching containers found for '{0}'")]
    NoMatchingContainers(String),

    #[error("No matching container found for '{0}'")]
    NoMatchingContainer(String),

    #[error("'{command}' exited with status {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into()))]
    CommandFailed { command: String, code: Option<i32> },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CmError {
    /// Exit code the CLI should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T, E = CmError> = std::result::Result<T, E>;
