//! Tool settings (`cm.yml`), all optional with defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const SETTINGS_ENV: &str = "CM_CONFIG";
const SETTINGS_NAMES: [&str; 4] = ["cm.yml", "cm.yaml", ".cm.yml", ".cm.yaml"];

/// How a service id is matched against container names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The id must sit between name separators (`-`, `_`, `.`) or the ends
    /// of the name.
    #[default]
    Segment,
    /// The id is a raw regex searched anywhere in the name.
    Contains,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base compose file, relative to the working directory
    pub compose_file: PathBuf,
    /// Development override compose file
    pub compose_override: PathBuf,
    /// Env file passed to `docker compose` when it exists
    pub env_file: PathBuf,
    /// Container names containing this are flagged in status output
    pub highlight_marker: Option<String>,
    /// Regexes for one-shot commands left out of the icon summary
    pub ignored_commands: Vec<String>,
    pub match_mode: MatchMode,
    /// Bulk relaunch
    pub start_command: Vec<String>,
    /// Bulk stop
    pub stop_command: Vec<String>,
    pub shell: String,
    /// Directory searched by `goto`
    pub projects_root: PathBuf,
    /// Name separator normalized before diffing container names
    pub label_separator: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from("docker-compose.yml"),
            compose_override: PathBuf::from("docker-compose.dev.yml"),
            env_file: PathBuf::from("docker-compose.env"),
            highlight_marker: None,
            ignored_commands: vec!["install".into(), "setup".into()],
            match_mode: MatchMode::Segment,
            start_command: vec!["make".into(), "docker-run".into()],
            stop_command: vec!["make".into(), "docker-stop".into()],
            shell: "sh".into(),
            projects_root: PathBuf::from("/var/www"),
            label_separator: '-',
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // an empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Resolve settings: explicit path, then `$CM_CONFIG`, then the first
    /// settings file in `start_dir` or its parents. Defaults if none exist.
    pub fn discover(explicit: Option<&Path>, start_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(SETTINGS_ENV) {
            let path = PathBuf::from(env_path);
            if path.exists() {
                return Self::load(&path);
            }
            debug!(path = %path.display(), "{} points to a missing file", SETTINGS_ENV);
        }

        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in SETTINGS_NAMES {
                let path = current.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
            dir = current.parent();
        }

        debug!("no settings file found, using defaults");
        Ok(Self::default())
    }

    /// The env file path, if it exists relative to `dir`.
    pub fn existing_env_file(&self, dir: &Path) -> Option<PathBuf> {
        let path = dir.join(&self.env_file);
        path.exists().then(|| self.env_file.clone())
    }
}
