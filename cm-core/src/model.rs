use std::fmt;

use serde::{Deserialize, Serialize};

pub type ServiceId = String;
pub type ContainerId = String;

/// Command of a declared service, in either of the two compose spellings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceCommand {
    Shell(String),
    Exec(Vec<String>),
}

impl ServiceCommand {
    /// Single-line form used for display and denylist matching.
    pub fn as_line(&self) -> String {
        match self {
            Self::Shell(line) => line.clone(),
            Self::Exec(parts) => parts.join(" "),
        }
    }
}

impl fmt::Display for ServiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_line())
    }
}

/// A service as declared in the merged compose files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub id: ServiceId,
    pub image: Option<String>,
    pub command: Option<ServiceCommand>,
}

impl ServiceDefinition {
    pub fn new(id: impl Into<ServiceId>) -> Self {
        Self {
            id: id.into(),
            image: None,
            command: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_command(mut self, command: ServiceCommand) -> Self {
        self.command = Some(command);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited,
    Other(String),
}

impl ContainerState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => Self::Running,
            "exited" => Self::Exited,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Exited => write!(f, "exited"),
            Self::Other(state) => write!(f, "{}", state),
        }
    }
}

/// A live container as reported by the runtime at the start of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub name: String,
    pub state: ContainerState,
    pub image: String,
}

impl ContainerRecord {
    /// Builds a record from the runtime's raw name, dropping the leading `/`.
    pub fn new(
        id: impl Into<ContainerId>,
        raw_name: &str,
        state: ContainerState,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: raw_name.strip_prefix('/').unwrap_or(raw_name).to_string(),
            state,
            image: image.into(),
        }
    }

    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(12) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_strips_leading_slash() {
        let record = ContainerRecord::new("abc", "/shop_web_1", ContainerState::Running, "nginx");
        assert_eq!(record.name, "shop_web_1");

        let bare = ContainerRecord::new("abc", "shop_web_1", ContainerState::Running, "nginx");
        assert_eq!(bare.name, "shop_web_1");
    }

    #[test]
    fn test_short_id() {
        let record = ContainerRecord::new(
            "0123456789abcdef",
            "/web",
            ContainerState::Exited,
            "nginx",
        );
        assert_eq!(record.short_id(), "0123456789ab");

        let short = ContainerRecord::new("0123", "/web", ContainerState::Exited, "nginx");
        assert_eq!(short.short_id(), "0123");
    }

    #[test]
    fn test_state_parse() {
        assert_eq!(ContainerState::parse("running"), ContainerState::Running);
        assert_eq!(ContainerState::parse("exited"), ContainerState::Exited);
        assert_eq!(
            ContainerState::parse("paused"),
            ContainerState::Other("paused".into())
        );
        assert_eq!(ContainerState::parse("paused").to_string(), "paused");
    }

    #[test]
    fn test_command_as_line() {
        let exec = ServiceCommand::Exec(vec!["npm".into(), "install".into()]);
        assert_eq!(exec.as_line(), "npm install");
        let shell = ServiceCommand::Shell("composer install".into());
        assert_eq!(shell.to_string(), "composer install");
    }
}
