//! Classification of declared services against their correlated containers.

use regex::Regex;

use crate::config::ServiceRegistry;
use crate::correlate::Correlation;
use crate::error::ConfigError;
use crate::model::{ContainerRecord, ContainerState, ServiceDefinition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    /// At least one matched container is running
    Running,
    /// Matched containers exist but none is running
    OtherState,
    /// Nothing matched, and the definition has an image to deploy
    ExpectedButAbsent,
    /// Nothing matched and no image: a one-shot utility task
    Ignored,
}

pub fn classify(definition: &ServiceDefinition, containers: &[ContainerRecord]) -> ServiceState {
    if containers.iter().any(ContainerRecord::is_running) {
        ServiceState::Running
    } else if !containers.is_empty() {
        ServiceState::OtherState
    } else if definition.image.is_some() {
        ServiceState::ExpectedButAbsent
    } else {
        ServiceState::Ignored
    }
}

/// Compiled `ignored_commands` patterns.
#[derive(Clone, Debug, Default)]
pub struct CommandDenylist {
    patterns: Vec<Regex>,
}

impl CommandDenylist {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| ConfigError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, definition: &ServiceDefinition) -> bool {
        let Some(command) = &definition.command else {
            return false;
        };
        let line = command.as_line();
        self.patterns.iter().any(|p| p.is_match(&line))
    }
}

/// Rules that decorate the status view.
#[derive(Clone, Debug, Default)]
pub struct StatusRules {
    pub highlight_marker: Option<String>,
    pub denylist: CommandDenylist,
}

impl StatusRules {
    pub fn is_highlighted(&self, container_name: &str) -> bool {
        self.highlight_marker
            .as_deref()
            .is_some_and(|marker| !marker.is_empty() && container_name.contains(marker))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowKind {
    Container { id: String },
    /// Placeholder for an expected service with no container
    Absent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusRow {
    pub service_id: String,
    pub name: String,
    /// Container state, `None` for a placeholder row
    pub state: Option<ContainerState>,
    pub image: Option<String>,
    pub kind: RowKind,
    pub highlighted: bool,
}

impl StatusRow {
    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(ContainerState::is_running)
    }
}

/// Per-bucket service counts for the prompt icon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IconSummary {
    pub running: usize,
    pub highlighted: usize,
    /// Other-state and expected-but-absent combined
    pub failing: usize,
}

impl IconSummary {
    pub fn is_empty(&self) -> bool {
        self.running == 0 && self.highlighted == 0 && self.failing == 0
    }
}

#[derive(Clone, Debug)]
pub struct ServiceStatus {
    pub service_id: String,
    pub state: ServiceState,
}

/// Status of every declared service, ready to be rendered.
#[derive(Clone, Debug, Default)]
pub struct StatusReport {
    pub services: Vec<ServiceStatus>,
    pub rows: Vec<StatusRow>,
    pub summary: IconSummary,
}

impl StatusReport {
    pub fn build(registry: &ServiceRegistry, correlation: &Correlation, rules: &StatusRules) -> Self {
        let mut report = Self::default();

        for definition in registry.iter() {
            let containers = correlation.containers_for(&definition.id);
            let state = classify(definition, containers);

            for container in containers {
                report.rows.push(StatusRow {
                    service_id: definition.id.clone(),
                    name: container.name.clone(),
                    state: Some(container.state.clone()),
                    image: Some(container.image.clone()),
                    kind: RowKind::Container {
                        id: container.short_id().to_string(),
                    },
                    highlighted: rules.is_highlighted(&container.name),
                });
            }

            if state == ServiceState::ExpectedButAbsent {
                report.rows.push(StatusRow {
                    service_id: definition.id.clone(),
                    name: definition.id.clone(),
                    state: None,
                    image: definition.image.clone(),
                    kind: RowKind::Absent,
                    highlighted: false,
                });
            }

            if !rules.denylist.is_ignored(definition) {
                let highlighted = containers
                    .iter()
                    .any(|c| c.is_running() && rules.is_highlighted(&c.name));
                match state {
                    ServiceState::Running if highlighted => report.summary.highlighted += 1,
                    ServiceState::Running => report.summary.running += 1,
                    ServiceState::OtherState | ServiceState::ExpectedButAbsent => {
                        report.summary.failing += 1
                    }
                    ServiceState::Ignored => {}
                }
            }

            report.services.push(ServiceStatus {
                service_id: definition.id.clone(),
                state,
            });
        }

        report
    }

    pub fn state_of(&self, service_id: &str) -> Option<ServiceState> {
        self.services
            .iter()
            .find(|s| s.service_id == service_id)
            .map(|s| s.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::correlate;
    use crate::model::ServiceCommand;
    use crate::settings::MatchMode;

    fn container(id: &str, name: &str, state: ContainerState) -> ContainerRecord {
        ContainerRecord::new(id, name, state, "img")
    }

    fn fixture() -> (ServiceRegistry, Vec<ContainerRecord>) {
        let registry: ServiceRegistry = [
            ServiceDefinition::new("web").with_image("nginx"),
            ServiceDefinition::new("worker").with_image("php"),
            ServiceDefinition::new("db").with_image("postgres"),
            ServiceDefinition::new("setup")
                .with_command(ServiceCommand::Shell("composer install".into())),
            ServiceDefinition::new("assets")
                .with_image("node")
                .with_command(ServiceCommand::Exec(vec!["npm".into(), "install".into()])),
            ServiceDefinition::new("admin").with_image("adminer"),
        ]
        .into_iter()
        .collect();
        let containers = vec![
            container("w1", "shop_web_1", ContainerState::Running),
            container("k1", "shop_worker_1", ContainerState::Exited),
            container("a1", "shop_admin_canary_1", ContainerState::Running),
        ];
        (registry, containers)
    }

    #[test]
    fn test_classify() {
        let with_image = ServiceDefinition::new("db").with_image("postgres");
        let without_image = ServiceDefinition::new("setup");
        assert_eq!(classify(&with_image, &[]), ServiceState::ExpectedButAbsent);
        assert_eq!(classify(&without_image, &[]), ServiceState::Ignored);

        let exited = container("1", "x_db_1", ContainerState::Exited);
        let running = container("2", "x_db_2", ContainerState::Running);
        assert_eq!(classify(&with_image, &[exited.clone()]), ServiceState::OtherState);
        assert_eq!(classify(&without_image, &[exited, running]), ServiceState::Running);
    }

    #[test]
    fn test_report_rows() {
        let (registry, containers) = fixture();
        let correlation = correlate(&registry, &containers, MatchMode::Segment);
        let report = StatusReport::build(&registry, &correlation, &StatusRules::default());

        let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
        // one row per container, one placeholder per expected service, none for setup
        assert_eq!(
            names,
            vec!["shop_web_1", "shop_worker_1", "db", "assets", "shop_admin_canary_1"]
        );
        assert_eq!(report.rows[2].kind, RowKind::Absent);
        assert_eq!(report.rows[2].image.as_deref(), Some("postgres"));
        assert_eq!(report.state_of("setup"), Some(ServiceState::Ignored));
        assert_eq!(report.state_of("worker"), Some(ServiceState::OtherState));
    }

    #[test]
    fn test_icon_summary_with_highlight_and_denylist() {
        let (registry, containers) = fixture();
        let correlation = correlate(&registry, &containers, MatchMode::Segment);
        let rules = StatusRules {
            highlight_marker: Some("canary".into()),
            denylist: CommandDenylist::new(&["install"]).unwrap(),
        };
        let report = StatusReport::build(&registry, &correlation, &rules);

        // web running; admin highlighted; worker + db failing; assets denylisted
        assert_eq!(
            report.summary,
            IconSummary {
                running: 1,
                highlighted: 1,
                failing: 2,
            }
        );
        assert!(report.rows.iter().any(|r| r.highlighted && r.name == "shop_admin_canary_1"));
    }

    #[test]
    fn test_empty_registry_gives_empty_summary() {
        let registry = ServiceRegistry::new();
        let correlation = correlate(&registry, &[], MatchMode::Segment);
        let report = StatusReport::build(&registry, &correlation, &StatusRules::default());
        assert!(report.summary.is_empty());
        assert!(report.rows.is_empty());
    }

    #[test]
    fn test_invalid_denylist_pattern() {
        let result = CommandDenylist::new(&["(unclosed"]);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
