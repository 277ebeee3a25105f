//! Correlation of declared services with live containers by name pattern.
//!
//! Compose appends project prefixes and replica suffixes to service names,
//! so a service id is never compared for equality: it is compiled into a
//! [`ServiceMatcher`] and searched inside each container name.

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::ServiceRegistry;
use crate::model::{ContainerRecord, ServiceDefinition, ServiceId};
use crate::settings::MatchMode;

#[derive(Clone, Debug)]
enum Pattern {
    Regex(Regex),
    Literal(String),
}

/// A service id compiled once into a container name pattern.
#[derive(Clone, Debug)]
pub struct ServiceMatcher {
    id: ServiceId,
    pattern: Pattern,
}

impl ServiceMatcher {
    pub fn compile(id: &str, mode: MatchMode) -> Self {
        let source = match mode {
            MatchMode::Segment => format!(r"(?:^|[-_.]){}(?:[-_.]|$)", regex::escape(id)),
            MatchMode::Contains => id.to_string(),
        };

        let pattern = match Regex::new(&source) {
            Ok(regex) => Pattern::Regex(regex),
            Err(e) => {
                warn!(service = id, error = %e, "service id is not a valid pattern, matching literally");
                Pattern::Literal(id.to_string())
            }
        };

        Self {
            id: id.to_string(),
            pattern,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn matches(&self, container_name: &str) -> bool {
        match &self.pattern {
            Pattern::Regex(regex) => regex.is_match(container_name),
            Pattern::Literal(literal) => container_name.contains(literal.as_str()),
        }
    }
}

/// Containers matched by each declared service, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Correlation {
    matches: IndexMap<ServiceId, Vec<ContainerRecord>>,
}

impl Correlation {
    pub fn containers_for(&self, id: &str) -> &[ContainerRecord] {
        self.matches.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceId, &Vec<ContainerRecord>)> {
        self.matches.iter()
    }

    /// Declared services with no container at all.
    pub fn unmatched(&self) -> impl Iterator<Item = &ServiceId> {
        self.matches
            .iter()
            .filter(|(_, containers)| containers.is_empty())
            .map(|(id, _)| id)
    }

    /// Every matched container once, first-match order. Overlapping service
    /// patterns may claim the same container; it is listed a single time
    /// in this flattened view, which `log` and `go` work from. The
    /// per-service mapping behind `containers_for` keeps every claim, so
    /// `start` tracks what it already stopped.
    pub fn containers(&self) -> Vec<&ContainerRecord> {
        let mut seen = std::collections::HashSet::new();
        self.matches
            .values()
            .flatten()
            .filter(|c| seen.insert(c.id.as_str()))
            .collect()
    }

    pub fn running_containers(&self) -> Vec<&ContainerRecord> {
        self.containers()
            .into_iter()
            .filter(|c| c.is_running())
            .collect()
    }
}

/// Map every declared service to the containers whose name it matches.
pub fn correlate(
    registry: &ServiceRegistry,
    containers: &[ContainerRecord],
    mode: MatchMode,
) -> Correlation {
    let matches: IndexMap<ServiceId, Vec<ContainerRecord>> = registry
        .iter()
        .map(|definition: &ServiceDefinition| {
            let matcher = ServiceMatcher::compile(&definition.id, mode);
            let found: Vec<ContainerRecord> = containers
                .iter()
                .filter(|c| matcher.matches(&c.name))
                .cloned()
                .collect();
            (definition.id.clone(), found)
        })
        .collect();

    let correlation = Correlation { matches };
    debug!(
        services = registry.len(),
        containers = containers.len(),
        unmatched = correlation.unmatched().count(),
        "correlated services with containers"
    );
    correlation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContainerState;

    fn container(id: &str, name: &str, state: ContainerState) -> ContainerRecord {
        ContainerRecord::new(id, &format!("/{name}"), state, "image")
    }

    #[test]
    fn test_segment_matches_compose_names() {
        let matcher = ServiceMatcher::compile("api", MatchMode::Segment);
        assert!(matcher.matches("project_api_1"));
        assert!(matcher.matches("project-api-2"));
        assert!(matcher.matches("api"));
        assert!(!matcher.matches("apikey-rotator"));
        assert!(!matcher.matches("project-rapid-1"));
    }

    #[test]
    fn test_contains_mode_keeps_substring_risk() {
        let matcher = ServiceMatcher::compile("api", MatchMode::Contains);
        assert!(matcher.matches("project_api_1"));
        assert!(matcher.matches("project-api-2"));
        // the legacy containment semantics also claim unrelated containers
        assert!(matcher.matches("apikey-rotator"));
    }

    #[test]
    fn test_segment_escapes_metacharacters() {
        let matcher = ServiceMatcher::compile("a.b", MatchMode::Segment);
        assert!(matcher.matches("proj_a.b_1"));
        assert!(!matcher.matches("proj_axb_1"));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        let matcher = ServiceMatcher::compile("web(", MatchMode::Contains);
        assert!(matcher.matches("proj_web(_1"));
        assert!(!matcher.matches("proj_web_1"));
    }

    #[test]
    fn test_correlate_groups_replicas() {
        let registry: ServiceRegistry = [
            ServiceDefinition::new("api").with_image("node"),
            ServiceDefinition::new("db").with_image("postgres"),
            ServiceDefinition::new("setup"),
        ]
        .into_iter()
        .collect();
        let containers = vec![
            container("1", "shop_api_1", ContainerState::Running),
            container("2", "shop_api_2", ContainerState::Exited),
            container("3", "apikey-rotator", ContainerState::Running),
            container("4", "shop_db_1", ContainerState::Running),
        ];

        let correlation = correlate(&registry, &containers, MatchMode::Segment);
        let api: Vec<_> = correlation
            .containers_for("api")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(api, vec!["1", "2"]);
        assert_eq!(correlation.containers_for("db").len(), 1);
        assert!(correlation.containers_for("setup").is_empty());
        assert_eq!(correlation.unmatched().collect::<Vec<_>>(), vec!["setup"]);

        let running: Vec<_> = correlation
            .running_containers()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(running, vec!["shop_api_1", "shop_db_1"]);
    }

    #[test]
    fn test_overlapping_patterns_listed_once() {
        let registry: ServiceRegistry = [
            ServiceDefinition::new("web"),
            ServiceDefinition::new("shop"),
        ]
        .into_iter()
        .collect();
        let containers = vec![container("1", "shop_web_1", ContainerState::Running)];

        let correlation = correlate(&registry, &containers, MatchMode::Segment);
        assert_eq!(correlation.containers_for("web").len(), 1);
        assert_eq!(correlation.containers_for("shop").len(), 1);
        assert_eq!(correlation.containers().len(), 1);
    }
}
