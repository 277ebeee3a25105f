//! Declared services from the base and override compose files.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::model::{ServiceCommand, ServiceDefinition, ServiceId};

/// The fields cm reads from a compose service body. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct ServiceBody {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    command: Option<ServiceCommand>,
}

/// Ordered mapping of service id to definition, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ServiceRegistry {
    services: IndexMap<ServiceId, ServiceDefinition>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `base` and `overlay` (relative to `dir`). Missing files are skipped.
    pub fn load(dir: &Path, base: &Path, overlay: &Path) -> Result<Self, ConfigError> {
        let base = read_document(&dir.join(base))?;
        let overlay = read_document(&dir.join(overlay))?;

        let merged = match (base, overlay) {
            (Some(mut base), Some(overlay)) => {
                deep_merge(&mut base, overlay);
                base
            }
            (Some(doc), None) | (None, Some(doc)) => doc,
            (None, None) => return Ok(Self::new()),
        };

        Self::from_value(merged)
    }

    /// Build from YAML text (useful for testing)
    pub fn from_yaml(base: &str, overlay: Option<&str>) -> Result<Self, ConfigError> {
        let parse = |content: &str| {
            serde_yaml::from_str::<Value>(content).map_err(|source| ConfigError::Yaml {
                path: PathBuf::from("<inline>"),
                source,
            })
        };

        let mut doc = parse(base)?;
        if let Some(overlay) = overlay {
            deep_merge(&mut doc, parse(overlay)?);
        }
        Self::from_value(doc)
    }

    fn from_value(doc: Value) -> Result<Self, ConfigError> {
        let mut services = IndexMap::new();

        let Some(mapping) = doc.get("services").and_then(Value::as_mapping) else {
            return Ok(Self { services });
        };

        for (key, body) in mapping {
            let Some(id) = key.as_str() else { continue };

            let body: ServiceBody = match body {
                Value::Null => ServiceBody::default(),
                other => serde_yaml::from_value(other.clone()).map_err(|source| {
                    ConfigError::InvalidService {
                        service: id.to_string(),
                        source,
                    }
                })?,
            };

            services.insert(
                id.to_string(),
                ServiceDefinition {
                    id: id.to_string(),
                    image: body.image,
                    command: body.command,
                },
            );
        }

        debug!(count = services.len(), "loaded declared services");
        Ok(Self { services })
    }

    pub fn insert(&mut self, definition: ServiceDefinition) {
        self.services.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&ServiceDefinition> {
        self.services.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromIterator<ServiceDefinition> for ServiceRegistry {
    fn from_iter<I: IntoIterator<Item = ServiceDefinition>>(iter: I) -> Self {
        let mut registry = Self::new();
        for definition in iter {
            registry.insert(definition);
        }
        registry
    }
}

fn read_document(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "compose file not present");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "read compose file");
    Ok(Some(value))
}

/// Merge `overlay` into `base`. Mappings merge key by key; anything else in
/// the overlay replaces the base value.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => merge_mappings(base, overlay),
        (base, overlay) => *base = overlay,
    }
}

fn merge_mappings(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_services_in_order() {
        let yaml = r#"
services:
  web:
    image: nginx
  api:
    image: node:20
    command: ["node", "server.js"]
  setup:
    command: composer install
"#;
        let registry = ServiceRegistry::from_yaml(yaml, None).unwrap();
        assert_eq!(registry.ids(), vec!["web", "api", "setup"]);

        let api = registry.get("api").unwrap();
        assert_eq!(api.image.as_deref(), Some("node:20"));
        assert_eq!(
            api.command,
            Some(ServiceCommand::Exec(vec!["node".into(), "server.js".into()]))
        );

        let setup = registry.get("setup").unwrap();
        assert_eq!(setup.image, None);
        assert_eq!(
            setup.command,
            Some(ServiceCommand::Shell("composer install".into()))
        );
    }

    #[test]
    fn test_override_merges_recursively() {
        let base = r#"
services:
  api:
    image: node:18
    command: npm start
    environment:
      A: "1"
      B: "2"
  db:
    image: postgres
"#;
        let overlay = r#"
services:
  api:
    image: node:20
    environment:
      B: "3"
  mailer:
    image: mailhog
"#;
        let mut doc: Value = serde_yaml::from_str(base).unwrap();
        deep_merge(&mut doc, serde_yaml::from_str(overlay).unwrap());

        let api = &doc["services"]["api"];
        assert_eq!(api["image"].as_str(), Some("node:20"));
        assert_eq!(api["command"].as_str(), Some("npm start"));
        assert_eq!(api["environment"]["A"].as_str(), Some("1"));
        assert_eq!(api["environment"]["B"].as_str(), Some("3"));

        let registry = ServiceRegistry::from_yaml(base, Some(overlay)).unwrap();
        assert_eq!(registry.ids(), vec!["api", "db", "mailer"]);
        assert_eq!(registry.get("api").unwrap().image.as_deref(), Some("node:20"));
    }

    #[test]
    fn test_sequences_are_replaced_not_merged() {
        let mut base: Value = serde_yaml::from_str("command: [a, b, c]").unwrap();
        deep_merge(&mut base, serde_yaml::from_str("command: [d]").unwrap());
        assert_eq!(base["command"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_null_service_body() {
        let registry = ServiceRegistry::from_yaml("services:\n  worker:\n", None).unwrap();
        let worker = registry.get("worker").unwrap();
        assert_eq!(worker.image, None);
        assert_eq!(worker.command, None);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("docker-compose.yml"),
            "services:\n  web:\n    image: nginx\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("docker-compose.dev.yml"),
            "services:\n  web:\n    command: nginx -g 'daemon off;'\n  debug:\n    image: busybox\n",
        )
        .unwrap();

        let registry = ServiceRegistry::load(
            dir.path(),
            Path::new("docker-compose.yml"),
            Path::new("docker-compose.dev.yml"),
        )
        .unwrap();
        assert_eq!(registry.ids(), vec!["web", "debug"]);
        assert!(registry.get("web").unwrap().command.is_some());
    }

    #[test]
    fn test_missing_files_give_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ServiceRegistry::load(
            dir.path(),
            Path::new("docker-compose.yml"),
            Path::new("docker-compose.dev.yml"),
        )
        .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: [unclosed").unwrap();
        let result = ServiceRegistry::load(
            dir.path(),
            Path::new("docker-compose.yml"),
            Path::new("docker-compose.dev.yml"),
        );
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
