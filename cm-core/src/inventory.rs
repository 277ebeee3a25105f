//! Everything one command invocation knows: declared services, live
//! containers, and their correlation. Built once, then passed by reference.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ServiceRegistry;
use crate::correlate::{Correlation, correlate};
use crate::error::{CmError, RuntimeError};
use crate::model::ContainerRecord;
use crate::runtime::ContainerRuntime;
use crate::settings::MatchMode;

#[derive(Clone, Debug)]
pub struct Inventory {
    pub root: PathBuf,
    pub registry: ServiceRegistry,
    pub containers: Vec<ContainerRecord>,
    pub correlation: Correlation,
}

impl Inventory {
    pub fn new(
        root: impl Into<PathBuf>,
        registry: ServiceRegistry,
        containers: Vec<ContainerRecord>,
        mode: MatchMode,
    ) -> Self {
        let correlation = correlate(&registry, &containers, mode);
        Self {
            root: root.into(),
            registry,
            containers,
            correlation,
        }
    }

    /// Snapshot the runtime's containers and correlate them with `registry`.
    pub async fn load<R>(
        runtime: &R,
        root: &Path,
        registry: ServiceRegistry,
        mode: MatchMode,
    ) -> Result<Self, RuntimeError>
    where
        R: ContainerRuntime + ?Sized,
    {
        let containers = runtime.list_containers().await?;
        info!(
            services = registry.len(),
            containers = containers.len(),
            "loaded inventory"
        );
        Ok(Self::new(root, registry, containers, mode))
    }

    /// Fails with `NoConfiguration` when no service is declared.
    pub fn require_services(&self) -> Result<(), CmError> {
        if self.registry.is_empty() {
            return Err(CmError::NoConfiguration(self.root.clone()));
        }
        Ok(())
    }
}
