//! One module per subcommand group. Each handler loads what it needs for a
//! single invocation and returns the process exit code.

mod goto;
mod lifecycle;
mod logs;
mod status;

use std::path::{Path, PathBuf};

use cm_core::config::ServiceRegistry;
use cm_core::error::CmError;
use cm_core::inventory::Inventory;
use cm_core::process::CommandSet;
use cm_core::runtime::ContainerRuntime;
use cm_core::settings::Settings;

pub use goto::run_goto;
pub use lifecycle::{run_go, run_start, run_stop};
pub use logs::run_log;
pub use status::{run_icon, run_status};

/// Settings and working directory for one invocation.
pub struct Context {
    pub cwd: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn load(cwd: PathBuf, explicit_config: Option<&Path>) -> Result<Self, CmError> {
        let settings = Settings::discover(explicit_config, &cwd)?;
        Ok(Self { cwd, settings })
    }

    pub fn registry(&self) -> Result<ServiceRegistry, CmError> {
        Ok(ServiceRegistry::load(
            &self.cwd,
            &self.settings.compose_file,
            &self.settings.compose_override,
        )?)
    }

    pub fn commands(&self) -> CommandSet {
        CommandSet::new(&self.settings, self.settings.existing_env_file(&self.cwd))
    }

    /// Declared services plus a fresh container snapshot. Fails before
    /// touching Docker when nothing is declared.
    pub async fn inventory<R>(&self, runtime: &R) -> Result<Inventory, CmError>
    where
        R: ContainerRuntime + ?Sized,
    {
        let registry = self.registry()?;
        if registry.is_empty() {
            return Err(CmError::NoConfiguration(self.cwd.clone()));
        }
        Ok(Inventory::load(runtime, &self.cwd, registry, self.settings.match_mode).await?)
    }
}
