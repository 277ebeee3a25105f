//! start / stop / go
//!
//! Targets are chosen with the fuzzy resolver over declared service ids and
//! live container names. A running container is always stopped, and the stop
//! awaited, before its service is relaunched.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::CmError;
use crate::fuzzy;
use crate::inventory::Inventory;
use crate::model::{ContainerRecord, ServiceId};
use crate::process::{CommandSet, ExitOutcome, ProcessRunner, ProcessSpec};
use crate::runtime::ContainerRuntime;

/// Progress reported while a lifecycle action runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    StoppingContainer { service: ServiceId, container: String },
    Executing { command: String },
    NoCorrespondingService { selector: String },
}

/// Where `go` opens a shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoTarget {
    /// Exec into a running container
    Container(ContainerRecord),
    /// Start a one-off container for a declared service
    Service(ServiceId),
}

/// Services matched by `start` selectors, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub services: Vec<ServiceId>,
    pub unmatched: Vec<String>,
}

/// Union of the fuzzy matches of every selector against declared ids.
pub fn select_services(inventory: &Inventory, selectors: &[String]) -> Selection {
    let ids = inventory.registry.ids();
    let mut picked = vec![false; ids.len()];
    let mut unmatched = Vec::new();

    for selector in selectors {
        let ranked = fuzzy::rank(selector, &ids);
        if ranked.is_empty() {
            unmatched.push(selector.clone());
        }
        for candidate in ranked {
            picked[candidate.index] = true;
        }
    }

    Selection {
        services: ids
            .iter()
            .zip(picked)
            .filter(|(_, picked)| *picked)
            .map(|(id, _)| id.to_string())
            .collect(),
        unmatched,
    }
}

/// Running containers first, then declared services.
pub fn resolve_go(inventory: &Inventory, query: &str) -> Result<GoTarget, CmError> {
    let running = inventory.correlation.running_containers();
    let names: Vec<&str> = running.iter().map(|c| c.name.as_str()).collect();
    if let Some(best) = fuzzy::best(query, &names) {
        return Ok(GoTarget::Container(running[best.index].clone()));
    }

    let ids = inventory.registry.ids();
    if let Some(best) = fuzzy::best(query, &ids) {
        return Ok(GoTarget::Service(best.candidate));
    }

    Err(CmError::NoMatchingContainers(query.to_string()))
}

type EventHook<'a> = Box<dyn Fn(&LifecycleEvent) + Send + Sync + 'a>;

pub struct LifecycleController<'a, R: ?Sized, P: ?Sized> {
    runtime: &'a R,
    runner: &'a P,
    commands: &'a CommandSet,
    on_event: EventHook<'a>,
}

impl<'a, R, P> LifecycleController<'a, R, P>
where
    R: ContainerRuntime + ?Sized,
    P: ProcessRunner + ?Sized,
{
    pub fn new(runtime: &'a R, runner: &'a P, commands: &'a CommandSet) -> Self {
        Self {
            runtime,
            runner,
            commands,
            on_event: Box::new(|_| {}),
        }
    }

    pub fn on_event(mut self, hook: impl Fn(&LifecycleEvent) + Send + Sync + 'a) -> Self {
        self.on_event = Box::new(hook);
        self
    }

    fn emit(&self, event: LifecycleEvent) {
        (self.on_event)(&event);
    }

    /// Stops the service's running containers. `stopped` spans one action,
    /// so a container claimed by several services is stopped once.
    async fn stop_running<'i>(
        &self,
        inventory: &'i Inventory,
        service: &str,
        stopped: &mut HashSet<&'i str>,
    ) -> Result<(), CmError> {
        for container in inventory.correlation.containers_for(service) {
            if !container.is_running() {
                continue;
            }
            if !stopped.insert(container.id.as_str()) {
                debug!(service, container = %container.name, "already stopped");
                continue;
            }
            info!(service, container = %container.name, "stopping running container");
            self.emit(LifecycleEvent::StoppingContainer {
                service: service.to_string(),
                container: container.name.clone(),
            });
            self.runtime.stop_container(&container.id).await?;
        }
        Ok(())
    }

    async fn execute(&self, spec: &ProcessSpec) -> Result<ExitOutcome, CmError> {
        info!(command = %spec, "executing");
        self.emit(LifecycleEvent::Executing {
            command: spec.to_string(),
        });
        Ok(self.runner.run(spec).await?)
    }

    async fn execute_checked(&self, spec: &ProcessSpec) -> Result<(), CmError> {
        let outcome = self.execute(spec).await?;
        if !outcome.is_success() {
            return Err(CmError::CommandFailed {
                command: spec.to_string(),
                code: outcome.code,
            });
        }
        Ok(())
    }

    /// With no selectors every declared service is stopped, then the bulk
    /// start command runs once. With selectors each matched service is
    /// stopped and relaunched on its own.
    pub async fn start(&self, inventory: &Inventory, selectors: &[String]) -> Result<(), CmError> {
        inventory.require_services()?;

        let mut stopped = HashSet::new();

        if selectors.is_empty() {
            for definition in inventory.registry.iter() {
                self.stop_running(inventory, &definition.id, &mut stopped).await?;
            }
            return self.execute_checked(&self.commands.bulk_start()?).await;
        }

        let selection = select_services(inventory, selectors);
        for selector in &selection.unmatched {
            warn!(selector = %selector, "no corresponding service");
            self.emit(LifecycleEvent::NoCorrespondingService {
                selector: selector.clone(),
            });
        }

        for service in &selection.services {
            self.stop_running(inventory, service, &mut stopped).await?;
            self.execute_checked(&self.commands.relaunch(service)).await?;
        }

        if !selection.unmatched.is_empty() {
            return Err(CmError::NoCorrespondingService(selection.unmatched.join(", ")));
        }
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), CmError> {
        self.execute_checked(&self.commands.bulk_stop()?).await
    }

    /// Opens an interactive shell and returns how it ended.
    pub async fn go(&self, inventory: &Inventory, query: &str) -> Result<ExitOutcome, CmError> {
        inventory.require_services()?;

        let spec = match resolve_go(inventory, query)? {
            GoTarget::Container(container) => {
                info!(container = %container.name, "attaching to running container");
                self.commands.exec_shell(&container.id)
            }
            GoTarget::Service(service) => {
                info!(service = %service, "no running match, starting one-off container");
                self.commands.run_shell(&service)
            }
        };
        self.execute(&spec).await
    }
}
