use std::process::ExitCode;

use tracing::warn;

use cm_core::error::CmError;
use cm_core::runtime::ContainerRuntime;
use cm_core::status::{CommandDenylist, StatusReport, StatusRules};

use super::Context;
use crate::adapters::DockerRuntime;
use crate::ui::theme;

fn rules(ctx: &Context) -> Result<StatusRules, CmError> {
    Ok(StatusRules {
        highlight_marker: ctx.settings.highlight_marker.clone(),
        denylist: CommandDenylist::new(&ctx.settings.ignored_commands)?,
    })
}

async fn report<R>(ctx: &Context, runtime: &R) -> Result<StatusReport, CmError>
where
    R: ContainerRuntime + ?Sized,
{
    let rules = rules(ctx)?;
    let inventory = ctx.inventory(runtime).await?;
    Ok(StatusReport::build(
        &inventory.registry,
        &inventory.correlation,
        &rules,
    ))
}

pub async fn run_status(ctx: &Context) -> Result<ExitCode, CmError> {
    let runtime = DockerRuntime::connect().await?;
    println!("{}", theme::status_table(&report(ctx, &runtime).await?));
    Ok(ExitCode::SUCCESS)
}

/// Prompt summary. Prints nothing, successfully, when there is nothing to
/// summarize or Docker cannot be reached.
pub async fn run_icon(ctx: &Context) -> Result<ExitCode, CmError> {
    if ctx.registry()?.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let runtime = match DockerRuntime::connect().await {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!(error = %e, "icon skipped");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let icon = theme::icon_summary(&report(ctx, &runtime).await?.summary);
    if !icon.is_empty() {
        println!("{}", icon);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use cm_core::error::RuntimeError;
    use cm_core::model::{ContainerRecord, ContainerState};
    use cm_core::runtime::LogChunkStream;
    use cm_core::settings::Settings;

    struct FixedRuntime {
        containers: Vec<ContainerRecord>,
    }

    #[async_trait]
    impl ContainerRuntime for FixedRuntime {
        async fn list_containers(&self) -> Result<Vec<ContainerRecord>, RuntimeError> {
            Ok(self.containers.clone())
        }

        async fn stop_container(&self, _id: &str) -> Result<(), RuntimeError> {
            Ok(())
        }

        fn follow_logs(&self, _id: &str) -> LogChunkStream {
            Box::pin(futures_util::stream::empty())
        }
    }

    fn context(dir: &std::path::Path) -> Context {
        Context {
            cwd: dir.to_path_buf(),
            settings: Settings::default(),
        }
    }

    #[tokio::test]
    async fn test_icon_without_configuration_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let code = run_icon(&context(dir.path())).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_report_from_compose_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("docker-compose.yml"),
            "services:\n  api:\n    image: node\n  db:\n    image: postgres\n  setup:\n    command: make setup\n",
        )
        .unwrap();
        let runtime = FixedRuntime {
            containers: vec![ContainerRecord::new(
                "0123456789abcdef",
                "/shop_api_1",
                ContainerState::Running,
                "node",
            )],
        };

        let report = report(&context(dir.path()), &runtime).await.unwrap();
        let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["shop_api_1", "db"]);
        assert_eq!(report.summary.running, 1);
        assert_eq!(report.summary.failing, 1);
    }

    #[tokio::test]
    async fn test_report_without_configuration_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FixedRuntime { containers: vec![] };
        let result = report(&context(dir.path()), &runtime).await;
        assert!(matches!(result, Err(CmError::NoConfiguration(_))));
    }
}
