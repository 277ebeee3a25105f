use std::io::{self, IsTerminal};
use std::process::ExitCode;

use cm_core::error::CmError;
use cm_core::multiplex::{LogMultiplexer, assign_channels, select_containers};
use cm_core::names::NameDiffer;

use super::Context;
use crate::adapters::DockerRuntime;

/// Follow the selected containers until every stream ends.
pub async fn run_log(ctx: &Context, query: Option<&str>) -> Result<ExitCode, CmError> {
    let runtime = DockerRuntime::connect().await?;
    let inventory = ctx.inventory(&runtime).await?;

    let containers = select_containers(&inventory, query)?;
    if containers.is_empty() {
        return Err(CmError::NoMatchingContainers(query.unwrap_or("*").to_string()));
    }

    let channels = assign_channels(&containers, &NameDiffer::new(ctx.settings.label_separator));
    let colorize = io::stdout().is_terminal();
    let mut out = tokio::io::stdout();

    LogMultiplexer::new(colorize)
        .run(&runtime, channels, &mut out)
        .await?;
    Ok(ExitCode::SUCCESS)
}
