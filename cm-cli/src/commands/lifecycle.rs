use std::process::ExitCode;

use cm_core::error::CmError;
use cm_core::lifecycle::{LifecycleController, LifecycleEvent};
use cm_core::process::ExitOutcome;

use super::Context;
use crate::adapters::DockerRuntime;
use crate::runner::CommandRunner;

fn report(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::StoppingContainer { service, container } => {
            println!("Stopping {} ({})", container, service);
        }
        LifecycleEvent::Executing { command } => println!("$ {}", command),
        LifecycleEvent::NoCorrespondingService { selector } => {
            eprintln!("No corresponding service for '{}'", selector);
        }
    }
}

/// Maps a child's exit status onto ours. Signals count as failure.
fn exit_code(outcome: ExitOutcome) -> ExitCode {
    match outcome.code {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}

pub async fn run_start(ctx: &Context, selectors: &[String]) -> Result<ExitCode, CmError> {
    let runtime = DockerRuntime::connect().await?;
    let inventory = ctx.inventory(&runtime).await?;
    let runner = CommandRunner::new().with_cwd(&ctx.cwd);
    let commands = ctx.commands();

    LifecycleController::new(&runtime, &runner, &commands)
        .on_event(report)
        .start(&inventory, selectors)
        .await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn run_stop(ctx: &Context) -> Result<ExitCode, CmError> {
    let runtime = DockerRuntime::connect().await?;
    let runner = CommandRunner::new().with_cwd(&ctx.cwd);
    let commands = ctx.commands();

    LifecycleController::new(&runtime, &runner, &commands)
        .on_event(report)
        .stop()
        .await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn run_go(ctx: &Context, query: &str) -> Result<ExitCode, CmError> {
    let runtime = DockerRuntime::connect().await?;
    let inventory = ctx.inventory(&runtime).await?;
    let runner = CommandRunner::new().with_cwd(&ctx.cwd);
    let commands = ctx.commands();

    let outcome = LifecycleController::new(&runtime, &runner, &commands)
        .go(&inventory, query)
        .await?;
    Ok(exit_code(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code(ExitOutcome::success()), ExitCode::SUCCESS);
        assert_eq!(exit_code(ExitOutcome { code: Some(130) }), ExitCode::from(130));
        assert_eq!(exit_code(ExitOutcome { code: Some(-1) }), ExitCode::from(1));
        assert_eq!(exit_code(ExitOutcome { code: None }), ExitCode::FAILURE);
    }
}
