use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{ListContainersOptions, LogOutput, LogsOptions, StopContainerOptions};
use futures_util::StreamExt;
use tracing::debug;

use cm_core::error::RuntimeError;
use cm_core::model::{ContainerRecord, ContainerState};
use cm_core::runtime::{ContainerRuntime, LogChunk, LogChunkStream};

/// Seconds the daemon waits before killing a stopping container.
const STOP_TIMEOUT_SECS: i64 = 10;

/// `ContainerRuntime` backed by the local Docker daemon.
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    pub async fn connect() -> Result<Self, RuntimeError> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Connect(e.to_string()))?;

        // Verify connection
        client
            .ping()
            .await
            .map_err(|e| RuntimeError::Connect(format!("ping failed: {}", e)))?;

        debug!("connected to Docker");
        Ok(Self { client })
    }
}

fn to_chunk(output: LogOutput) -> LogChunk {
    match output {
        LogOutput::StdErr { message } => LogChunk::stderr(message.to_vec()),
        LogOutput::StdOut { message }
        | LogOutput::StdIn { message }
        | LogOutput::Console { message } => LogChunk::stdout(message.to_vec()),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>, RuntimeError> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| RuntimeError::Request(e.to_string()))?;

        let records: Vec<ContainerRecord> = summaries
            .into_iter()
            .filter_map(|summary| {
                let id = summary.id?;
                let name = summary.names.and_then(|names| names.into_iter().next())?;
                let state = summary
                    .state
                    .as_deref()
                    .map(ContainerState::parse)
                    .unwrap_or_else(|| ContainerState::Other("unknown".into()));
                Some(ContainerRecord::new(
                    id,
                    &name,
                    state,
                    summary.image.unwrap_or_default(),
                ))
            })
            .collect();

        debug!(count = records.len(), "listed containers");
        Ok(records)
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        let options = StopContainerOptions {
            t: STOP_TIMEOUT_SECS,
        };
        self.client
            .stop_container(id, Some(options))
            .await
            .map_err(|e| RuntimeError::Request(format!("failed to stop {}: {}", id, e)))
    }

    fn follow_logs(&self, id: &str) -> LogChunkStream {
        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            ..Default::default()
        };

        self.client
            .logs(id, Some(options))
            .map(|result| {
                result
                    .map(to_chunk)
                    .map_err(|e| RuntimeError::Stream(e.to_string()))
            })
            .boxed()
    }
}
