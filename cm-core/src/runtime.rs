//! Container runtime trait
//!
//! The runtime is the live side of correlation: it lists containers, stops
//! them, and streams their logs. The Docker implementation lives in the CLI
//! crate; tests use in-memory fakes.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::RuntimeError;
use crate::model::ContainerRecord;

/// Which output stream a log chunk came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// A chunk of log output as delivered by the runtime; may hold several lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogChunk {
    pub stream: LogStream,
    pub data: Vec<u8>,
}

impl LogChunk {
    pub fn stdout(data: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: LogStream::Stdout,
            data: data.into(),
        }
    }

    pub fn stderr(data: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: LogStream::Stderr,
            data: data.into(),
        }
    }
}

pub type LogChunkStream = BoxStream<'static, Result<LogChunk, RuntimeError>>;

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Every container known to the runtime, running or not.
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>, RuntimeError>;

    /// Stop a container and wait until it has stopped.
    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError>;

    /// Follow combined stdout/stderr until the container's stream ends.
    fn follow_logs(&self, id: &str) -> LogChunkStream;
}
