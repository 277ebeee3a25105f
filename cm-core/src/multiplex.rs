//! Concurrent log following for one or many containers.
//!
//! Every container gets its own task that reads its log stream and sends
//! rendered lines to a single sink over a channel. Lines of one container
//! keep their order; lines of different containers interleave freely. A
//! failing stream reports inline and ends alone.

use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::CmError;
use crate::fuzzy;
use crate::inventory::Inventory;
use crate::log_render::LogRenderer;
use crate::model::{ContainerId, ContainerRecord};
use crate::names::NameDiffer;
use crate::runtime::ContainerRuntime;

const CHANNEL_CAPACITY: usize = 1_024;

/// One followed container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogChannel {
    pub label: String,
    pub color_slot: usize,
    pub container_id: ContainerId,
}

/// Running correlated containers to follow. With a query only the best
/// fuzzy match by container name is kept.
pub fn select_containers<'a>(
    inventory: &'a Inventory,
    query: Option<&str>,
) -> Result<Vec<&'a ContainerRecord>, CmError> {
    inventory.require_services()?;
    let running = inventory.correlation.running_containers();

    let Some(query) = query else {
        return Ok(running);
    };

    let names: Vec<&str> = running.iter().map(|c| c.name.as_str()).collect();
    match fuzzy::best(query, &names) {
        Some(best) => Ok(vec![running[best.index]]),
        None => Err(CmError::NoMatchingContainer(query.to_string())),
    }
}

/// Assign labels and color slots. Each label is diffed against the next
/// container's name (wrapping) and padded to the longest label.
pub fn assign_channels(containers: &[&ContainerRecord], differ: &NameDiffer) -> Vec<LogChannel> {
    let labels: Vec<String> = containers
        .iter()
        .enumerate()
        .map(|(i, container)| {
            let sibling = (containers.len() > 1)
                .then(|| containers[(i + 1) % containers.len()].name.as_str());
            differ.distinguish(&container.name, sibling)
        })
        .collect();

    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    containers
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(slot, (container, label))| LogChannel {
            label: format!("{:<width$}", label, width = width),
            color_slot: slot,
            container_id: container.id.clone(),
        })
        .collect()
}

#[derive(Debug)]
enum LogEvent {
    Line(String),
    Closed { container_id: ContainerId },
}

pub struct LogMultiplexer {
    colorize: bool,
}

impl LogMultiplexer {
    pub fn new(colorize: bool) -> Self {
        Self { colorize }
    }

    /// Follow every channel until all streams end, writing to `sink`.
    pub async fn run<R, W>(
        &self,
        runtime: &R,
        channels: Vec<LogChannel>,
        sink: &mut W,
    ) -> std::io::Result<()>
    where
        R: ContainerRuntime + ?Sized,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::channel::<LogEvent>(CHANNEL_CAPACITY);

        for channel in channels {
            let mut stream = runtime.follow_logs(&channel.container_id);
            let renderer = LogRenderer::new(channel.label.clone(), channel.color_slot, self.colorize);
            let tx = tx.clone();

            debug!(container = %channel.container_id, label = %channel.label.trim_end(), "following logs");

            tokio::spawn(async move {
                while let Some(result) = stream.next().await {
                    let event = match result {
                        Ok(chunk) => match renderer.render(&chunk) {
                            Some(text) => LogEvent::Line(text),
                            None => continue,
                        },
                        Err(e) => {
                            warn!(container = %channel.container_id, error = %e, "log stream failed");
                            let _ = tx.send(LogEvent::Line(renderer.render_error(&e.to_string()))).await;
                            break;
                        }
                    };
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
                let _ = tx
                    .send(LogEvent::Closed {
                        container_id: channel.container_id,
                    })
                    .await;
            });
        }

        // only the spawned tasks hold senders now
        drop(tx);

        while let Some(event) = rx.recv().await {
            match event {
                LogEvent::Line(text) => {
                    sink.write_all(text.as_bytes()).await?;
                    sink.write_all(b"\n").await?;
                    sink.flush().await?;
                }
                LogEvent::Closed { container_id } => {
                    debug!(container = %container_id, "log stream ended");
                }
            }
        }

        Ok(())
    }
}
