//! CPU utilisation events and their JSON-lines output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use cpustat_telemetry::MetricFields;

/// Host identification attached to every event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInfo {
    pub name: String,
}

/// One emitted document: either the aggregate `cpu` metrics or a single
/// `core`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuEvent {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    pub host: HostInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<MetricFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core: Option<MetricFields>,
}

impl CpuEvent {
    /// Aggregate event for all cores.
    pub fn totals(timestamp: DateTime<Utc>, host: &str, fields: MetricFields) -> Self {
        Self {
            timestamp,
            host: HostInfo {
                name: host.to_string(),
            },
            cpu: Some(fields),
            core: None,
        }
    }

    /// Event for one core; the core index is added as `core.id`.
    pub fn core(timestamp: DateTime<Utc>, host: &str, index: usize, mut fields: MetricFields) -> Self {
        fields.put("id", index as u64);
        Self {
            timestamp,
            host: HostInfo {
                name: host.to_string(),
            },
            cpu: None,
            core: Some(fields),
        }
    }
}

/// Writes events as newline-delimited JSON.
pub struct EventReporter<W: Write> {
    writer: W,
    events_written: u64,
}

impl<W: Write> EventReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            events_written: 0,
        }
    }

    /// Write one event and flush.
    pub fn report(&mut self, event: &CpuEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event).context("Failed to serialize event")?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .context("Failed to write event")?;
        self.events_written += 1;
        Ok(())
    }

    /// Total events written so far.
    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
