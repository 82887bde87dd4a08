//! Log sinks.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::event::{QueryLogEvent, QueryOutcome};
use crate::AuditError;

/// A destination for query log events. Sinks must be shareable across the
/// threads validating queries concurrently.
pub trait QueryLogSink: Send + Sync {
    fn record(&self, event: &QueryLogEvent) -> Result<(), AuditError>;
}

/// Appends one JSON object per event to a file.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the log file for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl QueryLogSink for FileSink {
    fn record(&self, event: &QueryLogEvent) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut file = self.file.lock().expect("query log mutex poisoned");
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl QueryLogSink for TracingSink {
    fn record(&self, event: &QueryLogEvent) -> Result<(), AuditError> {
        match event.outcome {
            QueryOutcome::Allowed => tracing::info!(
                event_id = %event.event_id,
                query = %event.query,
                "query allowed"
            ),
            QueryOutcome::Rejected => tracing::warn!(
                event_id = %event.event_id,
                query = %event.query,
                error = event.diagnostic.as_ref().map(|d| d.message.as_str()),
                "query rejected"
            ),
        }
        Ok(())
    }
}
