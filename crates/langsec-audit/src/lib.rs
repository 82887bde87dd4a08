//! # langsec-audit
//!
//! Query log events and sinks. The engine itself performs no I/O; the
//! façade hands each validation outcome to a [`QueryLogSink`], and the sink
//! decides persistence. Shipped sinks: a JSON-lines [`FileSink`] and a
//! [`TracingSink`] that forwards to the `tracing` subscriber.

pub mod event;
pub mod sink;

pub use event::{QueryLogEvent, QueryOutcome};
pub use sink::{FileSink, QueryLogSink, TracingSink};

use thiserror::Error;

/// Errors raised by log sinks.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Opening or appending to the log file failed.
    #[error("failed to write query log: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing an event failed.
    #[error("failed to serialize query log event: {0}")]
    Serialize(#[from] serde_json::Error),
}
