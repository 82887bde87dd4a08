//! Query log events.

use chrono::{DateTime, Utc};
use langsec_core::Diagnostic;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    Allowed,
    Rejected,
}

impl std::fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allowed => write!(f, "ALLOWED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// One validation outcome: the query, whether it passed, and the diagnostic
/// when it did not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEvent {
    /// Unique event ID.
    pub event_id: Uuid,

    /// When the validation happened.
    pub occurred_at: DateTime<Utc>,

    /// The raw query as submitted.
    pub query: String,

    /// Whether the query was approved.
    pub outcome: QueryOutcome,

    /// The diagnostic, for rejected queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl QueryLogEvent {
    /// Record an approved query.
    pub fn allowed(query: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            query: query.into(),
            outcome: QueryOutcome::Allowed,
            diagnostic: None,
        }
    }

    /// Record a rejected query with its diagnostic.
    pub fn rejected(query: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            query: query.into(),
            outcome: QueryOutcome::Rejected,
            diagnostic: Some(diagnostic),
        }
    }

    /// Format the event as a human-readable log line:
    /// `[timestamp] OUTCOME query="..." [error="..."]`.
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] {} query=\"{}\"",
            self.occurred_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.outcome,
            preview(&self.query),
        );
        if let Some(diagnostic) = &self.diagnostic {
            line.push_str(&format!(
                " error=\"{}\"",
                diagnostic.message.replace('"', "'")
            ));
        }
        line
    }
}

/// Truncate long queries for console output.
fn preview(query: &str) -> String {
    let flattened = query.replace('\n', " ");
    if flattened.len() > 200 {
        let cut: String = flattened.chars().take(200).collect();
        format!("{}...", cut)
    } else {
        flattened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_event_serializes_without_diagnostic() {
        let event = QueryLogEvent::allowed("SELECT id FROM users");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"], "allowed");
        assert!(json.get("diagnostic").is_none());
    }

    #[test]
    fn rejected_event_carries_the_diagnostic() {
        let event = QueryLogEvent::rejected(
            "SELECT email FROM users",
            Diagnostic::column_denied("users", "email"),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["diagnostic"]["kind"], "ColumnAccessError");
    }

    #[test]
    fn log_line_format() {
        let event = QueryLogEvent::rejected(
            "SELECT email FROM users",
            Diagnostic::column_denied("users", "email"),
        );
        let line = event.to_log_line();
        assert!(line.contains("REJECTED"));
        assert!(line.contains("query=\"SELECT email FROM users\""));
        assert!(line.contains("error="));
    }

    #[test]
    fn long_queries_are_truncated_in_log_lines() {
        let query = format!("SELECT id FROM users WHERE username IN ({})", "x,".repeat(200));
        let event = QueryLogEvent::allowed(query);
        assert!(event.to_log_line().contains("..."));
    }
}
