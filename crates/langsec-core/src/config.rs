//! Façade configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::schema::SchemaError;

fn default_true() -> bool {
    true
}

/// Options consumed by the guard façade, not the engine: the engine always
/// returns a result, these decide how the façade presents it and whether
/// outcomes are logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// Record every validation outcome to the query log.
    #[serde(default)]
    pub log_queries: bool,

    /// Log destination. `None` with `log_queries` enabled logs via `tracing`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Surface failures as errors (`true`) or as a `false` return (`false`).
    #[serde(default = "default_true")]
    pub raise_on_violation: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            log_queries: false,
            log_path: None,
            raise_on_violation: true,
        }
    }
}

impl GuardConfig {
    /// Parse a config from YAML content. Unknown keys are rejected.
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(content)?)
    }
}
