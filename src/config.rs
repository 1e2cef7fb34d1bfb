use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SolverError};

/// Search budget. Both limits are checked each time a node leaves OPEN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    #[serde(default)]
    pub max_nodes: Option<u64>,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

impl SolverConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SolverConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == Some(0) {
            return Err(SolverError::Config("max_nodes must be positive".to_string()));
        }
        if self.time_limit_ms == Some(0) {
            return Err(SolverError::Config(
                "time_limit_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        // Rounded up to whole milliseconds.
        let millis = limit.as_nanos().div_ceil(1_000_000);
        self.time_limit_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}
