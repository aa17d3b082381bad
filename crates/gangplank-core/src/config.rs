//! gangplank.toml configuration parser.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{DEFAULT_SCHEDULER_NAME, NodeInfo};

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GangplankConfig {
    /// Units are only taken if they name this scheduler.
    pub scheduler_name: String,
    /// Capacity of each of the pending, bind and event queues.
    pub queue_capacity: usize,
    pub warmup: WarmupSettings,
    pub metrics: MetricsSettings,
    /// Static node inventory used by the standalone node source.
    pub nodes: Vec<NodeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupSettings {
    pub poll_interval_ms: u64,
    pub required_streak: u32,
    pub streak_policy: StreakPolicy,
}

/// What happens to the warm-up streak when two samples differ in size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// Any fluctuation restarts the count.
    #[default]
    ResetOnMismatch,
    /// Fluctuations are ignored; equal pairs keep accumulating.
    Accumulate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Address the `/metrics` endpoint listens on.
    pub listen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    /// Allocatable cores.
    pub cpu: u64,
    /// Allocatable memory in bytes.
    pub memory_bytes: u64,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Default for GangplankConfig {
    fn default() -> Self {
        Self {
            scheduler_name: DEFAULT_SCHEDULER_NAME.to_string(),
            queue_capacity: 300,
            warmup: WarmupSettings::default(),
            metrics: MetricsSettings::default(),
            nodes: Vec::new(),
        }
    }
}

impl Default for WarmupSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            required_streak: 4,
            streak_policy: StreakPolicy::default(),
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:2112".to_string(),
        }
    }
}

impl WarmupSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl From<&NodeEntry> for NodeInfo {
    fn from(entry: &NodeEntry) -> Self {
        NodeInfo {
            name: entry.name.clone(),
            allocatable_cpu_cores: entry.cpu,
            allocatable_memory_bytes: entry.memory_bytes,
            labels: entry.labels.clone(),
        }
    }
}

impl GangplankConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GangplankConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler_name.is_empty() {
            return Err(ConfigError::Invalid("scheduler_name must not be empty".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be positive".into()));
        }
        if self.warmup.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("warmup.poll_interval_ms must be positive".into()));
        }
        if self.warmup.required_streak == 0 {
            return Err(ConfigError::Invalid("warmup.required_streak must be positive".into()));
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate node: {}", node.name)));
            }
        }
        Ok(())
    }

    /// The static node inventory as membership records.
    pub fn node_infos(&self) -> Vec<NodeInfo> {
        self.nodes.iter().map(NodeInfo::from).collect()
    }
}
