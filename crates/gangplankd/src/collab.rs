//! Static collaborators for running without a live control plane.
//!
//! Nodes come from the configuration file; bindings and events are written
//! to the log and counted.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use gangplank_core::{Binding, GangplankConfig, NodeInfo, NotificationEvent};
use gangplank_scheduler::{BindSink, EventSink, NodeSource};

/// Serves a fixed node inventory.
#[derive(Debug, Clone, Default)]
pub struct StaticNodeSource {
    nodes: Vec<NodeInfo>,
}

impl StaticNodeSource {
    pub fn new(nodes: Vec<NodeInfo>) -> Self {
        Self { nodes }
    }

    pub fn from_config(config: &GangplankConfig) -> Self {
        Self::new(config.node_infos())
    }
}

#[async_trait]
impl NodeSource for StaticNodeSource {
    async fn list_nodes(&self) -> anyhow::Result<Vec<NodeInfo>> {
        Ok(self.nodes.clone())
    }
}

/// Logs every binding instead of posting it.
#[derive(Debug, Default)]
pub struct LoggingBindSink {
    bound: AtomicU64,
}

impl LoggingBindSink {
    pub fn count(&self) -> u64 {
        self.bound.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BindSink for LoggingBindSink {
    async fn bind(&self, binding: &Binding) -> anyhow::Result<()> {
        info!(
            unit = %binding.unit,
            uid = %binding.unit.uid,
            node = %binding.node_id,
            "bind"
        );
        self.bound.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Logs every notification event instead of recording it.
#[derive(Debug, Default)]
pub struct LoggingEventSink {
    emitted: AtomicU64,
}

impl LoggingEventSink {
    pub fn count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &NotificationEvent) -> anyhow::Result<()> {
        info!(
            unit = %event.unit,
            reason = %event.reason,
            severity = event.severity.as_str(),
            component = %event.component,
            message = %event.message,
            "event"
        );
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
