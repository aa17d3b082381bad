//! Collaborator interfaces.
//!
//! The scheduler never talks to the control plane directly. Node listings
//! come in through a [`NodeSource`]; bindings and events go out through a
//! [`BindSink`] and an [`EventSink`]. Idempotency and retries are the
//! collaborator's business.

use async_trait::async_trait;

use gangplank_core::{Binding, NodeInfo, NotificationEvent};

/// Lists the compute nodes currently known to the cluster.
#[async_trait]
pub trait NodeSource: Send + Sync {
    async fn list_nodes(&self) -> anyhow::Result<Vec<NodeInfo>>;
}

/// Commits a placement decision to the control plane.
#[async_trait]
pub trait BindSink: Send + Sync {
    async fn bind(&self, binding: &Binding) -> anyhow::Result<()>;
}

/// Records a user-visible event against a unit.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: &NotificationEvent) -> anyhow::Result<()>;
}
