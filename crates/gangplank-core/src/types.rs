//! Domain types shared across gangplank crates.
//!
//! These types describe the cluster as the scheduler sees it: compute nodes
//! with their allocatable capacity, workload units waiting for placement,
//! and the two side effects produced for every placed unit (a binding and
//! a notification event).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a compute node.
pub type NodeId = String;

/// Name this scheduler answers to unless configured otherwise.
pub const DEFAULT_SCHEDULER_NAME: &str = "gang-scheduler";

/// Bytes per whole GB used when converting allocatable memory.
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

// ── Nodes ──────────────────────────────────────────────────────────

/// A compute node as reported by the node membership source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: NodeId,
    /// Allocatable CPU in whole cores.
    pub allocatable_cpu_cores: u64,
    /// Allocatable memory in bytes.
    pub allocatable_memory_bytes: u64,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl NodeInfo {
    /// Allocatable memory floored to whole GB.
    pub fn allocatable_memory_gb(&self) -> u64 {
        self.allocatable_memory_bytes / BYTES_PER_GB
    }
}

// ── Requests ───────────────────────────────────────────────────────

/// CPU/memory asked for by a single workload unit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResourceRequest {
    /// Whole cores.
    pub cpu: u64,
    /// Whole GB.
    pub mem: u64,
}

impl ResourceRequest {
    pub fn new(cpu: u64, mem: u64) -> Self {
        Self { cpu, mem }
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu={} mem={}G", self.cpu, self.mem)
    }
}

/// The executor group a driver needs before it may start.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRequest {
    /// Number of interchangeable executors.
    pub count: u32,
    /// Request of each executor.
    pub request: ResourceRequest,
}

// ── Workload units ─────────────────────────────────────────────────

/// Identity of a workload unit in the control plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UnitRef {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
}

impl UnitRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            uid: String::new(),
        }
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A unit observed unbound by the pending-unit source.
///
/// This is the raw shape the source hands over; the scheduler derives a
/// [`WorkloadUnit`] from its labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingUnit {
    #[serde(flatten)]
    pub unit: UnitRef,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl PendingUnit {
    pub fn new(unit: UnitRef, labels: HashMap<String, String>) -> Self {
        Self { unit, labels }
    }

    /// Whether a source should hand this unit to the named scheduler.
    ///
    /// Units already bound to a node, or addressed to another scheduler,
    /// are not ours.
    pub fn is_schedulable_by(
        scheduler_name: &str,
        requested_scheduler: &str,
        bound_node: Option<&str>,
    ) -> bool {
        bound_node.is_none_or(str::is_empty) && requested_scheduler == scheduler_name
    }
}

/// Role of a unit within a gang.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Driver,
    Executor,
    Other(String),
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value {
            "driver" => Role::Driver,
            "executor" => Role::Executor,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Driver => "driver",
            Role::Executor => "executor",
            Role::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified unit ready for a scheduling attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadUnit {
    pub unit: UnitRef,
    pub role: Role,
    pub request: ResourceRequest,
    /// Present for drivers only.
    pub group: Option<GroupRequest>,
}

// ── Outputs ────────────────────────────────────────────────────────

/// A placement decision waiting to be bound by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub unit: UnitRef,
    pub node_id: NodeId,
}

/// Severity of a notification event. Placements only ever report `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    Normal,
}

impl EventSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSeverity::Normal => "Normal",
        }
    }
}

/// A user-visible event recorded against a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub unit: UnitRef,
    pub message: String,
    pub reason: String,
    pub severity: EventSeverity,
    /// Reporting component (the scheduler name).
    pub component: String,
}

impl NotificationEvent {
    /// The event emitted alongside every binding.
    pub fn scheduled(unit: UnitRef, node_id: &str, component: &str) -> Self {
        let message = format!("Placed pod [{unit}] on {node_id}");
        Self {
            unit,
            message,
            reason: "Scheduled".to_string(),
            severity: EventSeverity::Normal,
            component: component.to_string(),
        }
    }
}
