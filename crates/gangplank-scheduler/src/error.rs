//! Scheduler error types.

use std::fmt;

use thiserror::Error;

use gangplank_metrics::Outcome;
use gangplank_placement::PlacementError;

/// Errors that stop a scheduler component or are reported by a worker.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("shutdown requested")]
    Cancelled,

    #[error("{0} queue closed")]
    QueueClosed(&'static str),

    #[error("bind failed: {0}")]
    BindFailed(String),

    #[error("event emit failed: {0}")]
    EventEmitFailed(String),

    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Why a scheduling attempt did not place its unit.
///
/// Rejections are final for the attempt; the unit is not re-queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A driver, or its executor group, does not currently fit.
    InsufficientClusterCapacity,
    /// The commit found no qualifying node.
    NoCapacityAvailable,
    /// The unit's role is neither driver nor executor.
    UnsupportedRole(String),
}

impl RejectReason {
    pub fn outcome(&self) -> Outcome {
        match self {
            RejectReason::InsufficientClusterCapacity => Outcome::InsufficientClusterCapacity,
            RejectReason::NoCapacityAvailable => Outcome::NoCapacityAvailable,
            RejectReason::UnsupportedRole(_) => Outcome::UnsupportedRole,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InsufficientClusterCapacity => f.write_str("insufficient cluster capacity"),
            RejectReason::NoCapacityAvailable => f.write_str("no capacity available"),
            RejectReason::UnsupportedRole(role) => write!(f, "unsupported role {role:?}"),
        }
    }
}
