//! Placement error types.

use thiserror::Error;

/// Errors raised by the resource cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("no node has capacity for cpu={cpu} mem={mem}G")]
    NoCapacityAvailable { cpu: u64, mem: u64 },

    #[error("duplicate node in listing: {0}")]
    DuplicateNode(String),
}

pub type PlacementResult<T> = Result<T, PlacementError>;
