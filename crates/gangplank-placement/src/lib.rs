//! gangplank-placement — residual capacity cache and gang fit simulation.
//!
//! This crate decides *where* a unit goes. It does not talk to the control
//! plane or own any queues (that's `gangplank-scheduler`). It keeps the
//! per-node residual table and answers fit and placement questions on it.
//!
//! # Components
//!
//! - **`cache`** — `ClusterResourceCache` arena, fit checks, cost-based commit
//! - **`gang`** — speculative group placement on a cloned cache
//! - **`convert`** — node membership records to cache entries

pub mod cache;
pub mod convert;
pub mod error;
pub mod gang;

pub use cache::{ClusterResourceCache, NodeResources};
pub use convert::node_info_to_resources;
pub use error::{PlacementError, PlacementResult};
pub use gang::can_place_group;
