//! gangplank-scheduler — gang-aware placement of driver/executor workloads.
//!
//! Consumes pending units, decides which node each one runs on and
//! forwards the decision to the control plane. The scheduler:
//!
//! - Waits for node membership to settle before building its cache
//! - Admits a driver only if its whole executor group fits
//! - Places every unit on the cheapest node that fits it
//! - Hands bindings and events to independent output workers
//!
//! # Architecture
//!
//! ```text
//! NodeSource ──► WarmupGate ──► ClusterResourceCache
//!                                      │ (owned)
//! pending queue ──► SchedulingPipeline ┤
//!                                      ├──► bind queue  ──► Binder  ──► BindSink
//!                                      └──► event queue ──► Emitter ──► EventSink
//! ```

use tokio::sync::watch;

pub mod collab;
pub mod error;
pub mod pipeline;
pub mod warmup;
pub mod workers;

pub use collab::{BindSink, EventSink, NodeSource};
pub use error::{RejectReason, SchedulerError, SchedulerResult};
pub use pipeline::{AttemptOutcome, OutputReceivers, Outputs, SchedulingPipeline, output_queues};
pub use warmup::WarmupGate;
pub use workers::{Binder, Emitter, WorkerStats};

/// Resolves once `rx` reads `true` or its sender is gone.
pub(crate) async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
