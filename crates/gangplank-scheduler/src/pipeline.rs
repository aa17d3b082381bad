//! Scheduling pipeline — the single control loop that places units.
//!
//! The pipeline pulls one pending unit at a time, classifies it, consults
//! the cache (and the gang simulator for drivers), commits the placement
//! and hands the resulting binding and event to two output queues drained
//! by independent workers.
//!
//! The pipeline owns the [`ClusterResourceCache`] by value and `run`
//! consumes the pipeline, so exactly one task can ever mutate the cache.
//! No lock guards it.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use gangplank_core::{
    Binding, DEFAULT_SCHEDULER_NAME, NodeId, NotificationEvent, PendingUnit, Role, UnitRef,
    WorkloadUnit, decode_unit,
};
use gangplank_metrics::{Outcome, SchedulerMetrics};
use gangplank_placement::{ClusterResourceCache, PlacementError, can_place_group};

use crate::error::{RejectReason, SchedulerError, SchedulerResult};
use crate::shutdown_requested;

/// Sending halves of the bind and event queues.
pub struct Outputs {
    pub bindings: mpsc::Sender<Binding>,
    pub events: mpsc::Sender<NotificationEvent>,
}

/// Receiving halves, one per output worker.
pub struct OutputReceivers {
    pub bindings: mpsc::Receiver<Binding>,
    pub events: mpsc::Receiver<NotificationEvent>,
}

/// Create the two bounded output queues.
pub fn output_queues(capacity: usize) -> (Outputs, OutputReceivers) {
    let (bind_tx, bind_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = mpsc::channel(capacity);
    (
        Outputs {
            bindings: bind_tx,
            events: event_tx,
        },
        OutputReceivers {
            bindings: bind_rx,
            events: event_rx,
        },
    )
}

/// Result of one scheduling attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Scheduled { unit: UnitRef, node_id: NodeId },
    Rejected { unit: UnitRef, reason: RejectReason },
}

impl AttemptOutcome {
    fn metric(&self) -> Outcome {
        match self {
            AttemptOutcome::Scheduled { .. } => Outcome::Scheduled,
            AttemptOutcome::Rejected { reason, .. } => reason.outcome(),
        }
    }
}

/// The scheduling worker.
pub struct SchedulingPipeline {
    cache: ClusterResourceCache,
    pending: mpsc::Receiver<PendingUnit>,
    outputs: Outputs,
    metrics: Arc<SchedulerMetrics>,
    /// Reported as the event source component.
    component: String,
}

impl SchedulingPipeline {
    pub fn new(
        cache: ClusterResourceCache,
        pending: mpsc::Receiver<PendingUnit>,
        outputs: Outputs,
        metrics: Arc<SchedulerMetrics>,
    ) -> Self {
        Self {
            cache,
            pending,
            outputs,
            metrics,
            component: DEFAULT_SCHEDULER_NAME.to_string(),
        }
    }

    /// Set the component name stamped on emitted events.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// The authoritative residual table.
    pub fn cache(&self) -> &ClusterResourceCache {
        &self.cache
    }

    /// Run attempts back to back until the pending queue closes or
    /// `shutdown` fires. Returns the final cache.
    ///
    /// Stops with [`SchedulerError::QueueClosed`] if an output worker has
    /// gone away. Once shutdown is requested the workers may leave first,
    /// so a closed output queue is then a clean stop.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> SchedulerResult<ClusterResourceCache> {
        info!(nodes = self.cache.len(), "scheduling pipeline started");

        loop {
            let pending = tokio::select! {
                biased;

                _ = shutdown_requested(&mut shutdown) => {
                    info!("scheduling pipeline shutting down");
                    break;
                }
                next = self.pending.recv() => match next {
                    Some(unit) => unit,
                    None => {
                        info!("pending queue closed, pipeline stopping");
                        break;
                    }
                },
            };

            match self.schedule_one(pending).await {
                Ok(_) => {}
                Err(SchedulerError::QueueClosed(queue)) => {
                    let stopping = *shutdown.borrow();
                    if !stopping {
                        return Err(SchedulerError::QueueClosed(queue));
                    }
                    info!(queue, "output queue closed during shutdown, pipeline stopping");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(self.cache)
    }

    /// Run one attempt for `pending` and record its latency.
    pub async fn schedule_one(&mut self, pending: PendingUnit) -> SchedulerResult<AttemptOutcome> {
        let start = Instant::now();
        debug!(unit = %pending.unit, "attempting to schedule");

        let decoded = decode_unit(&pending);
        if !decoded.defaults.is_empty() {
            let defaults: Vec<String> = decoded.defaults.iter().map(ToString::to_string).collect();
            warn!(
                unit = %pending.unit,
                defaults = %defaults.join(", "),
                "resource labels defaulted"
            );
            self.metrics.record_label_defaults(decoded.defaults.len());
        }

        let outcome = self.attempt(&decoded.unit).await?;
        let elapsed = start.elapsed();
        self.metrics.record_attempt(outcome.metric(), elapsed);

        match &outcome {
            AttemptOutcome::Scheduled { unit, node_id } => {
                info!(
                    %unit,
                    node = %node_id,
                    elapsed_us = elapsed.as_micros() as u64,
                    "unit scheduled"
                );
            }
            AttemptOutcome::Rejected { unit, reason } => {
                warn!(%unit, %reason, "unit rejected");
            }
        }
        Ok(outcome)
    }

    async fn attempt(&mut self, unit: &WorkloadUnit) -> SchedulerResult<AttemptOutcome> {
        let reject = |reason| {
            Ok(AttemptOutcome::Rejected {
                unit: unit.unit.clone(),
                reason,
            })
        };

        match &unit.role {
            Role::Driver => {
                let group = unit.group.unwrap_or_default();
                let driver_fits = self.cache.fits(&unit.request);
                if !driver_fits || !can_place_group(&self.cache, group.count, &group.request) {
                    debug!(
                        unit = %unit.unit,
                        driver_fits,
                        executors = group.count,
                        "job does not fit into the cluster"
                    );
                    return reject(RejectReason::InsufficientClusterCapacity);
                }
            }
            Role::Executor => {}
            Role::Other(role) => return reject(RejectReason::UnsupportedRole(role.clone())),
        }

        // Hold a slot in both queues before committing, so a placement is
        // either fully forwarded or not made at all.
        let bind_slot = self
            .outputs
            .bindings
            .reserve()
            .await
            .map_err(|_| SchedulerError::QueueClosed("bind"))?;
        let event_slot = self
            .outputs
            .events
            .reserve()
            .await
            .map_err(|_| SchedulerError::QueueClosed("event"))?;

        let node_id = match self.cache.commit_best(&unit.request) {
            Ok(node_id) => node_id,
            Err(PlacementError::NoCapacityAvailable { .. }) => {
                return reject(RejectReason::NoCapacityAvailable);
            }
            Err(e) => return Err(e.into()),
        };

        bind_slot.send(Binding {
            unit: unit.unit.clone(),
            node_id: node_id.clone(),
        });
        event_slot.send(NotificationEvent::scheduled(
            unit.unit.clone(),
            &node_id,
            &self.component,
        ));

        Ok(AttemptOutcome::Scheduled {
            unit: unit.unit.clone(),
            node_id,
        })
    }
}
