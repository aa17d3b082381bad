//! Daemon assembly — wires the warm-up gate, pipeline, workers and unit
//! feed together and runs them to completion.

use std::sync::Arc;

use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, watch};
use tracing::info;

use gangplank_core::GangplankConfig;
use gangplank_metrics::SchedulerMetrics;
use gangplank_placement::ClusterResourceCache;
use gangplank_scheduler::{
    BindSink, Binder, Emitter, EventSink, NodeSource, SchedulingPipeline, WarmupGate, WorkerStats,
    output_queues,
};

use crate::collab::{LoggingBindSink, LoggingEventSink, StaticNodeSource};
use crate::units::{FeedStats, feed_units};

/// What the daemon did before it stopped.
#[derive(Debug)]
pub struct DaemonReport {
    pub final_cache: ClusterResourceCache,
    pub feed: FeedStats,
    pub binder: WorkerStats,
    pub emitter: WorkerStats,
}

/// A configured scheduler and its collaborators.
pub struct Daemon {
    config: GangplankConfig,
    node_source: Arc<dyn NodeSource>,
    bind_sink: Arc<dyn BindSink>,
    event_sink: Arc<dyn EventSink>,
    metrics: Arc<SchedulerMetrics>,
}

impl Daemon {
    /// A daemon backed by the static collaborators.
    pub fn new(config: GangplankConfig) -> Self {
        let node_source = Arc::new(StaticNodeSource::from_config(&config));
        Self {
            config,
            node_source,
            bind_sink: Arc::new(LoggingBindSink::default()),
            event_sink: Arc::new(LoggingEventSink::default()),
            metrics: Arc::new(SchedulerMetrics::new()),
        }
    }

    pub fn with_node_source(mut self, source: Arc<dyn NodeSource>) -> Self {
        self.node_source = source;
        self
    }

    pub fn with_bind_sink(mut self, sink: Arc<dyn BindSink>) -> Self {
        self.bind_sink = sink;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Shared handle to the metrics the pipeline records into.
    pub fn metrics(&self) -> Arc<SchedulerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Warm up, then schedule units read from `units` until the stream ends
    /// or `shutdown` fires.
    pub async fn run<R>(self, units: R, shutdown: watch::Receiver<bool>) -> anyhow::Result<DaemonReport>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let capacity = self.config.queue_capacity;
        let scheduler_name = self.config.scheduler_name.clone();

        // ── Warm-up ────────────────────────────────────────────────

        let gate = WarmupGate::from(&self.config.warmup);
        let nodes = gate
            .await_stable_membership(self.node_source.as_ref(), &mut shutdown.clone())
            .await?;
        let cache = ClusterResourceCache::from_node_infos(&nodes)?;
        info!(nodes = cache.len(), %scheduler_name, "resource cache built");

        // ── Queues and tasks ───────────────────────────────────────

        let (pending_tx, pending_rx) = mpsc::channel(capacity);
        let (outputs, receivers) = output_queues(capacity);

        let pipeline = SchedulingPipeline::new(cache, pending_rx, outputs, Arc::clone(&self.metrics))
            .with_component(scheduler_name.clone());

        let pipeline_handle = tokio::spawn(pipeline.run(shutdown.clone()));
        let binder_handle = tokio::spawn(
            Binder::new(receivers.bindings, self.bind_sink).run(shutdown.clone()),
        );
        let emitter_handle = tokio::spawn(
            Emitter::new(receivers.events, self.event_sink).run(shutdown.clone()),
        );
        let feed_shutdown = shutdown.clone();
        let feed_handle = tokio::spawn(async move {
            feed_units(units, &scheduler_name, pending_tx, feed_shutdown).await
        });

        // ── Drain ──────────────────────────────────────────────────

        // The pipeline ends once the feed drops the pending sender; the
        // workers end once the pipeline drops the output senders.
        let final_cache = pipeline_handle.await??;
        let feed = feed_handle.await??;
        let binder = binder_handle.await?;
        let emitter = emitter_handle.await?;

        info!(
            scheduled = binder.delivered + binder.failed,
            bind_failures = binder.failed,
            event_failures = emitter.failed,
            "daemon drained"
        );

        Ok(DaemonReport {
            final_cache,
            feed,
            binder,
            emitter,
        })
    }
}
