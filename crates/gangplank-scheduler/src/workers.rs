//! Output workers — drain the bind and event queues.
//!
//! Each worker runs on its own task so a slow control plane never stalls
//! the scheduling pipeline beyond the queue's capacity. Failures are
//! logged and counted; nothing is retried.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use gangplank_core::{Binding, NotificationEvent};

use crate::collab::{BindSink, EventSink};
use crate::error::SchedulerError;
use crate::shutdown_requested;

/// Delivery counts reported when a worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Forwards bindings to a [`BindSink`].
pub struct Binder {
    queue: mpsc::Receiver<Binding>,
    sink: Arc<dyn BindSink>,
}

impl Binder {
    pub fn new(queue: mpsc::Receiver<Binding>, sink: Arc<dyn BindSink>) -> Self {
        Self { queue, sink }
    }

    /// Deliver bindings in queue order until the queue closes or
    /// `shutdown` fires.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        info!("binder started");

        loop {
            let binding = tokio::select! {
                next = self.queue.recv() => match next {
                    Some(binding) => binding,
                    None => break,
                },
                _ = shutdown_requested(&mut shutdown) => break,
            };

            match self.sink.bind(&binding).await {
                Ok(()) => {
                    debug!(unit = %binding.unit, node = %binding.node_id, "binding committed");
                    stats.delivered += 1;
                }
                Err(e) => {
                    let err = SchedulerError::BindFailed(format!("{e:#}"));
                    error!(unit = %binding.unit, node = %binding.node_id, error = %err, "binding dropped");
                    stats.failed += 1;
                }
            }
        }

        info!(delivered = stats.delivered, failed = stats.failed, "binder stopped");
        stats
    }
}

/// Forwards notification events to an [`EventSink`].
pub struct Emitter {
    queue: mpsc::Receiver<NotificationEvent>,
    sink: Arc<dyn EventSink>,
}

impl Emitter {
    pub fn new(queue: mpsc::Receiver<NotificationEvent>, sink: Arc<dyn EventSink>) -> Self {
        Self { queue, sink }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        info!("emitter started");

        loop {
            let event = tokio::select! {
                next = self.queue.recv() => match next {
                    Some(event) => event,
                    None => break,
                },
                _ = shutdown_requested(&mut shutdown) => break,
            };

            match self.sink.emit(&event).await {
                Ok(()) => stats.delivered += 1,
                Err(e) => {
                    let err = SchedulerError::EventEmitFailed(format!("{e:#}"));
                    error!(unit = %event.unit, reason = %event.reason, error = %err, "event dropped");
                    stats.failed += 1;
                }
            }
        }

        info!(delivered = stats.delivered, failed = stats.failed, "emitter stopped");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gangplank_core::UnitRef;

    /// Records bindings and fails for unit names listed in `reject`.
    #[derive(Default)]
    struct RecordingBindSink {
        seen: Mutex<Vec<Binding>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl BindSink for RecordingBindSink {
        async fn bind(&self, binding: &Binding) -> anyhow::Result<()> {
            if self.reject.contains(&binding.unit.name) {
                anyhow::bail!("unit {} already bound", binding.unit);
            }
            self.seen.lock().unwrap().push(binding.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingEventSink {
        seen: Mutex<Vec<NotificationEvent>>,
        fail_all: bool,
    }

    #[async_trait]
    impl EventSink for RecordingEventSink {
        async fn emit(&self, event: &NotificationEvent) -> anyhow::Result<()> {
            if self.fail_all {
                anyhow::bail!("event api unavailable");
            }
            self.seen.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn binding(name: &str, node: &str) -> Binding {
        Binding {
            unit: UnitRef::new("spark", name),
            node_id: node.to_string(),
        }
    }

    #[tokio::test]
    async fn binder_delivers_in_order_until_queue_closes() {
        let sink = Arc::new(RecordingBindSink::default());
        let (tx, rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(binding("a", "n1")).await.unwrap();
        tx.send(binding("b", "n2")).await.unwrap();
        drop(tx);

        let stats = Binder::new(rx, sink.clone()).run(shutdown_rx).await;

        assert_eq!(stats, WorkerStats { delivered: 2, failed: 0 });
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].unit.name, "a");
        assert_eq!(seen[1].node_id, "n2");
    }

    #[tokio::test]
    async fn binder_failure_does_not_stop_the_worker() {
        let sink = Arc::new(RecordingBindSink {
            reject: vec!["bad".to_string()],
            ..Default::default()
        });
        let (tx, rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(binding("bad", "n1")).await.unwrap();
        tx.send(binding("good", "n1")).await.unwrap();
        drop(tx);

        let stats = Binder::new(rx, sink.clone()).run(shutdown_rx).await;

        assert_eq!(stats, WorkerStats { delivered: 1, failed: 1 });
        assert_eq!(sink.seen.lock().unwrap()[0].unit.name, "good");
    }

    #[tokio::test]
    async fn binder_stops_on_shutdown() {
        let sink = Arc::new(RecordingBindSink::default());
        let (_tx, rx) = mpsc::channel::<Binding>(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(Binder::new(rx, sink).run(shutdown_rx));
        shutdown_tx.send(true).unwrap();

        assert_eq!(handle.await.unwrap(), WorkerStats::default());
    }

    #[tokio::test]
    async fn emitter_delivers_events() {
        let sink = Arc::new(RecordingEventSink::default());
        let (tx, rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(NotificationEvent::scheduled(
            UnitRef::new("spark", "a"),
            "n1",
            "gang-scheduler",
        ))
        .await
        .unwrap();
        drop(tx);

        let stats = Emitter::new(rx, sink.clone()).run(shutdown_rx).await;

        assert_eq!(stats.delivered, 1);
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen[0].reason, "Scheduled");
        assert_eq!(seen[0].message, "Placed pod [spark/a] on n1");
    }

    #[tokio::test]
    async fn emitter_failures_are_counted() {
        let sink = Arc::new(RecordingEventSink {
            fail_all: true,
            ..Default::default()
        });
        let (tx, rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        for name in ["a", "b"] {
            tx.send(NotificationEvent::scheduled(UnitRef::new("spark", name), "n1", "x"))
                .await
                .unwrap();
        }
        drop(tx);

        let stats = Emitter::new(rx, sink).run(shutdown_rx).await;
        assert_eq!(stats, WorkerStats { delivered: 0, failed: 2 });
    }
}
