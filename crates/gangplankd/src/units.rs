//! JSON-lines unit feed.
//!
//! Each non-empty line is one pending unit:
//!
//! ```text
//! {"namespace":"spark","name":"pi-driver","labels":{"spark-role":"driver","driver-cpu":"1"}}
//! ```
//!
//! Optional `scheduler_name` and `node_name` fields carry the admission
//! filter inputs; a unit that is already bound or addressed to a different
//! scheduler is skipped. Lines starting with `#` are comments.

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use gangplank_core::PendingUnit;

#[derive(Debug, Deserialize)]
struct UnitRecord {
    #[serde(flatten)]
    pending: PendingUnit,
    #[serde(default)]
    scheduler_name: Option<String>,
    #[serde(default)]
    node_name: Option<String>,
}

/// Line counts reported when the feed ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub accepted: u64,
    pub skipped: u64,
    pub malformed: u64,
}

/// Read units from `reader` into `queue` until end of input, shutdown, or
/// the queue closing. Dropping `queue` on return closes the pending queue.
pub async fn feed_units<R>(
    reader: R,
    scheduler_name: &str,
    queue: mpsc::Sender<PendingUnit>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = FeedStats::default();
    let mut line_no: u64 = 0;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };
        line_no += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record: UnitRecord = match serde_json::from_str(trimmed) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no, error = %e, "malformed unit record skipped");
                stats.malformed += 1;
                continue;
            }
        };

        let requested = record.scheduler_name.as_deref().unwrap_or(scheduler_name);
        if !PendingUnit::is_schedulable_by(scheduler_name, requested, record.node_name.as_deref()) {
            debug!(unit = %record.pending.unit, requested, "unit not ours, skipped");
            stats.skipped += 1;
            continue;
        }

        if queue.send(record.pending).await.is_err() {
            warn!("pending queue closed, unit feed stopping");
            break;
        }
        stats.accepted += 1;
    }

    info!(
        accepted = stats.accepted,
        skipped = stats.skipped,
        malformed = stats.malformed,
        "unit feed finished"
    );
    Ok(stats)
}
