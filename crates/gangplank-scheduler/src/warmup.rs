//! Warm-up gate — wait for a stable node listing before building the cache.
//!
//! A freshly started node watch reports members as it discovers them, so an
//! early listing can be partial. The gate samples the [`NodeSource`] once
//! per poll interval and tracks a streak of consecutive samples with the
//! same number of nodes. Only the count is compared, never the members.
//! Once the streak reaches the configured length the latest sample is
//! returned.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use gangplank_core::config::{StreakPolicy, WarmupSettings};
use gangplank_core::NodeInfo;

use crate::collab::NodeSource;
use crate::error::{SchedulerError, SchedulerResult};
use crate::shutdown_requested;

/// Blocks startup until node membership has settled.
#[derive(Debug, Clone)]
pub struct WarmupGate {
    poll_interval: Duration,
    required_streak: u32,
    policy: StreakPolicy,
}

impl Default for WarmupGate {
    fn default() -> Self {
        Self::from(&WarmupSettings::default())
    }
}

impl From<&WarmupSettings> for WarmupGate {
    fn from(settings: &WarmupSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            required_streak: settings.required_streak,
            policy: settings.streak_policy,
        }
    }
}

impl WarmupGate {
    pub fn new(poll_interval: Duration, required_streak: u32, policy: StreakPolicy) -> Self {
        Self {
            poll_interval,
            required_streak,
            policy,
        }
    }

    /// Sample `source` until its node count is stable, then return the
    /// latest listing.
    ///
    /// A failed sample is logged and skipped; it neither extends nor breaks
    /// the streak. Returns [`SchedulerError::Cancelled`] if `shutdown`
    /// fires while waiting between samples.
    pub async fn await_stable_membership(
        &self,
        source: &dyn NodeSource,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SchedulerResult<Vec<NodeInfo>> {
        let mut previous: Option<usize> = None;
        let mut streak: u32 = 0;
        let mut samples: u32 = 0;

        loop {
            match source.list_nodes().await {
                Ok(nodes) => {
                    samples += 1;
                    let count = nodes.len();
                    streak = match previous {
                        None => 1,
                        Some(p) if p == count => streak + 1,
                        Some(_) => match self.policy {
                            StreakPolicy::ResetOnMismatch => 1,
                            StreakPolicy::Accumulate => streak,
                        },
                    };
                    previous = Some(count);

                    if streak >= self.required_streak {
                        info!(nodes = count, samples, "node membership stable");
                        return Ok(nodes);
                    }
                    debug!(nodes = count, streak, required = self.required_streak, "warming node source");
                }
                Err(e) => {
                    warn!(error = %e, "node listing failed during warm-up");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown_requested(shutdown) => {
                    info!("warm-up cancelled");
                    return Err(SchedulerError::Cancelled);
                }
            }
        }
    }
}
