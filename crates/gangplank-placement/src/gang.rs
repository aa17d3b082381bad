//! Gang fit simulation.
//!
//! Answers "could the cluster absorb `count` more units of this shape right
//! now?" by reserving them one at a time on a throwaway clone of the cache.
//! The authoritative cache is never touched. A `true` answer is necessary
//! but not sufficient: the real commits that follow may land on different
//! nodes, and anything committed in between can close the window.

use tracing::debug;

use gangplank_core::ResourceRequest;

use crate::cache::ClusterResourceCache;

/// Whether `count` units of `req` can all be placed on `cache` at once.
///
/// A zero-count group always fits. A 0/0 request consumes nothing, so
/// the whole group fits exactly when one member does.
pub fn can_place_group(cache: &ClusterResourceCache, count: u32, req: &ResourceRequest) -> bool {
    if count == 0 {
        return true;
    }
    if req.cpu == 0 && req.mem == 0 {
        return cache.fits(req);
    }

    let mut working = cache.clone();
    for i in 0..count {
        if !working.subtract_any(req) {
            debug!(index = i, count, "group member does not fit, cluster is full");
            return false;
        }
    }
    true
}
