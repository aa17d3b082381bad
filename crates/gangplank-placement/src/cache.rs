//! Cluster resource cache — residual capacity per node.
//!
//! The cache is an arena: a contiguous table of [`NodeResources`] kept in
//! ascending node-id order, plus an id → slot index. Residuals only ever
//! move downward, and only through [`ClusterResourceCache::commit_best`]
//! (or [`ClusterResourceCache::subtract_any`] on a speculative clone).
//!
//! Every placement predicate is strict: a node qualifies for a request only
//! if it keeps at least one core and one GB free afterwards. That unit of
//! headroom per dimension is reserved for the node agent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gangplank_core::{NodeId, ResourceRequest};

use crate::error::{PlacementError, PlacementResult};

/// Residual capacity and preference cost of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResources {
    pub id: NodeId,
    /// Unreserved cores.
    pub cpu_free: u64,
    /// Unreserved memory in whole GB.
    pub mem_free: u64,
    /// Static preference weight, lower is preferred.
    pub cost: u64,
}

impl NodeResources {
    pub fn new(id: impl Into<NodeId>, cpu_free: u64, mem_free: u64, cost: u64) -> Self {
        Self {
            id: id.into(),
            cpu_free,
            mem_free,
            cost,
        }
    }

    /// Whether this node can take `req` and keep one unit of headroom.
    pub fn admits(&self, req: &ResourceRequest) -> bool {
        self.cpu_free > req.cpu && self.mem_free > req.mem
    }

    /// Reserve `req` on this node. Callers check [`admits`](Self::admits) first.
    fn reserve(&mut self, req: &ResourceRequest) {
        self.cpu_free -= req.cpu;
        self.mem_free -= req.mem;
    }
}

/// The authoritative residual-capacity table.
///
/// Owned by exactly one scheduling loop; `Clone` produces an independent
/// deep copy for speculative simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterResourceCache {
    /// Slots in ascending node-id order.
    slots: Vec<NodeResources>,
    index: HashMap<NodeId, usize>,
}

impl ClusterResourceCache {
    /// Build a cache from a node listing.
    ///
    /// Fails with [`PlacementError::DuplicateNode`] if two entries share an id.
    pub fn from_nodes<I>(nodes: I) -> PlacementResult<Self>
    where
        I: IntoIterator<Item = NodeResources>,
    {
        let mut slots: Vec<NodeResources> = nodes.into_iter().collect();
        slots.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index = HashMap::with_capacity(slots.len());
        for (i, node) in slots.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(PlacementError::DuplicateNode(node.id.clone()));
            }
        }

        Ok(Self { slots, index })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up a node by id.
    pub fn get(&self, node_id: &str) -> Option<&NodeResources> {
        self.index.get(node_id).map(|&i| &self.slots[i])
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeResources> {
        self.slots.iter()
    }

    /// True iff at least one node admits `req`. Never mutates.
    pub fn fits(&self, req: &ResourceRequest) -> bool {
        self.slots.iter().any(|n| n.admits(req))
    }

    /// Place `req` on the cheapest admitting node and reserve it there.
    ///
    /// Candidates are ordered by `cost`, then by node id. When nothing
    /// admits the request the cache is left exactly as it was.
    pub fn commit_best(&mut self, req: &ResourceRequest) -> PlacementResult<NodeId> {
        let best = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, n)| n.admits(req))
            .min_by(|(_, a), (_, b)| a.cost.cmp(&b.cost).then_with(|| a.id.cmp(&b.id)))
            .map(|(i, _)| i);

        let Some(slot) = best else {
            return Err(PlacementError::NoCapacityAvailable {
                cpu: req.cpu,
                mem: req.mem,
            });
        };

        let node = &mut self.slots[slot];
        node.reserve(req);
        debug!(
            node = %node.id,
            cost = node.cost,
            cpu_free = node.cpu_free,
            mem_free = node.mem_free,
            "reserved {req}"
        );
        Ok(node.id.clone())
    }

    /// Reserve `req` on the first admitting node in id order, ignoring cost.
    ///
    /// This is a feasibility probe for the gang simulator and is meant to be
    /// called on a clone. Returns `false` without mutating when no node
    /// admits the request.
    pub fn subtract_any(&mut self, req: &ResourceRequest) -> bool {
        match self.slots.iter_mut().find(|n| n.admits(req)) {
            Some(node) => {
                node.reserve(req);
                true
            }
            None => false,
        }
    }
}
