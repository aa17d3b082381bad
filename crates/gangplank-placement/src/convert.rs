//! Conversions from membership records to cache entries.
//!
//! Bridges `gangplank_core::NodeInfo` (as the node source reports it) to
//! the cache's [`NodeResources`].

use tracing::warn;

use gangplank_core::labels::{self, DefaultCause};
use gangplank_core::NodeInfo;

use crate::cache::{ClusterResourceCache, NodeResources};
use crate::error::PlacementResult;

/// Convert a [`NodeInfo`] to [`NodeResources`].
///
/// Memory is floored to whole GB. The cost comes from the `cost` label; a
/// missing label means cost 0, an unparsable one is logged and also read
/// as 0.
pub fn node_info_to_resources(node: &NodeInfo) -> NodeResources {
    let cost = match labels::decode_u64(&node.labels, labels::NODE_COST) {
        Ok(cost) => cost,
        Err(d) => {
            if let DefaultCause::Unparsable(_) = d.cause {
                warn!(node = %node.name, "cost label {d}, using 0");
            }
            0
        }
    };

    NodeResources {
        id: node.name.clone(),
        cpu_free: node.allocatable_cpu_cores,
        mem_free: node.allocatable_memory_gb(),
        cost,
    }
}

impl ClusterResourceCache {
    /// Build the cache from a stable node listing.
    pub fn from_node_infos(nodes: &[NodeInfo]) -> PlacementResult<Self> {
        Self::from_nodes(nodes.iter().map(node_info_to_resources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use gangplank_core::BYTES_PER_GB;

    fn sample_node(name: &str, cost: Option<&str>) -> NodeInfo {
        let mut labels = HashMap::new();
        labels.insert("zone".to_string(), "eu-1".to_string());
        if let Some(c) = cost {
            labels.insert("cost".to_string(), c.to_string());
        }
        NodeInfo {
            name: name.to_string(),
            allocatable_cpu_cores: 8,
            allocatable_memory_bytes: 16 * BYTES_PER_GB + 512 * 1024 * 1024,
            labels,
        }
    }

    #[test]
    fn converts_node_info_fields() {
        let res = node_info_to_resources(&sample_node("node-1", Some("3")));

        assert_eq!(res.id, "node-1");
        assert_eq!(res.cpu_free, 8);
        assert_eq!(res.mem_free, 16);
        assert_eq!(res.cost, 3);
    }

    #[test]
    fn missing_cost_is_zero() {
        assert_eq!(node_info_to_resources(&sample_node("n", None)).cost, 0);
    }

    #[test]
    fn garbage_cost_is_zero() {
        assert_eq!(node_info_to_resources(&sample_node("n", Some("cheap"))).cost, 0);
        assert_eq!(node_info_to_resources(&sample_node("n", Some("-2"))).cost, 0);
    }

    #[test]
    fn builds_cache_from_listing() {
        let nodes = vec![sample_node("b", Some("1")), sample_node("a", None)];
        let cache = ClusterResourceCache::from_node_infos(&nodes).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().cost, 0);
        assert_eq!(cache.get("b").unwrap().cost, 1);
    }

    #[test]
    fn sub_gb_node_has_no_memory() {
        let node = NodeInfo {
            name: "tiny".to_string(),
            allocatable_cpu_cores: 2,
            allocatable_memory_bytes: BYTES_PER_GB - 1,
            labels: HashMap::new(),
        };
        let cache = ClusterResourceCache::from_node_infos(&[node]).unwrap();
        assert!(!cache.fits(&gangplank_core::ResourceRequest::new(0, 0)));
    }
}
