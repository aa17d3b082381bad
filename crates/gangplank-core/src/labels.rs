//! Label decoding for nodes and workload units.
//!
//! Resource requests travel as plain integer labels on the unit. A missing
//! or unparsable label decodes to zero, which makes the unit look smaller
//! than it is (a 0/0 request always fits). An executor count beyond `u32`
//! is clamped to `u32::MAX`. Every such fallback is returned as a
//! [`LabelDefault`] so callers can log and count it.

use std::collections::HashMap;
use std::fmt;

use crate::types::{GroupRequest, PendingUnit, ResourceRequest, Role, WorkloadUnit};

/// Node label carrying the static preference cost.
pub const NODE_COST: &str = "cost";
/// Unit label carrying the gang role.
pub const ROLE: &str = "spark-role";
pub const DRIVER_CPU: &str = "driver-cpu";
pub const DRIVER_MEM: &str = "driver-mem";
/// Executor count of a driver's group.
pub const EXECUTOR_COUNT: &str = "executors";
pub const EXECUTOR_CPU: &str = "exec-cpu";
pub const EXECUTOR_MEM: &str = "exec-mem";

/// Why a label did not decode to its literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultCause {
    /// Absent; read as 0.
    Missing,
    /// Not an unsigned integer; read as 0.
    Unparsable(String),
    /// Parsed, but out of range for its field; clamped to the maximum.
    Clamped(u64),
}

/// A label that decoded to a fallback value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDefault {
    pub key: &'static str,
    pub cause: DefaultCause,
}

impl fmt::Display for LabelDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            DefaultCause::Missing => write!(f, "{} missing", self.key),
            DefaultCause::Unparsable(raw) => write!(f, "{}={raw:?} unparsable", self.key),
            DefaultCause::Clamped(value) => write!(f, "{}={value} out of range, clamped", self.key),
        }
    }
}

/// Decode an unsigned integer label, falling back to zero.
pub fn decode_u64(
    labels: &HashMap<String, String>,
    key: &'static str,
) -> Result<u64, LabelDefault> {
    match labels.get(key) {
        None => Err(LabelDefault {
            key,
            cause: DefaultCause::Missing,
        }),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| LabelDefault {
            key,
            cause: DefaultCause::Unparsable(raw.clone()),
        }),
    }
}

/// Collects fallbacks while decoding a set of labels.
struct Decoder<'a> {
    labels: &'a HashMap<String, String>,
    defaults: Vec<LabelDefault>,
}

impl<'a> Decoder<'a> {
    fn new(labels: &'a HashMap<String, String>) -> Self {
        Self {
            labels,
            defaults: Vec::new(),
        }
    }

    fn u64(&mut self, key: &'static str) -> u64 {
        decode_u64(self.labels, key).unwrap_or_else(|d| {
            self.defaults.push(d);
            0
        })
    }

    fn count(&mut self, key: &'static str) -> u32 {
        let value = self.u64(key);
        u32::try_from(value).unwrap_or_else(|_| {
            self.defaults.push(LabelDefault {
                key,
                cause: DefaultCause::Clamped(value),
            });
            u32::MAX
        })
    }

    fn request(&mut self, cpu_key: &'static str, mem_key: &'static str) -> ResourceRequest {
        ResourceRequest {
            cpu: self.u64(cpu_key),
            mem: self.u64(mem_key),
        }
    }
}

/// Result of decoding a pending unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub unit: WorkloadUnit,
    /// Labels that fell back to a default or were clamped.
    pub defaults: Vec<LabelDefault>,
}

/// Classify a pending unit and decode the labels its role needs.
///
/// Drivers read their own request from `driver-cpu`/`driver-mem` and the
/// group shape from `executors`/`exec-cpu`/`exec-mem`. Executors read
/// their own request from `exec-cpu`/`exec-mem`. Other roles decode
/// nothing and carry a zero request.
pub fn decode_unit(pending: &PendingUnit) -> Decoded {
    let role = Role::parse(pending.labels.get(ROLE).map(String::as_str).unwrap_or(""));
    let mut dec = Decoder::new(&pending.labels);

    let (request, group) = match role {
        Role::Driver => {
            let request = dec.request(DRIVER_CPU, DRIVER_MEM);
            let count = dec.count(EXECUTOR_COUNT);
            let group = GroupRequest {
                count,
                request: dec.request(EXECUTOR_CPU, EXECUTOR_MEM),
            };
            (request, Some(group))
        }
        Role::Executor => (dec.request(EXECUTOR_CPU, EXECUTOR_MEM), None),
        Role::Other(_) => (ResourceRequest::default(), None),
    };

    Decoded {
        unit: WorkloadUnit {
            unit: pending.unit.clone(),
            role,
            request,
            group,
        },
        defaults: dec.defaults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitRef;

    fn pending(labels: &[(&str, &str)]) -> PendingUnit {
        PendingUnit::new(
            UnitRef::new("spark", "job"),
            labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn decodes_driver_with_group() {
        let d = decode_unit(&pending(&[
            (ROLE, "driver"),
            (DRIVER_CPU, "1"),
            (DRIVER_MEM, "2"),
            (EXECUTOR_COUNT, "5"),
            (EXECUTOR_CPU, "1"),
            (EXECUTOR_MEM, "1"),
        ]));

        assert_eq!(d.unit.role, Role::Driver);
        assert_eq!(d.unit.request, ResourceRequest::new(1, 2));
        assert_eq!(
            d.unit.group,
            Some(GroupRequest {
                count: 5,
                request: ResourceRequest::new(1, 1),
            })
        );
        assert!(d.defaults.is_empty());
    }

    #[test]
    fn decodes_executor_from_exec_labels() {
        let d = decode_unit(&pending(&[
            (ROLE, "executor"),
            (EXECUTOR_CPU, "2"),
            (EXECUTOR_MEM, "4"),
            (DRIVER_CPU, "9"),
        ]));

        assert_eq!(d.unit.role, Role::Executor);
        assert_eq!(d.unit.request, ResourceRequest::new(2, 4));
        assert_eq!(d.unit.group, None);
        assert!(d.defaults.is_empty());
    }

    #[test]
    fn missing_and_garbage_labels_default_to_zero() {
        let d = decode_unit(&pending(&[(ROLE, "executor"), (EXECUTOR_CPU, "two")]));

        assert_eq!(d.unit.request, ResourceRequest::default());
        assert_eq!(
            d.defaults,
            vec![
                LabelDefault {
                    key: EXECUTOR_CPU,
                    cause: DefaultCause::Unparsable("two".to_string()),
                },
                LabelDefault {
                    key: EXECUTOR_MEM,
                    cause: DefaultCause::Missing,
                },
            ]
        );
    }

    #[test]
    fn negative_values_are_unparsable() {
        let d = decode_unit(&pending(&[(ROLE, "executor"), (EXECUTOR_CPU, "-1"), (EXECUTOR_MEM, "1")]));
        assert_eq!(d.unit.request.cpu, 0);
        assert_eq!(d.defaults.len(), 1);
    }

    #[test]
    fn unknown_role_decodes_nothing() {
        let d = decode_unit(&pending(&[(ROLE, "shuffle"), (DRIVER_CPU, "bogus")]));
        assert_eq!(d.unit.role, Role::Other("shuffle".to_string()));
        assert!(d.defaults.is_empty());

        let d = decode_unit(&pending(&[]));
        assert_eq!(d.unit.role, Role::Other(String::new()));
    }

    #[test]
    fn oversized_executor_count_is_clamped_and_reported() {
        let d = decode_unit(&pending(&[
            (ROLE, "driver"),
            (DRIVER_CPU, "1"),
            (DRIVER_MEM, "1"),
            (EXECUTOR_COUNT, "4294967296"),
            (EXECUTOR_CPU, "1"),
            (EXECUTOR_MEM, "1"),
        ]));

        assert_eq!(d.unit.group.unwrap().count, u32::MAX);
        assert_eq!(
            d.defaults,
            vec![LabelDefault {
                key: EXECUTOR_COUNT,
                cause: DefaultCause::Clamped(4_294_967_296),
            }]
        );
        assert_eq!(
            d.defaults[0].to_string(),
            "executors=4294967296 out of range, clamped"
        );
    }

    #[test]
    fn default_display() {
        let missing = LabelDefault {
            key: DRIVER_MEM,
            cause: DefaultCause::Missing,
        };
        assert_eq!(missing.to_string(), "driver-mem missing");
    }
}
