//! Metric sample type.

use serde::{Deserialize, Serialize};

/// One batch of counter readings pushed by a remote node.
///
/// `counter_ids` and `values` are parallel sequences; a sample where their
/// lengths differ is malformed and never forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Name of the reporting node.
    pub node_name: String,
    /// Identifiers of the counters being reported.
    pub counter_ids: Vec<u64>,
    /// Counter values, one per identifier.
    pub values: Vec<f64>,
    /// Monotonic tick count at which the sample was taken on the node.
    pub tick_count: u64,
}

impl MetricSample {
    /// Returns true if the id and value sequences line up.
    pub fn is_well_formed(&self) -> bool {
        self.counter_ids.len() == self.values.len()
    }
}
