use serde::{Deserialize, Serialize};

super::wire_state! {
    PartitionState {
        Up => "UP",
        Down => "DOWN",
        Drain => "DRAIN",
        Inactive => "INACTIVE",
    }
}

/// A partition (queue). Read-only through the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub name: String,
    pub state: PartitionState,
    /// Configured node expression, e.g. `c[001-128]`.
    pub nodes: String,
    /// Nodes configured in the partition.
    pub total_nodes: u32,
    /// CPUs across those nodes.
    pub total_cpus: u32,
    /// Per-job node minimum.
    pub min_nodes: u32,
    /// Per-job node maximum; zero when unlimited.
    pub max_nodes: u32,
    /// Minutes; zero when unlimited.
    pub max_time: u32,
    /// Minutes; zero when unset.
    pub default_time: u32,
    /// Job priority factor of the partition.
    pub priority: u32,
    /// Empty means every account is allowed.
    pub allow_accounts: Vec<String>,
    pub deny_accounts: Vec<String>,
    pub allow_qos: Vec<String>,
    pub deny_qos: Vec<String>,
    /// The partition QoS.
    pub qos: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionListOptions {
    pub names: Vec<String>,
    pub states: Vec<PartitionState>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl PartitionListOptions {
    pub(crate) fn matches(&self, partition: &Partition) -> bool {
        super::matches_any(&self.names, &partition.name)
            && super::one_of(&self.states, &partition.state)
    }
}
