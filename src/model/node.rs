use serde::{Deserialize, Serialize};

super::wire_state! {
    /// Primary node state. Flags such as `DRAIN` follow the base state on
    /// the wire and are not reflected here.
    NodeState {
        Idle => "IDLE",
        Allocated => "ALLOCATED",
        Mixed => "MIXED",
        Down => "DOWN",
        Drain => "DRAIN",
        Draining => "DRAINING",
        Drained => "DRAINED",
        Error => "ERROR",
        Future => "FUTURE",
        Reserved => "RESERVED",
        Maintenance => "MAINTENANCE",
        PowerDown => "POWER_DOWN",
        PowerUp => "POWER_UP",
        Resume => "RESUME",
    }
}

/// A compute node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub state: NodeState,
    /// Partitions the node belongs to.
    pub partitions: Vec<String>,
    /// Configured CPUs.
    pub cpus: u32,
    /// CPUs allocated to running jobs.
    pub alloc_cpus: u32,
    /// MiB.
    pub real_memory: u64,
    /// MiB.
    pub free_memory: u64,
    /// e.g. `x86_64`.
    pub architecture: String,
    /// Active features, e.g. `gpu`, `ib`.
    pub features: Vec<String>,
    /// Why the node is down or drained; empty otherwise.
    pub reason: String,
}

/// Fields to change on a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    /// Target state, e.g. `Drain` or `Resume`.
    pub state: Option<NodeState>,
    /// Required by the server when draining or downing a node.
    pub reason: Option<String>,
    /// Replaces the available features.
    pub features: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.reason.is_none()
            && self.features.is_none()
            && self.comment.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeListOptions {
    pub names: Vec<String>,
    pub states: Vec<NodeState>,
    pub partitions: Vec<String>,
    /// Nodes carrying any of these features.
    pub features: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl NodeListOptions {
    pub(crate) fn matches(&self, node: &Node) -> bool {
        super::matches_any(&self.names, &node.name)
            && super::one_of(&self.states, &node.state)
            && super::overlaps(&self.partitions, &node.partitions)
            && super::overlaps(&self.features, &node.features)
    }
}
