use serde::{Deserialize, Serialize};

use crate::version::ApiVersion;

/// A cluster registered in the accounting database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub controller_host: String,
    pub controller_port: u16,
    /// Slurm protocol version of the controller.
    pub rpc_version: u32,
    /// Node expression of the whole cluster.
    pub nodes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCreate {
    pub name: String,
    pub controller_host: Option<String>,
    pub controller_port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterListOptions {
    pub names: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ClusterListOptions {
    pub(crate) fn matches(&self, cluster: &Cluster) -> bool {
        super::matches_any(&self.names, &cluster.name)
    }
}

/// A trackable resource (cpu, mem, node, gres/gpu, …).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tres {
    pub id: u32,
    /// Wire `type`, e.g. `cpu` or `gres`.
    pub kind: String,
    pub name: String,
    pub count: u64,
}

impl Tres {
    /// `type/name`, or `type` when unnamed (`gres/gpu`, `cpu`).
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.kind.clone()
        } else {
            format!("{}/{}", self.kind, self.name)
        }
    }
}

/// A workload characterization key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WCKey {
    pub id: u32,
    /// Workload characterization key.
    pub name: String,
    pub user: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WCKeyCreate {
    pub name: String,
    pub user: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WCKeyListOptions {
    pub names: Vec<String>,
    pub users: Vec<String>,
    pub clusters: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl WCKeyListOptions {
    pub(crate) fn matches(&self, wckey: &WCKey) -> bool {
        super::matches_any(&self.names, &wckey.name)
            && super::matches_any(&self.users, &wckey.user)
            && super::matches_any(&self.clusters, &wckey.cluster)
    }
}

/// Reachability of one controller as reported by `/ping`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerPing {
    pub hostname: String,
    pub responding: bool,
    /// Microseconds.
    pub latency_us: u64,
    /// `primary` or `backup`.
    pub mode: String,
}

/// Server identity as reported in the `meta` block of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    /// Wire version this client speaks.
    pub api: ApiVersion,
    /// `major.minor.micro`, empty when the server omits it.
    pub version: String,
    /// Release string, e.g. `24.05.3`.
    pub release: String,
    /// Parser plugin that served the request, e.g. `data_parser/v0.0.41`.
    pub data_parser: String,
}

/// Controller counters from `/diag`, accumulated since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Active slurmctld threads.
    pub server_thread_count: u32,
    /// Outgoing RPCs waiting to be sent.
    pub agent_queue_size: u32,
    pub jobs_submitted: u32,
    pub jobs_started: u32,
    pub jobs_completed: u32,
    pub jobs_canceled: u32,
    pub jobs_failed: u32,
    /// Gauge, not a counter.
    pub jobs_pending: u32,
    /// Gauge, not a counter.
    pub jobs_running: u32,
    /// Microseconds.
    pub schedule_cycle_last: u32,
    /// Microseconds.
    pub schedule_cycle_mean: u64,
    /// Microseconds.
    pub backfill_cycle_last: u32,
}

/// Cluster name, server version and controller statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub cluster_name: String,
    pub version: ServerVersion,
    pub stats: ClusterStats,
}
