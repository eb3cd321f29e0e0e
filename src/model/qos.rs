use serde::{Deserialize, Serialize};

/// A quality-of-service policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QoS {
    pub name: String,
    pub description: String,
    /// Added to the priority of jobs using this QoS.
    pub priority: u32,
    /// Multiplier on recorded usage; zero when unset.
    pub usage_factor: f64,
    pub limits: QoSLimits,
}

/// Resource limits of a QoS; zero means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QoSLimits {
    /// Running jobs per user; zero when unlimited.
    pub max_jobs_per_user: u32,
    /// Zero when unlimited.
    pub max_cpus_per_job: u32,
    /// Zero when unlimited.
    pub max_nodes_per_job: u32,
    /// Minutes.
    pub max_wall_per_job: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QoSCreate {
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<u32>,
    pub usage_factor: Option<f64>,
    pub max_jobs_per_user: Option<u32>,
    pub max_cpus_per_job: Option<u32>,
    pub max_nodes_per_job: Option<u32>,
    pub max_wall_per_job: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QoSUpdate {
    pub description: Option<String>,
    pub priority: Option<u32>,
    pub usage_factor: Option<f64>,
    pub max_jobs_per_user: Option<u32>,
    pub max_cpus_per_job: Option<u32>,
    pub max_nodes_per_job: Option<u32>,
    pub max_wall_per_job: Option<u32>,
}

impl QoSUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.priority.is_none()
            && self.usage_factor.is_none()
            && self.max_jobs_per_user.is_none()
            && self.max_cpus_per_job.is_none()
            && self.max_nodes_per_job.is_none()
            && self.max_wall_per_job.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QoSListOptions {
    pub names: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl QoSListOptions {
    pub(crate) fn matches(&self, qos: &QoS) -> bool {
        super::matches_any(&self.names, &qos.name)
    }
}
