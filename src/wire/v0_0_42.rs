//! v0.0.42 schemas (Slurm 24.11).
//!
//! The release that reshaped most controller payloads: nested job state,
//! array-valued node features, wrapped partition time limits, the
//! `active_jobs` QoS limit and plain integer association ids.

use serde::{Deserialize, Serialize};

use super::NoValU64;
use super::v0_0_40::{JobRecord, JobsPer, NodeRecord, PartitionRecord, QosRecord};

pub use super::v0_0_40::{
    AccountInfo, ClusterInfo, ControllerPing, Coordinator, DiagStatistics, JobSubmitResponse,
    NodeUpdateRequest, ReservationInfo, ResponseMeta, TresInfo, UserInfo, WCKeyInfo,
};

/// `state: { current: [...], reason: "..." }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NestedJobState {
    pub state: Option<JobStateInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStateInfo {
    pub current: Option<Vec<String>>,
    pub reason: Option<String>,
}

pub type JobInfo = JobRecord<NestedJobState>;

/// Job description; the script moved inside it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(flatten)]
    pub base: super::v0_0_40::JobDescription,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSubmitRequest {
    pub job: JobDescription,
}

/// Features as a JSON array.
pub type NodeInfo = NodeRecord<Vec<String>>;

/// Time limits wrapped in the no-value form.
pub type PartitionInfo = PartitionRecord<NoValU64>;

/// `{ "active_jobs": { "per": { "user": … } } }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ActiveJobs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_jobs: Option<JobsPer>,
}

/// Job limit at `limits.max.jobs.active_jobs.per.user`.
pub type QosInfo = QosRecord<ActiveJobs>;

pub type AssociationInfo = super::v0_0_40::AssociationRecord<u32>;
