//! v0.0.43 schemas (Slurm 25.05).
//!
//! Adds reservation mutation. Reservation `node_count` is wrapped.

use serde::Serialize;

use super::NoValU64;
use super::v0_0_40::ReservationRecord;

pub use super::v0_0_42::{
    AccountInfo, AssociationInfo, ClusterInfo, ControllerPing, Coordinator, DiagStatistics,
    JobDescription, JobInfo, JobSubmitRequest, JobSubmitResponse, NodeInfo, NodeUpdateRequest,
    PartitionInfo, QosInfo, ResponseMeta, TresInfo, UserInfo, WCKeyInfo,
};

pub type ReservationInfo = ReservationRecord<NoValU64>;

/// Body of reservation create and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReservationDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NoValU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NoValU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<NoValU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<String>>,
}
