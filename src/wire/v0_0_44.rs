//! v0.0.44 schemas (Slurm 25.11).
//!
//! No shape used by the adapters changed since v0.0.43.

pub use super::v0_0_43::{
    AccountInfo, AssociationInfo, ClusterInfo, ControllerPing, Coordinator, DiagStatistics,
    JobDescription, JobInfo, JobSubmitRequest, JobSubmitResponse, NodeInfo, NodeUpdateRequest,
    PartitionInfo, QosInfo, ReservationDescription, ReservationInfo, ResponseMeta, TresInfo,
    UserInfo, WCKeyInfo,
};
