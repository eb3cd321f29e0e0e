//! v0.0.41 schemas (Slurm 24.05).
//!
//! Every shape the adapters use is unchanged from v0.0.40. Node endpoints
//! exist on the server but use inline payloads no other version shares, so
//! node shapes are deliberately not re-exported here.

pub use super::v0_0_40::{
    AccountInfo, AssociationId, AssociationInfo, ClusterInfo, ControllerPing, Coordinator,
    DiagStatistics, JobDescription, JobInfo, JobSubmitRequest, JobSubmitResponse, PartitionInfo,
    QosInfo, ReservationInfo, ResponseMeta, TresInfo, UserInfo, WCKeyInfo,
};
