//! v0.0.40 schemas (Slurm 23.11).
//!
//! This is the oldest supported version and declares the base shapes. Where
//! later versions changed one part of a shape, the shape is generic over
//! that part and this module fixes the v0.0.40 choice.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{NoValF64, NoValU64};

// ── slurm: jobs ──────────────────────────────────────────────────────────

/// Job record, generic over how the job state is encoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRecord<S> {
    pub job_id: Option<u32>,
    pub name: Option<String>,
    pub account: Option<String>,
    pub partition: Option<String>,
    pub user_name: Option<String>,
    #[serde(flatten)]
    pub state: S,
    pub time_limit: Option<NoValU64>,
    pub node_count: Option<NoValU64>,
    pub cpus: Option<NoValU64>,
    pub command: Option<String>,
    pub current_working_directory: Option<String>,
    pub submit_time: Option<NoValU64>,
    pub start_time: Option<NoValU64>,
}

/// Flat `job_state` array with a sibling `state_reason`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlatJobState {
    pub job_state: Option<Vec<String>>,
    pub state_reason: Option<String>,
}

pub type JobInfo = JobRecord<FlatJobState>;

/// Job description used for submit and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<NoValU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_cpus: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NoValU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_working_directory: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
}

/// Submit body: the script travels beside the description.
#[derive(Debug, Clone, Serialize)]
pub struct JobSubmitRequest {
    pub script: String,
    pub job: JobDescription,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSubmitResponse {
    pub job_id: Option<u32>,
    pub step_id: Option<String>,
    pub job_submit_user_msg: Option<String>,
}

// ── slurm: nodes ─────────────────────────────────────────────────────────

/// Node record, generic over the `features` encoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRecord<F> {
    pub name: Option<String>,
    pub state: Option<Vec<String>>,
    pub partitions: Option<Vec<String>>,
    pub cpus: Option<u32>,
    pub alloc_cpus: Option<u32>,
    pub real_memory: Option<u64>,
    pub free_mem: Option<NoValU64>,
    pub architecture: Option<String>,
    pub features: Option<F>,
    pub reason: Option<String>,
}

/// Features as a comma separated string.
pub type NodeInfo = NodeRecord<String>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ── slurm: partitions ────────────────────────────────────────────────────

/// Partition record, generic over the encoding of time limits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionRecord<T> {
    pub name: Option<String>,
    pub partition: Option<PartitionStatus>,
    pub nodes: Option<PartitionNodes>,
    pub cpus: Option<PartitionCpus>,
    pub maximums: Option<PartitionMaximums<T>>,
    pub minimums: Option<PartitionMinimums>,
    pub defaults: Option<PartitionDefaults<T>>,
    pub priority: Option<PartitionPriority>,
    pub accounts: Option<AllowDeny>,
    pub qos: Option<PartitionQos>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionStatus {
    pub state: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionNodes {
    pub configured: Option<String>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionCpus {
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionMaximums<T> {
    pub nodes: Option<NoValU64>,
    pub time: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionMinimums {
    pub nodes: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionDefaults<T> {
    pub time: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionPriority {
    pub job_factor: Option<u32>,
    pub tier: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowDeny {
    pub allowed: Option<String>,
    pub deny: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionQos {
    pub allowed: Option<String>,
    pub deny: Option<String>,
    pub assigned: Option<String>,
}

/// Time limits as plain minute counts.
pub type PartitionInfo = PartitionRecord<u32>;

// ── slurm: reservations ──────────────────────────────────────────────────

/// Reservation record, generic over the `node_count` encoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationRecord<N> {
    pub name: Option<String>,
    pub start_time: Option<NoValU64>,
    pub end_time: Option<NoValU64>,
    pub node_count: Option<N>,
    pub node_list: Option<String>,
    pub users: Option<String>,
    pub accounts: Option<String>,
    pub partition: Option<String>,
    pub flags: Option<Vec<String>>,
}

pub type ReservationInfo = ReservationRecord<u32>;

// ── slurm: ping ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControllerPing {
    pub hostname: Option<String>,
    pub pinged: Option<String>,
    pub responding: Option<bool>,
    pub latency: Option<u64>,
    pub mode: Option<String>,
}

// ── slurm: meta and diag ─────────────────────────────────────────────────

/// The `meta` block every response carries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMeta {
    pub plugin: Option<MetaPlugin>,
    pub slurm: Option<MetaSlurm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaPlugin {
    pub data_parser: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaSlurm {
    pub version: Option<SlurmVersion>,
    pub release: Option<String>,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlurmVersion {
    pub major: Option<VersionPart>,
    pub minor: Option<VersionPart>,
    pub micro: Option<VersionPart>,
}

/// Releases disagree on whether version parts are strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VersionPart {
    Number(u64),
    Text(String),
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPart::Number(n) => write!(f, "{n}"),
            VersionPart::Text(s) => f.write_str(s),
        }
    }
}

/// `statistics` object of `/diag`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagStatistics {
    pub server_thread_count: Option<u32>,
    pub agent_queue_size: Option<u32>,
    pub jobs_submitted: Option<u32>,
    pub jobs_started: Option<u32>,
    pub jobs_completed: Option<u32>,
    pub jobs_canceled: Option<u32>,
    pub jobs_failed: Option<u32>,
    pub jobs_pending: Option<u32>,
    pub jobs_running: Option<u32>,
    pub schedule_cycle_last: Option<u32>,
    pub schedule_cycle_mean: Option<u64>,
    pub bf_cycle_last: Option<u32>,
}

// ── slurmdb: qos ─────────────────────────────────────────────────────────

/// QoS record, generic over the shape of the job-count limit.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosRecord<J> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NoValU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_factor: Option<NoValF64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<QosLimits<J>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosLimits<J> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<QosMax<J>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosMax<J> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tres: Option<QosTresLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_clock: Option<QosWallClock>,
}

/// `{ "per": { "user": … } }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobsPer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per: Option<PerUser>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<NoValU64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosTresLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per: Option<QosTresPer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosTresPer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Vec<TresInfo>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosWallClock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per: Option<QosWallPer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QosWallPer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<NoValU64>,
}

/// Job limit at `limits.max.jobs.per.user`.
pub type QosInfo = QosRecord<JobsPer>;

// ── slurmdb: tres ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TresInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

// ── slurmdb: accounts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinators: Option<Vec<Coordinator>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Coordinator {
    pub name: String,
    #[serde(default)]
    pub direct: bool,
}

// ── slurmdb: users ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<UserDefault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrator_level: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<Vec<UserAssociationShort>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserDefault {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wckey: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserAssociationShort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
}

// ── slurmdb: associations ────────────────────────────────────────────────

/// Association record, generic over the `id` encoding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssociationRecord<I> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<I>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default)]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AssociationDefault>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssociationDefault {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qos: Option<String>,
}

/// `id` as an object: `{ "id": 12 }`.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct AssociationId {
    pub id: Option<u32>,
}

impl super::WireNumber for AssociationId {
    fn get(&self) -> u64 {
        self.id.map(u64::from).unwrap_or(0)
    }
}

pub type AssociationInfo = AssociationRecord<AssociationId>;

// ── slurmdb: clusters ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClusterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<ClusterController>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClusterController {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// ── slurmdb: wckeys ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WCKeyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}
