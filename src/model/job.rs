use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

super::wire_state! {
    /// Primary job state.
    JobState {
        Pending => "PENDING",
        Running => "RUNNING",
        Suspended => "SUSPENDED",
        Completing => "COMPLETING",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
        Failed => "FAILED",
        Timeout => "TIMEOUT",
        NodeFail => "NODE_FAIL",
        Preempted => "PREEMPTED",
        BootFail => "BOOT_FAIL",
        Deadline => "DEADLINE",
        OutOfMemory => "OUT_OF_MEMORY",
    }
}

impl JobState {
    /// Returns `true` if the job can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed
                | JobState::Cancelled
                | JobState::Failed
                | JobState::Timeout
                | JobState::NodeFail
                | JobState::Preempted
                | JobState::BootFail
                | JobState::Deadline
                | JobState::OutOfMemory
        )
    }
}

/// A job known to the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Slurm job id; zero when the record carried none.
    pub id: u32,
    pub name: String,
    pub account: String,
    pub partition: String,
    /// Submitting user.
    pub user_name: String,
    /// Primary state, the first entry of the wire state list.
    pub state: JobState,
    /// Why the job is pending or held, e.g. `Resources`; empty otherwise.
    pub state_reason: String,
    /// Minutes; zero when unlimited or unset.
    pub time_limit: u32,
    /// Nodes requested or allocated.
    pub node_count: u32,
    /// CPUs requested or allocated.
    pub cpus: u32,
    /// Batch script path or command line.
    pub command: String,
    pub working_directory: String,
    /// `None` when unset.
    pub submit_time: Option<DateTime<Utc>>,
    /// Actual or expected start; `None` when unknown.
    pub start_time: Option<DateTime<Utc>>,
}

/// A job submission.
///
/// Either `script` or `command` must be set. A bare command is wrapped in
/// a shell script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCreate {
    pub name: String,
    /// Batch script, starting with a `#!` line.
    pub script: String,
    /// Used when `script` is empty.
    pub command: String,
    pub account: Option<String>,
    pub partition: Option<String>,
    pub qos: Option<String>,
    /// Minutes.
    pub time_limit: Option<u32>,
    /// Minimum node count.
    pub nodes: Option<u32>,
    /// Minimum CPU count.
    pub cpus: Option<u32>,
    pub working_directory: Option<String>,
    /// Exported to the job; empty sends a minimal `PATH`.
    pub environment: BTreeMap<String, String>,
}

impl JobCreate {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            ..Self::default()
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit = Some(minutes);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// The script to submit: `script`, or `command` wrapped in a shell script.
    pub fn effective_script(&self) -> Option<String> {
        if !self.script.trim().is_empty() {
            Some(self.script.clone())
        } else if !self.command.trim().is_empty() {
            Some(format!("#!/bin/bash\n{}\n", self.command.trim()))
        } else {
            None
        }
    }

    /// Environment as `KEY=VALUE` entries.
    ///
    /// slurmrestd rejects submissions without an environment, so an empty
    /// map yields a minimal `PATH`.
    pub fn environment_entries(&self) -> Vec<String> {
        if self.environment.is_empty() {
            return vec!["PATH=/usr/bin:/bin".to_string()];
        }
        self.environment
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect()
    }
}

/// Fields to change on an existing job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    pub name: Option<String>,
    pub account: Option<String>,
    pub partition: Option<String>,
    pub qos: Option<String>,
    /// Minutes.
    pub time_limit: Option<u32>,
    /// Absolute priority; raising it usually needs operator rights.
    pub priority: Option<u32>,
    pub comment: Option<String>,
}

impl JobUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.account.is_none()
            && self.partition.is_none()
            && self.qos.is_none()
            && self.time_limit.is_none()
            && self.priority.is_none()
            && self.comment.is_none()
    }
}

/// Result of a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSubmitResponse {
    pub job_id: u32,
    /// Step of the submitted batch script, usually `batch`.
    pub step_id: String,
    /// Message from the site's job submit plugin, if any.
    pub user_message: String,
    /// Non-fatal warnings from slurmrestd.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobListOptions {
    /// Only jobs changed since this time; applied by the server.
    pub since: Option<DateTime<Utc>>,
    pub ids: Vec<u32>,
    pub names: Vec<String>,
    pub users: Vec<String>,
    pub accounts: Vec<String>,
    pub partitions: Vec<String>,
    pub states: Vec<JobState>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl JobListOptions {
    pub(crate) fn matches(&self, job: &Job) -> bool {
        super::one_of(&self.ids, &job.id)
            && super::matches_any(&self.names, &job.name)
            && super::matches_any(&self.users, &job.user_name)
            && super::matches_any(&self.accounts, &job.account)
            && super::matches_any(&self.partitions, &job.partition)
            && super::one_of(&self.states, &job.state)
    }
}
