use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{JobManager, first_or_not_found};
use crate::base::{BaseManager, paginate};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::{SlurmError, SlurmResult};
use crate::model::{Job, JobCreate, JobList, JobListOptions, JobState, JobSubmitResponse, JobUpdate};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::watch::{self, EventStream, WatchOptions};
use crate::wire::v0_0_40::{FlatJobState, JobRecord};
use crate::wire::v0_0_42::NestedJobState;
use crate::wire::{
    NoValU64, WireClient, WireWarning, decode_as, encode, items, list, number_u32, text,
    timestamp, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44,
};

/// A job record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireJob {
    V40(v0_0_40::JobInfo),
    V41(v0_0_41::JobInfo),
    V42(v0_0_42::JobInfo),
    V43(v0_0_43::JobInfo),
    V44(v0_0_44::JobInfo),
}

impl WireJob {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "jobs", WireJob::V40),
            ApiVersion::V0_0_41 => decode_as(body, "jobs", WireJob::V41),
            ApiVersion::V0_0_42 => decode_as(body, "jobs", WireJob::V42),
            ApiVersion::V0_0_43 => decode_as(body, "jobs", WireJob::V43),
            ApiVersion::V0_0_44 => decode_as(body, "jobs", WireJob::V44),
        }
    }
}

/// Where a version keeps the job state and its reason.
trait JobStateFields {
    fn current(&self) -> Vec<String>;
    fn reason(&self) -> String;
}

impl JobStateFields for FlatJobState {
    fn current(&self) -> Vec<String> {
        list(&self.job_state)
    }

    fn reason(&self) -> String {
        text(&self.state_reason)
    }
}

impl JobStateFields for NestedJobState {
    fn current(&self) -> Vec<String> {
        self.state
            .as_ref()
            .map(|s| list(&s.current))
            .unwrap_or_default()
    }

    fn reason(&self) -> String {
        self.state
            .as_ref()
            .map(|s| text(&s.reason))
            .unwrap_or_default()
    }
}

fn convert<S: JobStateFields>(job: JobRecord<S>) -> Job {
    Job {
        id: job.job_id.unwrap_or(0),
        name: text(&job.name),
        account: text(&job.account),
        partition: text(&job.partition),
        user_name: text(&job.user_name),
        state: JobState::from_wire(&job.state.current()),
        state_reason: job.state.reason(),
        time_limit: number_u32(&job.time_limit),
        node_count: number_u32(&job.node_count),
        cpus: number_u32(&job.cpus),
        command: text(&job.command),
        working_directory: text(&job.current_working_directory),
        submit_time: timestamp(&job.submit_time),
        start_time: timestamp(&job.start_time),
    }
}

impl From<WireJob> for Job {
    fn from(wire: WireJob) -> Self {
        match wire {
            WireJob::V40(job) | WireJob::V41(job) => convert(job),
            WireJob::V42(job) | WireJob::V43(job) | WireJob::V44(job) => convert(job),
        }
    }
}

fn description(job: &JobCreate) -> v0_0_40::JobDescription {
    v0_0_40::JobDescription {
        name: (!job.name.is_empty()).then(|| job.name.clone()),
        account: job.account.clone(),
        partition: job.partition.clone(),
        qos: job.qos.clone(),
        time_limit: job.time_limit.map(|m| NoValU64::new(m.into())),
        minimum_nodes: job.nodes,
        minimum_cpus: job.cpus,
        current_working_directory: Some(
            job.working_directory
                .clone()
                .unwrap_or_else(|| "/tmp".to_string()),
        ),
        environment: job.environment_entries(),
        ..v0_0_40::JobDescription::default()
    }
}

fn update_description(update: &JobUpdate) -> v0_0_40::JobDescription {
    v0_0_40::JobDescription {
        name: update.name.clone(),
        account: update.account.clone(),
        partition: update.partition.clone(),
        qos: update.qos.clone(),
        time_limit: update.time_limit.map(|m| NoValU64::new(m.into())),
        priority: update.priority.map(|p| NoValU64::new(p.into())),
        comment: update.comment.clone(),
        ..v0_0_40::JobDescription::default()
    }
}

/// Submit body. v0.0.40 and v0.0.41 carry the script beside the
/// description; later versions carry it inside.
fn submit_body(version: ApiVersion, job: &JobCreate, script: String) -> SlurmResult<Value> {
    let desc = description(job);
    match version {
        ApiVersion::V0_0_40 | ApiVersion::V0_0_41 => {
            encode(&v0_0_40::JobSubmitRequest { script, job: desc })
        }
        ApiVersion::V0_0_42 | ApiVersion::V0_0_43 | ApiVersion::V0_0_44 => {
            encode(&v0_0_42::JobSubmitRequest {
                job: v0_0_42::JobDescription {
                    script: Some(script),
                    base: desc,
                },
            })
        }
    }
}

fn update_body(version: ApiVersion, update: &JobUpdate) -> SlurmResult<Value> {
    let desc = update_description(update);
    match version {
        ApiVersion::V0_0_40 | ApiVersion::V0_0_41 => encode(&desc),
        ApiVersion::V0_0_42 | ApiVersion::V0_0_43 | ApiVersion::V0_0_44 => {
            encode(&v0_0_42::JobDescription {
                script: None,
                base: desc,
            })
        }
    }
}

fn submit_response(body: &Value) -> SlurmResult<JobSubmitResponse> {
    let response: v0_0_40::JobSubmitResponse = serde_json::from_value(body.clone())?;
    let warnings = items::<WireWarning>(body, "warnings")?
        .into_iter()
        .map(|w| w.description)
        .filter(|d| !d.is_empty())
        .collect();
    Ok(JobSubmitResponse {
        job_id: response.job_id.unwrap_or(0),
        step_id: text(&response.step_id),
        user_message: text(&response.job_submit_user_msg),
        warnings,
    })
}

/// [`JobManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct JobAdapter {
    base: BaseManager,
}

impl JobAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Job, version, wire, defaults),
        }
    }

    /// Filtered, unpaginated listing.
    async fn fetch(&self, ctx: &Context, opts: &JobListOptions) -> SlurmResult<Vec<Job>> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let mut request = WireRequest::get(self.base.path(Api::Slurm, "jobs"));
        if let Some(since) = opts.since {
            request = request.with_query("update_time", since.timestamp().to_string());
        }
        let body = wire.execute(ctx, request).await?;
        Ok(WireJob::decode(self.base.version(), &body)?
            .into_iter()
            .map(Job::from)
            .filter(|job| opts.matches(job))
            .collect())
    }
}

#[async_trait]
impl JobManager for JobAdapter {
    async fn list(&self, ctx: &Context, opts: &JobListOptions) -> SlurmResult<JobList> {
        let jobs = self.fetch(ctx, opts).await?;
        Ok(paginate(jobs, opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, id: u32) -> SlurmResult<Job> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_id("id", id)?;

        let path = self.base.path(Api::Slurm, &format!("job/{id}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let jobs = WireJob::decode(self.base.version(), &body)?;
        first_or_not_found(jobs, || format!("job {id}")).map(Job::from)
    }

    async fn create(&self, ctx: &Context, job: &JobCreate) -> SlurmResult<JobSubmitResponse> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        let script = job
            .effective_script()
            .ok_or_else(|| SlurmError::validation("job script or command is required"))?;

        let body = submit_body(self.base.version(), job, script)?;
        let path = self.base.path(Api::Slurm, "job/submit");
        let response = wire.execute(ctx, WireRequest::post(path, body)).await?;
        submit_response(&response)
    }

    async fn update(&self, ctx: &Context, id: u32, update: &JobUpdate) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        self.base.require_id("id", id)?;
        self.base.require_changes(update.is_empty())?;

        let body = update_body(self.base.version(), update)?;
        let path = self.base.path(Api::Slurm, &format!("job/{id}"));
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: u32) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_id("id", id)?;

        let path = self.base.path(Api::Slurm, &format!("job/{id}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }

    async fn watch(
        &self,
        ctx: &Context,
        opts: &JobListOptions,
        options: WatchOptions,
    ) -> SlurmResult<EventStream<Job>> {
        self.base.begin(ctx, Operation::List)?;
        options.validate()?;
        let adapter = self.clone();
        let opts = opts.clone();
        Ok(watch::spawn(ctx, options, Entity::Job, |job: &Job| job.id, move |ctx| {
            let adapter = adapter.clone();
            let opts = opts.clone();
            async move { adapter.fetch(&ctx, &opts).await }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::{detached, wired};
    use crate::error::ErrorKind;
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn test_convert_flat_state() {
        let wire: v0_0_40::JobInfo = serde_json::from_value(json!({
            "job_id": 42,
            "name": "train",
            "account": "physics",
            "job_state": ["RUNNING"],
            "state_reason": "None",
            "time_limit": {"set": true, "infinite": false, "number": 60},
            "submit_time": {"set": true, "number": 1700000000}
        }))
        .unwrap();
        let job = Job::from(WireJob::V40(wire));
        assert_eq!(job.id, 42);
        assert_eq!(job.state, JobState::Running);
        assert_eq!(job.state_reason, "None");
        assert_eq!(job.time_limit, 60);
        assert_eq!(job.submit_time.unwrap().timestamp(), 1_700_000_000);
        assert!(job.start_time.is_none());
    }

    #[test]
    fn test_convert_nested_state() {
        let wire: v0_0_43::JobInfo = serde_json::from_value(json!({
            "job_id": 7,
            "state": {"current": ["PENDING", "REQUEUED"], "reason": "Priority"},
            "partition": "gpu"
        }))
        .unwrap();
        let job = Job::from(WireJob::V43(wire));
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.state_reason, "Priority");
        assert_eq!(job.partition, "gpu");
    }

    #[test]
    fn test_convert_empty_payload() {
        for version in ApiVersion::ALL {
            let jobs = WireJob::decode(version, &json!({"jobs": [{}]})).unwrap();
            let job = Job::from(jobs.into_iter().next().unwrap());
            assert_eq!(job, Job::default(), "{version}");
        }
    }

    #[test]
    fn test_submit_body_script_location() {
        let job = JobCreate::new("hello", "#!/bin/bash\nhostname").with_account("root");

        let body = submit_body(ApiVersion::V0_0_41, &job, "#!/bin/bash\nhostname".into()).unwrap();
        assert_eq!(body["script"], "#!/bin/bash\nhostname");
        assert!(body["job"].get("script").is_none());
        assert_eq!(body["job"]["account"], "root");

        let body = submit_body(ApiVersion::V0_0_43, &job, "#!/bin/bash\nhostname".into()).unwrap();
        assert!(body.get("script").is_none());
        assert_eq!(body["job"]["script"], "#!/bin/bash\nhostname");
        assert_eq!(body["job"]["environment"], json!(["PATH=/usr/bin:/bin"]));
    }

    #[test]
    fn test_update_body_omits_absent_fields() {
        let update = JobUpdate {
            time_limit: Some(90),
            ..JobUpdate::default()
        };
        for version in ApiVersion::ALL {
            let body = update_body(version, &update).unwrap();
            assert_eq!(
                body,
                json!({"time_limit": {"set": true, "infinite": false, "number": 90}}),
                "{version}"
            );
        }
    }

    #[tokio::test]
    async fn test_list_filters_then_paginates() {
        let (mock, wire) = wired(ApiVersion::V0_0_42);
        mock.on(
            Method::Get,
            "/slurm/v0.0.42/jobs",
            200,
            json!({"jobs": [
                {"job_id": 1, "state": {"current": ["RUNNING"]}},
                {"job_id": 2, "state": {"current": ["PENDING"]}},
                {"job_id": 3, "state": {"current": ["RUNNING"]}},
                {"job_id": 4, "state": {"current": ["RUNNING"]}}
            ]}),
        );
        let adapter = JobAdapter::new(ApiVersion::V0_0_42, Some(wire), Default::default());

        let opts = JobListOptions {
            states: vec![JobState::Running],
            offset: 1,
            limit: Some(1),
            ..JobListOptions::default()
        };
        let page = adapter.list(&Context::background(), &opts).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 3);

        let opts = JobListOptions {
            offset: 10,
            ..opts
        };
        let page = adapter.list(&Context::background(), &opts).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_create_sends_submit() {
        let (mock, wire) = wired(ApiVersion::V0_0_40);
        mock.on(
            Method::Post,
            "/slurm/v0.0.40/job/submit",
            200,
            json!({
                "job_id": 1234,
                "step_id": "batch",
                "warnings": [{"description": "no partition given"}]
            }),
        );
        let adapter = JobAdapter::new(ApiVersion::V0_0_40, Some(wire), Default::default());

        let job = JobCreate::new("hello", "#!/bin/bash\nhostname");
        let response = adapter.create(&Context::background(), &job).await.unwrap();
        assert_eq!(response.job_id, 1234);
        assert_eq!(response.warnings, vec!["no partition given"]);
        assert_eq!(mock.calls()[0].body.as_ref().unwrap()["script"], "#!/bin/bash\nhostname");
    }

    #[tokio::test]
    async fn test_create_requires_script() {
        let (mock, wire) = wired(ApiVersion::V0_0_44);
        let adapter = JobAdapter::new(ApiVersion::V0_0_44, Some(wire), Default::default());
        let err = adapter
            .create(&Context::background(), &JobCreate::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (mock, wire) = wired(ApiVersion::V0_0_43);
        mock.on(Method::Get, "/slurm/v0.0.43/job/99", 404, Value::Null);
        mock.on(Method::Get, "/slurm/v0.0.43/job/98", 200, json!({"jobs": []}));
        let adapter = JobAdapter::new(ApiVersion::V0_0_43, Some(wire), Default::default());

        let err = adapter.get(&Context::background(), 99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("404"));

        let err = adapter.get(&Context::background(), 98).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_rejects_empty() {
        let (mock, wire) = wired(ApiVersion::V0_0_41);
        let adapter = JobAdapter::new(ApiVersion::V0_0_41, Some(wire), Default::default());
        let err = adapter
            .update(&Context::background(), 5, &JobUpdate::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least one field"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_preconditions_order() {
        let adapter = JobAdapter::new(ApiVersion::V0_0_43, detached(), Default::default());
        let ctx = Context::background();
        ctx.cancel();

        let err = adapter.get(&ctx, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextRequired);

        let err = adapter.get(&Context::background(), 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientNotInitialized);
    }
}
