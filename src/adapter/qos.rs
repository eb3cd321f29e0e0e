use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use super::{QoSManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{QoS, QoSCreate, QoSLimits, QoSList, QoSListOptions, QoSUpdate};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::{
    JobsPer, PerUser, QosLimits, QosMax, QosRecord, QosTresLimits, QosTresPer, QosWallClock,
    QosWallPer, TresInfo,
};
use crate::wire::v0_0_42::ActiveJobs;
use crate::wire::{
    NoValF64, NoValU64, WireClient, decode_as, encode, number_u32, text, v0_0_40,
    v0_0_41, v0_0_42, v0_0_43, v0_0_44,
};

/// A QoS record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireQoS {
    V40(v0_0_40::QosInfo),
    V41(v0_0_41::QosInfo),
    V42(v0_0_42::QosInfo),
    V43(v0_0_43::QosInfo),
    V44(v0_0_44::QosInfo),
}

impl WireQoS {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "qos", WireQoS::V40),
            ApiVersion::V0_0_41 => decode_as(body, "qos", WireQoS::V41),
            ApiVersion::V0_0_42 => decode_as(body, "qos", WireQoS::V42),
            ApiVersion::V0_0_43 => decode_as(body, "qos", WireQoS::V43),
            ApiVersion::V0_0_44 => decode_as(body, "qos", WireQoS::V44),
        }
    }
}

/// Where a version keeps the per-user job limit.
trait JobLimit: Sized + Default {
    fn per_user(&self) -> Option<NoValU64>;
    fn with_per_user(limit: NoValU64) -> Self;
}

impl JobLimit for JobsPer {
    fn per_user(&self) -> Option<NoValU64> {
        self.per.as_ref().and_then(|p| p.user)
    }

    fn with_per_user(limit: NoValU64) -> Self {
        JobsPer {
            per: Some(PerUser { user: Some(limit) }),
        }
    }
}

impl JobLimit for ActiveJobs {
    fn per_user(&self) -> Option<NoValU64> {
        self.active_jobs.as_ref().and_then(JobLimit::per_user)
    }

    fn with_per_user(limit: NoValU64) -> Self {
        ActiveJobs {
            active_jobs: Some(JobsPer::with_per_user(limit)),
        }
    }
}

fn tres_count(tres: &[TresInfo], kind: &str) -> u32 {
    tres.iter()
        .find(|t| t.kind.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(kind)))
        .and_then(|t| t.count)
        .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn convert<J: JobLimit>(q: QosRecord<J>) -> QoS {
    let max = q.limits.and_then(|l| l.max).unwrap_or_default();
    let per_job = max
        .tres
        .and_then(|t| t.per)
        .and_then(|p| p.job)
        .unwrap_or_default();

    QoS {
        name: text(&q.name),
        description: text(&q.description),
        priority: number_u32(&q.priority),
        usage_factor: q
            .usage_factor
            .filter(|f| f.set && !f.infinite)
            .map(|f| f.number)
            .unwrap_or(0.0),
        limits: QoSLimits {
            max_jobs_per_user: number_u32(&max.jobs.as_ref().and_then(JobLimit::per_user)),
            max_cpus_per_job: tres_count(&per_job, "cpu"),
            max_nodes_per_job: tres_count(&per_job, "node"),
            max_wall_per_job: number_u32(&max.wall_clock.and_then(|w| w.per).and_then(|p| p.job)),
        },
    }
}

impl From<WireQoS> for QoS {
    fn from(wire: WireQoS) -> Self {
        match wire {
            WireQoS::V40(q) | WireQoS::V41(q) => convert(q),
            WireQoS::V42(q) | WireQoS::V43(q) | WireQoS::V44(q) => convert(q),
        }
    }
}

/// Fields shared by create and update.
#[derive(Debug, Default)]
struct QoSFields {
    description: Option<String>,
    priority: Option<u32>,
    usage_factor: Option<f64>,
    max_jobs_per_user: Option<u32>,
    max_cpus_per_job: Option<u32>,
    max_nodes_per_job: Option<u32>,
    max_wall_per_job: Option<u32>,
}

impl From<&QoSCreate> for QoSFields {
    fn from(q: &QoSCreate) -> Self {
        QoSFields {
            description: q.description.clone(),
            priority: q.priority,
            usage_factor: q.usage_factor,
            max_jobs_per_user: q.max_jobs_per_user,
            max_cpus_per_job: q.max_cpus_per_job,
            max_nodes_per_job: q.max_nodes_per_job,
            max_wall_per_job: q.max_wall_per_job,
        }
    }
}

impl From<&QoSUpdate> for QoSFields {
    fn from(q: &QoSUpdate) -> Self {
        QoSFields {
            description: q.description.clone(),
            priority: q.priority,
            usage_factor: q.usage_factor,
            max_jobs_per_user: q.max_jobs_per_user,
            max_cpus_per_job: q.max_cpus_per_job,
            max_nodes_per_job: q.max_nodes_per_job,
            max_wall_per_job: q.max_wall_per_job,
        }
    }
}

fn no_val(value: Option<u32>) -> Option<NoValU64> {
    value.map(|v| NoValU64::new(v.into()))
}

fn record<J: JobLimit>(name: &str, fields: &QoSFields) -> QosRecord<J> {
    let mut per_job = Vec::new();
    for (kind, count) in [
        ("cpu", fields.max_cpus_per_job),
        ("node", fields.max_nodes_per_job),
    ] {
        if let Some(count) = count {
            per_job.push(TresInfo {
                kind: Some(kind.to_string()),
                count: Some(count.into()),
                ..TresInfo::default()
            });
        }
    }

    let max = QosMax {
        jobs: no_val(fields.max_jobs_per_user).map(J::with_per_user),
        tres: (!per_job.is_empty()).then(|| QosTresLimits {
            per: Some(QosTresPer { job: Some(per_job) }),
        }),
        wall_clock: no_val(fields.max_wall_per_job).map(|job| QosWallClock {
            per: Some(QosWallPer { job: Some(job) }),
        }),
    };
    let has_limits = max.jobs.is_some() || max.tres.is_some() || max.wall_clock.is_some();

    QosRecord {
        name: Some(name.to_string()),
        description: fields.description.clone(),
        priority: no_val(fields.priority),
        usage_factor: fields.usage_factor.map(NoValF64::new),
        limits: has_limits.then_some(QosLimits { max: Some(max) }),
    }
}

fn wrap<T: Serialize>(record: &T) -> SlurmResult<Value> {
    Ok(json!({ "qos": [encode(record)?] }))
}

fn body(version: ApiVersion, name: &str, fields: &QoSFields) -> SlurmResult<Value> {
    match version {
        ApiVersion::V0_0_40 | ApiVersion::V0_0_41 => wrap(&record::<JobsPer>(name, fields)),
        ApiVersion::V0_0_42 | ApiVersion::V0_0_43 | ApiVersion::V0_0_44 => {
            wrap(&record::<ActiveJobs>(name, fields))
        }
    }
}

/// [`QoSManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct QoSAdapter {
    base: BaseManager,
}

impl QoSAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::QoS, version, wire, defaults),
        }
    }
}

#[async_trait]
impl QoSManager for QoSAdapter {
    async fn list(&self, ctx: &Context, opts: &QoSListOptions) -> SlurmResult<QoSList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurmdb, "qos");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let qos = WireQoS::decode(self.base.version(), &body)?
            .into_iter()
            .map(QoS::from)
            .collect();
        Ok(filter_page(qos, |q| opts.matches(q), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<QoS> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("qos/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let qos = WireQoS::decode(self.base.version(), &body)?;
        first_or_not_found(qos, || format!("qos {name}")).map(QoS::from)
    }

    async fn create(&self, ctx: &Context, qos: &QoSCreate) -> SlurmResult<String> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        self.base.require_name(&qos.name)?;

        let body = body(self.base.version(), &qos.name, &QoSFields::from(qos))?;
        let path = self.base.path(Api::Slurmdb, "qos");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(qos.name.clone())
    }

    async fn update(&self, ctx: &Context, name: &str, update: &QoSUpdate) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        self.base.require_name(name)?;
        self.base.require_changes(update.is_empty())?;

        let body = body(self.base.version(), name, &QoSFields::from(update))?;
        let path = self.base.path(Api::Slurmdb, "qos");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("qos/{name}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }
}
