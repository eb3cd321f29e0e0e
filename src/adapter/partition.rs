use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{PartitionManager, first_or_not_found};
use crate::base::{BaseManager, paginate};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{Partition, PartitionList, PartitionListOptions, PartitionState};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::watch::{self, EventStream, WatchOptions};
use crate::wire::v0_0_40::PartitionRecord;
use crate::wire::{
    WireClient, WireNumber, decode_as, list, number_u32, split_csv, v0_0_40, v0_0_41, v0_0_42,
    v0_0_43, v0_0_44,
};

/// A partition record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WirePartition {
    V40(v0_0_40::PartitionInfo),
    V41(v0_0_41::PartitionInfo),
    V42(v0_0_42::PartitionInfo),
    V43(v0_0_43::PartitionInfo),
    V44(v0_0_44::PartitionInfo),
}

impl WirePartition {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "partitions", WirePartition::V40),
            ApiVersion::V0_0_41 => decode_as(body, "partitions", WirePartition::V41),
            ApiVersion::V0_0_42 => decode_as(body, "partitions", WirePartition::V42),
            ApiVersion::V0_0_43 => decode_as(body, "partitions", WirePartition::V43),
            ApiVersion::V0_0_44 => decode_as(body, "partitions", WirePartition::V44),
        }
    }
}

fn csv(value: Option<&String>) -> Vec<String> {
    value.map(|s| split_csv(s)).unwrap_or_default()
}

fn convert<T: WireNumber + Default>(p: PartitionRecord<T>) -> Partition {
    let nodes = p.nodes.unwrap_or_default();
    let maximums = p.maximums.unwrap_or_default();
    let accounts = p.accounts.unwrap_or_default();
    let qos = p.qos.unwrap_or_default();

    Partition {
        name: p.name.unwrap_or_default(),
        state: PartitionState::from_wire(
            &p.partition.map(|s| list(&s.state)).unwrap_or_default(),
        ),
        nodes: nodes.configured.unwrap_or_default(),
        total_nodes: nodes.total.unwrap_or(0),
        total_cpus: p.cpus.and_then(|c| c.total).unwrap_or(0),
        min_nodes: p.minimums.and_then(|m| m.nodes).unwrap_or(0),
        max_nodes: number_u32(&maximums.nodes),
        max_time: number_u32(&maximums.time),
        default_time: p.defaults.map(|d| number_u32(&d.time)).unwrap_or(0),
        priority: p.priority.and_then(|pr| pr.job_factor).unwrap_or(0),
        allow_accounts: csv(accounts.allowed.as_ref()),
        deny_accounts: csv(accounts.deny.as_ref()),
        allow_qos: csv(qos.allowed.as_ref()),
        deny_qos: csv(qos.deny.as_ref()),
        qos: qos.assigned.unwrap_or_default(),
    }
}

impl From<WirePartition> for Partition {
    fn from(wire: WirePartition) -> Self {
        match wire {
            WirePartition::V40(p) | WirePartition::V41(p) => convert(p),
            WirePartition::V42(p) | WirePartition::V43(p) | WirePartition::V44(p) => convert(p),
        }
    }
}

/// [`PartitionManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct PartitionAdapter {
    base: BaseManager,
}

impl PartitionAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Partition, version, wire, defaults),
        }
    }

    async fn fetch(&self, ctx: &Context, opts: &PartitionListOptions) -> SlurmResult<Vec<Partition>> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurm, "partitions");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        Ok(WirePartition::decode(self.base.version(), &body)?
            .into_iter()
            .map(Partition::from)
            .filter(|p| opts.matches(p))
            .collect())
    }
}

#[async_trait]
impl PartitionManager for PartitionAdapter {
    async fn list(&self, ctx: &Context, opts: &PartitionListOptions) -> SlurmResult<PartitionList> {
        let partitions = self.fetch(ctx, opts).await?;
        Ok(paginate(partitions, opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Partition> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurm, &format!("partition/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let partitions = WirePartition::decode(self.base.version(), &body)?;
        first_or_not_found(partitions, || format!("partition {name}")).map(Partition::from)
    }

    async fn watch(
        &self,
        ctx: &Context,
        opts: &PartitionListOptions,
        options: WatchOptions,
    ) -> SlurmResult<EventStream<Partition>> {
        self.base.begin(ctx, Operation::List)?;
        options.validate()?;
        let adapter = self.clone();
        let opts = opts.clone();
        Ok(watch::spawn(
            ctx,
            options,
            Entity::Partition,
            |p: &Partition| p.name.clone(),
            move |ctx| {
                let adapter = adapter.clone();
                let opts = opts.clone();
                async move { adapter.fetch(&ctx, &opts).await }
            },
        ))
    }
}
