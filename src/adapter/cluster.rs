use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{ClusterManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{Cluster, ClusterCreate, ClusterList, ClusterListOptions};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::{ClusterController, ClusterInfo};
use crate::wire::{WireClient, decode_as, encode, text, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44};

/// A cluster record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireCluster {
    V40(v0_0_40::ClusterInfo),
    V41(v0_0_41::ClusterInfo),
    V42(v0_0_42::ClusterInfo),
    V43(v0_0_43::ClusterInfo),
    V44(v0_0_44::ClusterInfo),
}

impl WireCluster {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "clusters", WireCluster::V40),
            ApiVersion::V0_0_41 => decode_as(body, "clusters", WireCluster::V41),
            ApiVersion::V0_0_42 => decode_as(body, "clusters", WireCluster::V42),
            ApiVersion::V0_0_43 => decode_as(body, "clusters", WireCluster::V43),
            ApiVersion::V0_0_44 => decode_as(body, "clusters", WireCluster::V44),
        }
    }
}

impl From<WireCluster> for Cluster {
    fn from(wire: WireCluster) -> Self {
        let (WireCluster::V40(c)
        | WireCluster::V41(c)
        | WireCluster::V42(c)
        | WireCluster::V43(c)
        | WireCluster::V44(c)) = wire;
        let controller = c.controller.unwrap_or_default();
        Cluster {
            name: text(&c.name),
            controller_host: text(&controller.host),
            controller_port: controller.port.unwrap_or(0),
            rpc_version: c.rpc_version.unwrap_or(0),
            nodes: text(&c.nodes),
        }
    }
}

/// [`ClusterManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct ClusterAdapter {
    base: BaseManager,
}

impl ClusterAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Cluster, version, wire, defaults),
        }
    }
}

#[async_trait]
impl ClusterManager for ClusterAdapter {
    async fn list(&self, ctx: &Context, opts: &ClusterListOptions) -> SlurmResult<ClusterList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurmdb, "clusters");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let clusters = WireCluster::decode(self.base.version(), &body)?
            .into_iter()
            .map(Cluster::from)
            .collect();
        Ok(filter_page(clusters, |c| opts.matches(c), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Cluster> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("cluster/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let clusters = WireCluster::decode(self.base.version(), &body)?;
        first_or_not_found(clusters, || format!("cluster {name}")).map(Cluster::from)
    }

    async fn create(&self, ctx: &Context, cluster: &ClusterCreate) -> SlurmResult<String> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        self.base.require_name(&cluster.name)?;

        let controller = (cluster.controller_host.is_some() || cluster.controller_port.is_some())
            .then(|| ClusterController {
                host: cluster.controller_host.clone(),
                port: cluster.controller_port,
            });
        let info = ClusterInfo {
            name: Some(cluster.name.clone()),
            controller,
            ..ClusterInfo::default()
        };
        let body = json!({ "clusters": [encode(&info)?] });
        let path = self.base.path(Api::Slurmdb, "clusters");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(cluster.name.clone())
    }

    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("cluster/{name}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }
}
