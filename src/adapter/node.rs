use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{NodeManager, first_or_not_found};
use crate::base::{BaseManager, paginate};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::{SlurmError, SlurmResult};
use crate::model::{Node, NodeList, NodeListOptions, NodeState, NodeUpdate};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::watch::{self, EventStream, WatchOptions};
use crate::wire::v0_0_40::NodeRecord;
use crate::wire::{
    WireClient, WireList, decode_as, encode, list, number, text, v0_0_40, v0_0_42,
    v0_0_43, v0_0_44,
};

/// A node record as decoded from one wire version.
///
/// v0.0.41 has no variant: its node payloads are not mapped.
#[derive(Debug, Clone)]
pub enum WireNode {
    V40(v0_0_40::NodeInfo),
    V42(v0_0_42::NodeInfo),
    V43(v0_0_43::NodeInfo),
    V44(v0_0_44::NodeInfo),
}

impl WireNode {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "nodes", WireNode::V40),
            ApiVersion::V0_0_41 => Err(SlurmError::unsupported("node decode", version)),
            ApiVersion::V0_0_42 => decode_as(body, "nodes", WireNode::V42),
            ApiVersion::V0_0_43 => decode_as(body, "nodes", WireNode::V43),
            ApiVersion::V0_0_44 => decode_as(body, "nodes", WireNode::V44),
        }
    }
}

fn convert<F: WireList>(node: NodeRecord<F>) -> Node {
    Node {
        name: text(&node.name),
        state: NodeState::from_wire(&list(&node.state)),
        partitions: list(&node.partitions),
        cpus: node.cpus.unwrap_or(0),
        alloc_cpus: node.alloc_cpus.unwrap_or(0),
        real_memory: node.real_memory.unwrap_or(0),
        free_memory: number(&node.free_mem),
        architecture: text(&node.architecture),
        features: list(&node.features),
        reason: text(&node.reason),
    }
}

impl From<WireNode> for Node {
    fn from(wire: WireNode) -> Self {
        match wire {
            WireNode::V40(node) => convert(node),
            WireNode::V42(node) | WireNode::V43(node) | WireNode::V44(node) => convert(node),
        }
    }
}

// Every version that maps node updates shares the v0.0.40 body.
fn update_body(update: &NodeUpdate) -> SlurmResult<Value> {
    encode(&v0_0_40::NodeUpdateRequest {
        state: update.state.as_ref().map(|s| vec![s.as_str().to_string()]),
        reason: update.reason.clone(),
        features: update.features.clone(),
        comment: update.comment.clone(),
    })
}

/// [`NodeManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct NodeAdapter {
    base: BaseManager,
}

impl NodeAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Node, version, wire, defaults),
        }
    }

    async fn fetch(&self, ctx: &Context, opts: &NodeListOptions) -> SlurmResult<Vec<Node>> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurm, "nodes");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        Ok(WireNode::decode(self.base.version(), &body)?
            .into_iter()
            .map(Node::from)
            .filter(|node| opts.matches(node))
            .collect())
    }
}

#[async_trait]
impl NodeManager for NodeAdapter {
    async fn list(&self, ctx: &Context, opts: &NodeListOptions) -> SlurmResult<NodeList> {
        let nodes = self.fetch(ctx, opts).await?;
        Ok(paginate(nodes, opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Node> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurm, &format!("node/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let nodes = WireNode::decode(self.base.version(), &body)?;
        first_or_not_found(nodes, || format!("node {name}")).map(Node::from)
    }

    async fn update(&self, ctx: &Context, name: &str, update: &NodeUpdate) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        self.base.require_name(name)?;
        self.base.require_changes(update.is_empty())?;

        let path = self.base.path(Api::Slurm, &format!("node/{name}"));
        wire.execute(ctx, WireRequest::post(path, update_body(update)?))
            .await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurm, &format!("node/{name}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }

    async fn watch(
        &self,
        ctx: &Context,
        opts: &NodeListOptions,
        options: WatchOptions,
    ) -> SlurmResult<EventStream<Node>> {
        self.base.begin(ctx, Operation::List)?;
        options.validate()?;
        let adapter = self.clone();
        let opts = opts.clone();
        Ok(watch::spawn(
            ctx,
            options,
            Entity::Node,
            |node: &Node| node.name.clone(),
            move |ctx| {
                let adapter = adapter.clone();
                let opts = opts.clone();
                async move { adapter.fetch(&ctx, &opts).await }
            },
        ))
    }
}
