use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use super::{AssociationManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{
    Association, AssociationCreate, AssociationKey, AssociationList, AssociationListOptions,
    AssociationUpdate,
};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::{AssociationDefault, AssociationId, AssociationRecord};
use crate::wire::{
    WireClient, WireNumber, decode_as, encode, number_u32, text, v0_0_40, v0_0_41, v0_0_42,
    v0_0_43, v0_0_44,
};

/// An association record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireAssociation {
    V40(v0_0_40::AssociationInfo),
    V41(v0_0_41::AssociationInfo),
    V42(v0_0_42::AssociationInfo),
    V43(v0_0_43::AssociationInfo),
    V44(v0_0_44::AssociationInfo),
}

impl WireAssociation {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "associations", WireAssociation::V40),
            ApiVersion::V0_0_41 => decode_as(body, "associations", WireAssociation::V41),
            ApiVersion::V0_0_42 => decode_as(body, "associations", WireAssociation::V42),
            ApiVersion::V0_0_43 => decode_as(body, "associations", WireAssociation::V43),
            ApiVersion::V0_0_44 => decode_as(body, "associations", WireAssociation::V44),
        }
    }
}

fn convert<I: WireNumber>(a: AssociationRecord<I>) -> Association {
    Association {
        id: number_u32(&a.id),
        account: text(&a.account),
        user: a.user,
        cluster: text(&a.cluster),
        partition: text(&a.partition),
        parent_account: text(&a.parent_account),
        qos: a.qos.unwrap_or_default(),
        default_qos: a.default.and_then(|d| d.qos).unwrap_or_default(),
    }
}

impl From<WireAssociation> for Association {
    fn from(wire: WireAssociation) -> Self {
        match wire {
            WireAssociation::V40(a) | WireAssociation::V41(a) => convert(a),
            WireAssociation::V42(a) | WireAssociation::V43(a) | WireAssociation::V44(a) => {
                convert(a)
            }
        }
    }
}

/// Request record without an id; the server assigns it.
fn record<I>(key: &AssociationKey, update: &AssociationUpdate) -> AssociationRecord<I> {
    AssociationRecord {
        id: None,
        account: Some(key.account.clone()),
        user: key.user.clone(),
        cluster: Some(key.cluster.clone()),
        partition: key.partition.clone(),
        parent_account: update.parent_account.clone(),
        qos: update.qos.clone(),
        default: update.default_qos.clone().map(|qos| AssociationDefault { qos: Some(qos) }),
    }
}

fn wrap<T: Serialize>(record: &T) -> SlurmResult<Value> {
    Ok(json!({ "associations": [encode(record)?] }))
}

fn body(version: ApiVersion, key: &AssociationKey, fields: &AssociationUpdate) -> SlurmResult<Value> {
    match version {
        ApiVersion::V0_0_40 | ApiVersion::V0_0_41 => wrap(&record::<AssociationId>(key, fields)),
        ApiVersion::V0_0_42 | ApiVersion::V0_0_43 | ApiVersion::V0_0_44 => {
            wrap(&record::<u32>(key, fields))
        }
    }
}

fn with_key(request: WireRequest, key: &AssociationKey) -> WireRequest {
    let request = request
        .with_query("account", key.account.clone())
        .with_query("user", key.user.clone())
        .with_query("cluster", key.cluster.clone());
    match &key.partition {
        Some(partition) => request.with_query("partition", partition.clone()),
        None => request,
    }
}

/// Whether `association` is the one `key` names; a key without a partition
/// matches any partition.
fn identifies(key: &AssociationKey, association: &Association) -> bool {
    let partition = key.partition.as_deref().unwrap_or_default();
    association.account.eq_ignore_ascii_case(&key.account)
        && association.user.eq_ignore_ascii_case(&key.user)
        && association.cluster.eq_ignore_ascii_case(&key.cluster)
        && (partition.is_empty() || association.partition.eq_ignore_ascii_case(partition))
}

/// [`AssociationManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct AssociationAdapter {
    base: BaseManager,
}

impl AssociationAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Association, version, wire, defaults),
        }
    }

    /// Validates account and user, then fills the default cluster.
    fn resolve(&self, key: &AssociationKey) -> SlurmResult<AssociationKey> {
        self.base.require_field("account", &key.account)?;
        self.base.require_field("user", &key.user)?;
        let cluster = self.base.cluster_or_default(&key.cluster);
        self.base.require_field("cluster", &cluster)?;
        Ok(AssociationKey {
            cluster,
            ..key.clone()
        })
    }
}

#[async_trait]
impl AssociationManager for AssociationAdapter {
    async fn list(
        &self,
        ctx: &Context,
        opts: &AssociationListOptions,
    ) -> SlurmResult<AssociationList> {
        let wire = self.base.begin(ctx, Operation::List)?;

        let mut request = WireRequest::get(self.base.path(Api::Slurmdb, "associations"));
        for (key, values) in [
            ("account", &opts.accounts),
            ("user", &opts.users),
            ("cluster", &opts.clusters),
            ("partition", &opts.partitions),
        ] {
            if !values.is_empty() {
                request = request.with_query(key, values.join(","));
            }
        }

        let body = wire.execute(ctx, request).await?;
        let associations = WireAssociation::decode(self.base.version(), &body)?
            .into_iter()
            .map(Association::from)
            .collect();
        Ok(filter_page(associations, |a| opts.matches(a), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, key: &AssociationKey) -> SlurmResult<Association> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        let key = self.resolve(key)?;

        let request = with_key(
            WireRequest::get(self.base.path(Api::Slurmdb, "association")),
            &key,
        );
        let body = wire.execute(ctx, request).await?;
        let matching = WireAssociation::decode(self.base.version(), &body)?
            .into_iter()
            .map(Association::from)
            .filter(|a| identifies(&key, a))
            .collect();
        first_or_not_found(matching, || {
            format!("association {}/{}@{}", key.account, key.user, key.cluster)
        })
    }

    async fn create(
        &self,
        ctx: &Context,
        association: &AssociationCreate,
    ) -> SlurmResult<AssociationKey> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        let key = self.resolve(&association.key())?;

        let fields = AssociationUpdate {
            parent_account: association.parent_account.clone(),
            qos: (!association.qos.is_empty()).then(|| association.qos.clone()),
            default_qos: association.default_qos.clone(),
        };
        let body = body(self.base.version(), &key, &fields)?;
        let path = self.base.path(Api::Slurmdb, "associations");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(key)
    }

    async fn update(
        &self,
        ctx: &Context,
        key: &AssociationKey,
        update: &AssociationUpdate,
    ) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        let key = self.resolve(key)?;
        self.base.require_changes(update.is_empty())?;

        let body = body(self.base.version(), &key, update)?;
        let path = self.base.path(Api::Slurmdb, "associations");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, key: &AssociationKey) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        let key = self.resolve(key)?;

        let request = with_key(
            WireRequest::delete(self.base.path(Api::Slurmdb, "association")),
            &key,
        );
        wire.execute(ctx, request).await?;
        Ok(())
    }
}
