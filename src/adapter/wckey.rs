use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{WCKeyManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{WCKey, WCKeyCreate, WCKeyList, WCKeyListOptions};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::WCKeyInfo;
use crate::wire::{WireClient, decode_as, encode, text, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44};

/// A wckey record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireWCKey {
    V40(v0_0_40::WCKeyInfo),
    V41(v0_0_41::WCKeyInfo),
    V42(v0_0_42::WCKeyInfo),
    V43(v0_0_43::WCKeyInfo),
    V44(v0_0_44::WCKeyInfo),
}

impl WireWCKey {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "wckeys", WireWCKey::V40),
            ApiVersion::V0_0_41 => decode_as(body, "wckeys", WireWCKey::V41),
            ApiVersion::V0_0_42 => decode_as(body, "wckeys", WireWCKey::V42),
            ApiVersion::V0_0_43 => decode_as(body, "wckeys", WireWCKey::V43),
            ApiVersion::V0_0_44 => decode_as(body, "wckeys", WireWCKey::V44),
        }
    }
}

impl From<WireWCKey> for WCKey {
    fn from(wire: WireWCKey) -> Self {
        let (WireWCKey::V40(k)
        | WireWCKey::V41(k)
        | WireWCKey::V42(k)
        | WireWCKey::V43(k)
        | WireWCKey::V44(k)) = wire;
        WCKey {
            id: k.id.unwrap_or(0),
            name: text(&k.name),
            user: text(&k.user),
            cluster: text(&k.cluster),
        }
    }
}

/// [`WCKeyManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct WCKeyAdapter {
    base: BaseManager,
}

impl WCKeyAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::WCKey, version, wire, defaults),
        }
    }
}

#[async_trait]
impl WCKeyManager for WCKeyAdapter {
    async fn list(&self, ctx: &Context, opts: &WCKeyListOptions) -> SlurmResult<WCKeyList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurmdb, "wckeys");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let wckeys = WireWCKey::decode(self.base.version(), &body)?
            .into_iter()
            .map(WCKey::from)
            .collect();
        Ok(filter_page(wckeys, |k| opts.matches(k), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, id: u32) -> SlurmResult<WCKey> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_id("id", id)?;

        let path = self.base.path(Api::Slurmdb, &format!("wckey/{id}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let wckeys = WireWCKey::decode(self.base.version(), &body)?;
        first_or_not_found(wckeys, || format!("wckey {id}")).map(WCKey::from)
    }

    async fn create(&self, ctx: &Context, wckey: &WCKeyCreate) -> SlurmResult<String> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        self.base.require_name(&wckey.name)?;
        self.base.require_field("user", &wckey.user)?;
        self.base.require_field("cluster", &wckey.cluster)?;

        let info = WCKeyInfo {
            id: None,
            name: Some(wckey.name.clone()),
            user: Some(wckey.user.clone()),
            cluster: Some(wckey.cluster.clone()),
        };
        let body = json!({ "wckeys": [encode(&info)?] });
        let path = self.base.path(Api::Slurmdb, "wckeys");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(wckey.name.clone())
    }

    async fn delete(&self, ctx: &Context, id: u32) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_id("id", id)?;

        let path = self.base.path(Api::Slurmdb, &format!("wckey/{id}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::wired;
    use crate::error::ErrorKind;
    use crate::transport::Method;

    #[tokio::test]
    async fn test_get_by_id() {
        let (mock, wire) = wired(ApiVersion::V0_0_40);
        mock.on(
            Method::Get,
            "/slurmdb/v0.0.40/wckey/7",
            200,
            json!({"wckeys": [{"id": 7, "name": "climate", "user": "alice", "cluster": "linux"}]}),
        );
        let adapter = WCKeyAdapter::new(ApiVersion::V0_0_40, Some(wire), Default::default());
        let key = adapter.get(&Context::background(), 7).await.unwrap();
        assert_eq!(key.name, "climate");
        assert_eq!(key.user, "alice");

        let err = adapter.get(&Context::background(), 0).await.unwrap_err();
        assert_eq!(err.to_string(), "validation error: wckey id is required");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_create_fields() {
        let (mock, wire) = wired(ApiVersion::V0_0_43);
        mock.on(Method::Post, "/slurmdb/v0.0.43/wckeys", 200, json!({}));
        let adapter = WCKeyAdapter::new(ApiVersion::V0_0_43, Some(wire), Default::default());
        let ctx = Context::background();

        let mut wckey = WCKeyCreate {
            name: "climate".into(),
            user: "alice".into(),
            cluster: String::new(),
        };
        let err = adapter.create(&ctx, &wckey).await.unwrap_err();
        assert_eq!(err.to_string(), "validation error: wckey cluster is required");

        wckey.cluster = "linux".into();
        assert_eq!(adapter.create(&ctx, &wckey).await.unwrap(), "climate");
        assert_eq!(
            mock.calls()[0].body,
            Some(json!({"wckeys": [{"name": "climate", "user": "alice", "cluster": "linux"}]}))
        );
    }

    #[tokio::test]
    async fn test_delete_unsupported_before_v43() {
        let (mock, wire) = wired(ApiVersion::V0_0_41);
        let adapter = WCKeyAdapter::new(ApiVersion::V0_0_41, Some(wire), Default::default());
        let err = adapter.delete(&Context::background(), 7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        assert_eq!(mock.call_count(), 0);
    }
}
