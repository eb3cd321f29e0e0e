use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{AccountManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{Account, AccountCreate, AccountList, AccountListOptions, AccountUpdate};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::{AccountInfo, Coordinator};
use crate::wire::{WireClient, decode_as, encode, text, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44};

/// An account record as decoded from one wire version.
///
/// The account shape has not changed since v0.0.40; the tag still records
/// which version produced it.
#[derive(Debug, Clone)]
pub enum WireAccount {
    V40(v0_0_40::AccountInfo),
    V41(v0_0_41::AccountInfo),
    V42(v0_0_42::AccountInfo),
    V43(v0_0_43::AccountInfo),
    V44(v0_0_44::AccountInfo),
}

impl WireAccount {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "accounts", WireAccount::V40),
            ApiVersion::V0_0_41 => decode_as(body, "accounts", WireAccount::V41),
            ApiVersion::V0_0_42 => decode_as(body, "accounts", WireAccount::V42),
            ApiVersion::V0_0_43 => decode_as(body, "accounts", WireAccount::V43),
            ApiVersion::V0_0_44 => decode_as(body, "accounts", WireAccount::V44),
        }
    }
}

impl From<WireAccount> for Account {
    fn from(wire: WireAccount) -> Self {
        let (WireAccount::V40(a)
        | WireAccount::V41(a)
        | WireAccount::V42(a)
        | WireAccount::V43(a)
        | WireAccount::V44(a)) = wire;
        Account {
            name: text(&a.name),
            description: text(&a.description),
            organization: text(&a.organization),
            coordinators: a
                .coordinators
                .unwrap_or_default()
                .into_iter()
                .map(|c| c.name)
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }
}

fn coordinators(names: &[String]) -> Vec<Coordinator> {
    names
        .iter()
        .map(|name| Coordinator {
            name: name.clone(),
            direct: true,
        })
        .collect()
}

fn accounts_body(account: &AccountInfo) -> SlurmResult<Value> {
    Ok(json!({ "accounts": [encode(account)?] }))
}

/// [`AccountManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct AccountAdapter {
    base: BaseManager,
}

impl AccountAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Account, version, wire, defaults),
        }
    }
}

#[async_trait]
impl AccountManager for AccountAdapter {
    async fn list(&self, ctx: &Context, opts: &AccountListOptions) -> SlurmResult<AccountList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurmdb, "accounts");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let accounts = WireAccount::decode(self.base.version(), &body)?
            .into_iter()
            .map(Account::from)
            .collect();
        Ok(filter_page(accounts, |a| opts.matches(a), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Account> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("account/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let accounts = WireAccount::decode(self.base.version(), &body)?;
        first_or_not_found(accounts, || format!("account {name}")).map(Account::from)
    }

    async fn create(&self, ctx: &Context, account: &AccountCreate) -> SlurmResult<String> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        self.base.require_name(&account.name)?;

        let body = accounts_body(&AccountInfo {
            name: Some(account.name.clone()),
            description: account.description.clone(),
            organization: account.organization.clone(),
            coordinators: (!account.coordinators.is_empty())
                .then(|| coordinators(&account.coordinators)),
        })?;
        let path = self.base.path(Api::Slurmdb, "accounts");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(account.name.clone())
    }

    async fn update(&self, ctx: &Context, name: &str, update: &AccountUpdate) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        self.base.require_name(name)?;
        self.base.require_changes(update.is_empty())?;

        let body = accounts_body(&AccountInfo {
            name: Some(name.to_string()),
            description: update.description.clone(),
            organization: update.organization.clone(),
            coordinators: update.coordinators.as_deref().map(coordinators),
        })?;
        let path = self.base.path(Api::Slurmdb, "accounts");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("account/{name}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::{detached, wired};
    use crate::error::ErrorKind;
    use crate::transport::Method;

    #[test]
    fn test_coordinator_names() {
        let body = json!({"accounts": [{
            "name": "physics",
            "organization": "science",
            "coordinators": [{"name": "alice", "direct": true}, {"name": ""}]
        }]});
        let a = Account::from(WireAccount::decode(ApiVersion::V0_0_42, &body).unwrap().remove(0));
        assert_eq!(a.coordinators, vec!["alice"]);
        assert_eq!(a.organization, "science");
        assert!(a.description.is_empty());
    }

    #[tokio::test]
    async fn test_create_and_update_bodies() {
        let (mock, wire) = wired(ApiVersion::V0_0_41);
        mock.on(Method::Post, "/slurmdb/v0.0.41/accounts", 200, json!({}));
        let adapter = AccountAdapter::new(ApiVersion::V0_0_41, Some(wire), Default::default());
        let ctx = Context::background();

        let account = AccountCreate {
            name: "physics".into(),
            description: Some("Physics dept".into()),
            coordinators: vec!["alice".into()],
            ..AccountCreate::default()
        };
        assert_eq!(adapter.create(&ctx, &account).await.unwrap(), "physics");

        let update = AccountUpdate {
            organization: Some("science".into()),
            ..AccountUpdate::default()
        };
        adapter.update(&ctx, "physics", &update).await.unwrap();

        let calls = mock.calls();
        assert_eq!(
            calls[0].body,
            Some(json!({"accounts": [{
                "name": "physics",
                "description": "Physics dept",
                "coordinators": [{"name": "alice", "direct": true}]
            }]}))
        );
        assert_eq!(
            calls[1].body,
            Some(json!({"accounts": [{"name": "physics", "organization": "science"}]}))
        );
    }

    #[tokio::test]
    async fn test_preconditions_in_order() {
        let adapter = AccountAdapter::new(ApiVersion::V0_0_40, detached(), Default::default());
        let cancelled = Context::background();
        cancelled.cancel();

        let err = adapter.get(&cancelled, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextRequired);
        let err = adapter.get(&Context::background(), "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientNotInitialized);

        let (mock, wire) = wired(ApiVersion::V0_0_40);
        let adapter = AccountAdapter::new(ApiVersion::V0_0_40, Some(wire), Default::default());
        let err = adapter.delete(&Context::background(), " ").await.unwrap_err();
        assert_eq!(err.to_string(), "validation error: account name is required");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_by_organization() {
        let (mock, wire) = wired(ApiVersion::V0_0_44);
        mock.on(
            Method::Get,
            "/slurmdb/v0.0.44/accounts",
            200,
            json!({"accounts": [
                {"name": "root", "organization": "root"},
                {"name": "physics", "organization": "Science"},
                {"name": "chemistry", "organization": "science"}
            ]}),
        );
        let adapter = AccountAdapter::new(ApiVersion::V0_0_44, Some(wire), Default::default());
        let opts = AccountListOptions {
            organizations: vec!["science".into()],
            limit: Some(1),
            ..AccountListOptions::default()
        };
        let page = adapter.list(&Context::background(), &opts).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "physics");
    }
}
