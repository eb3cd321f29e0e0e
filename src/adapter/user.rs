use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{UserManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{User, UserAssociation, UserCreate, UserList, UserListOptions, UserUpdate};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::{UserDefault, UserInfo};
use crate::wire::{WireClient, decode_as, encode, text, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44};

/// A user record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireUser {
    V40(v0_0_40::UserInfo),
    V41(v0_0_41::UserInfo),
    V42(v0_0_42::UserInfo),
    V43(v0_0_43::UserInfo),
    V44(v0_0_44::UserInfo),
}

impl WireUser {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "users", WireUser::V40),
            ApiVersion::V0_0_41 => decode_as(body, "users", WireUser::V41),
            ApiVersion::V0_0_42 => decode_as(body, "users", WireUser::V42),
            ApiVersion::V0_0_43 => decode_as(body, "users", WireUser::V43),
            ApiVersion::V0_0_44 => decode_as(body, "users", WireUser::V44),
        }
    }
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        let (WireUser::V40(u)
        | WireUser::V41(u)
        | WireUser::V42(u)
        | WireUser::V43(u)
        | WireUser::V44(u)) = wire;
        let default = u.default.unwrap_or_default();
        User {
            name: text(&u.name),
            default_account: text(&default.account),
            default_wckey: text(&default.wckey),
            admin_level: u
                .administrator_level
                .and_then(|levels| levels.into_iter().next())
                .unwrap_or_default(),
            associations: u
                .associations
                .unwrap_or_default()
                .into_iter()
                .map(|a| UserAssociation {
                    account: text(&a.account),
                    cluster: text(&a.cluster),
                    partition: text(&a.partition),
                })
                .collect(),
        }
    }
}

fn user_info(
    name: &str,
    default_account: &Option<String>,
    default_wckey: &Option<String>,
    admin_level: &Option<String>,
) -> UserInfo {
    let default = (default_account.is_some() || default_wckey.is_some()).then(|| UserDefault {
        account: default_account.clone(),
        wckey: default_wckey.clone(),
    });
    UserInfo {
        name: Some(name.to_string()),
        default,
        administrator_level: admin_level.clone().map(|level| vec![level]),
        associations: None,
    }
}

fn users_body(user: &UserInfo) -> SlurmResult<Value> {
    Ok(json!({ "users": [encode(user)?] }))
}

/// [`UserManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct UserAdapter {
    base: BaseManager,
}

impl UserAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::User, version, wire, defaults),
        }
    }
}

#[async_trait]
impl UserManager for UserAdapter {
    async fn list(&self, ctx: &Context, opts: &UserListOptions) -> SlurmResult<UserList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurmdb, "users");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let users = WireUser::decode(self.base.version(), &body)?
            .into_iter()
            .map(User::from)
            .collect();
        Ok(filter_page(users, |u| opts.matches(u), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<User> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("user/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let users = WireUser::decode(self.base.version(), &body)?;
        first_or_not_found(users, || format!("user {name}")).map(User::from)
    }

    async fn create(&self, ctx: &Context, user: &UserCreate) -> SlurmResult<String> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        self.base.require_name(&user.name)?;

        let body = users_body(&user_info(
            &user.name,
            &user.default_account,
            &user.default_wckey,
            &user.admin_level,
        ))?;
        let path = self.base.path(Api::Slurmdb, "users");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(user.name.clone())
    }

    async fn update(&self, ctx: &Context, name: &str, update: &UserUpdate) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        self.base.require_name(name)?;
        self.base.require_changes(update.is_empty())?;

        let body = users_body(&user_info(
            name,
            &update.default_account,
            &update.default_wckey,
            &update.admin_level,
        ))?;
        let path = self.base.path(Api::Slurmdb, "users");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurmdb, &format!("user/{name}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }
}
