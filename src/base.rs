//! Preconditions shared by every adapter.
//!
//! Before any wire call an adapter runs, in order:
//!
//! | Step | Check | Error |
//! |------|-------|-------|
//! | 0 | operation in the version's capability matrix | `UnsupportedOperation` |
//! | 1 | context neither cancelled nor expired | `ContextRequired` |
//! | 2 | adapter bound to a wire client | `ClientNotInitialized` |
//! | 3 | identity strings non-empty | `Validation` naming the field |
//! | 4 | entity-specific structure, non-empty updates | `Validation` |
//!
//! Steps 0 to 2 are [`BaseManager::begin`]; steps 3 and 4 run after it, so a
//! caller never sees a validation error from an adapter that could not have
//! sent the request anyway.

use std::sync::Arc;

use tracing::debug;

use crate::capability::{Capabilities, Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::{SlurmError, SlurmResult};
use crate::model::ListResult;
use crate::version::{Api, ApiVersion};
use crate::wire::WireClient;

/// Version, wire client and defaults common to one entity adapter.
#[derive(Debug, Clone)]
pub struct BaseManager {
    entity: Entity,
    version: ApiVersion,
    wire: Option<WireClient>,
    defaults: Arc<Defaults>,
}

impl BaseManager {
    pub fn new(
        entity: Entity,
        version: ApiVersion,
        wire: Option<WireClient>,
        defaults: Arc<Defaults>,
    ) -> Self {
        Self {
            entity,
            version,
            wire,
            defaults,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        Capabilities::for_version(self.version)
    }

    /// Versioned path for `resource`.
    pub fn path(&self, api: Api, resource: &str) -> String {
        self.version.path(api, resource)
    }

    /// Capability, context and client checks; yields the wire client.
    pub fn begin(&self, ctx: &Context, op: Operation) -> SlurmResult<&WireClient> {
        self.capabilities().require(self.entity, op)?;
        let wire = self.connect(ctx)?;
        debug!(
            version = %self.version,
            entity = %self.entity,
            operation = %op,
            "adapter call"
        );
        Ok(wire)
    }

    /// Context and client checks only, for calls outside the capability
    /// matrix such as `ping`.
    pub fn connect(&self, ctx: &Context) -> SlurmResult<&WireClient> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }
        self.wire.as_ref().ok_or_else(|| {
            SlurmError::ClientNotInitialized(format!(
                "{} adapter for {} has no wire client",
                self.entity, self.version
            ))
        })
    }

    /// Fails with `"<entity> <field> is required"` when `value` is blank.
    pub fn require_field(&self, field: &str, value: &str) -> SlurmResult<()> {
        if value.trim().is_empty() {
            return Err(SlurmError::validation(format!(
                "{} {field} is required",
                self.entity
            )));
        }
        Ok(())
    }

    /// Shorthand for `require_field("name", name)`.
    pub fn require_name(&self, name: &str) -> SlurmResult<()> {
        self.require_field("name", name)
    }

    /// Fails with `"<entity> <field> is required"` when `id` is zero.
    pub fn require_id(&self, field: &str, id: u32) -> SlurmResult<()> {
        if id == 0 {
            return Err(SlurmError::validation(format!(
                "{} {field} is required",
                self.entity
            )));
        }
        Ok(())
    }

    /// Rejects an update with no populated field.
    pub fn require_changes(&self, is_empty: bool) -> SlurmResult<()> {
        if is_empty {
            return Err(SlurmError::validation(format!(
                "{} update must contain at least one field",
                self.entity
            )));
        }
        Ok(())
    }

    /// The cluster to use: `cluster` unless blank, else the configured default.
    pub fn cluster_or_default(&self, cluster: &str) -> String {
        if cluster.trim().is_empty() {
            self.defaults.cluster.clone()
        } else {
            cluster.to_string()
        }
    }
}

/// Zero-based `offset`, optional `limit`.
///
/// `total` is always the length of `items` before paging, so an offset past
/// the end yields no items and the full total.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> ListResult<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    ListResult { items, total }
}

/// Re-apply `keep` client side, then paginate.
pub fn filter_page<T>(
    items: Vec<T>,
    keep: impl Fn(&T) -> bool,
    offset: usize,
    limit: Option<usize>,
) -> ListResult<T> {
    let filtered: Vec<T> = items.into_iter().filter(|item| keep(item)).collect();
    paginate(filtered, offset, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::MockTransport;

    fn manager(entity: Entity, version: ApiVersion, wired: bool) -> BaseManager {
        let wire = wired.then(|| WireClient::new(Arc::new(MockTransport::new()), version));
        BaseManager::new(entity, version, wire, Arc::new(Defaults::default()))
    }

    #[test]
    fn test_paginate() {
        let page = paginate((1..=10).collect(), 2, Some(3));
        assert_eq!(page.items, vec![3, 4, 5]);
        assert_eq!(page.total, 10);

        let page = paginate((1..=10).collect::<Vec<_>>(), 8, None);
        assert_eq!(page.items, vec![9, 10]);
    }

    #[test]
    fn test_paginate_past_end() {
        let page = paginate(vec!["a", "b"], 5, Some(10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_total_counts_filtered_items() {
        let page = filter_page((1..=10).collect(), |n| n % 2 == 0, 10, None);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_capability_checked_first() {
        let base = manager(Entity::Node, ApiVersion::V0_0_41, false);
        let ctx = Context::background();
        ctx.cancel();
        let err = base.begin(&ctx, Operation::List).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_context_before_client() {
        let base = manager(Entity::Account, ApiVersion::V0_0_43, false);
        let ctx = Context::background();
        ctx.cancel();
        let err = base.begin(&ctx, Operation::Get).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextRequired);
        assert!(err.to_string().contains("context is required"));

        let err = base.begin(&Context::background(), Operation::Get).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientNotInitialized);
        assert!(err.to_string().contains("client not initialized"));
    }

    #[test]
    fn test_begin_yields_client() {
        let base = manager(Entity::Job, ApiVersion::V0_0_42, true);
        let wire = base.begin(&Context::background(), Operation::List).unwrap();
        assert_eq!(wire.version(), ApiVersion::V0_0_42);
    }

    #[test]
    fn test_field_validators() {
        let base = manager(Entity::Reservation, ApiVersion::V0_0_43, true);
        let err = base.require_name("  ").unwrap_err();
        assert_eq!(err.to_string(), "validation error: reservation name is required");
        assert!(base.require_name("maint").is_ok());

        let err = base.require_changes(true).unwrap_err();
        assert!(err.to_string().contains("at least one field"));

        let base = manager(Entity::Job, ApiVersion::V0_0_43, true);
        assert!(base.require_id("id", 0).is_err());
        assert!(base.require_id("id", 42).is_ok());
    }

    #[test]
    fn test_cluster_default() {
        let base = manager(Entity::Association, ApiVersion::V0_0_43, true);
        assert_eq!(base.cluster_or_default(""), "linux");
        assert_eq!(base.cluster_or_default("gpu-cluster"), "gpu-cluster");
    }
}
