//! Entity managers and their version-adapting implementations.
//!
//! Each manager trait is the stable surface for one entity. It exposes an
//! operation if at least one wire version supports it; an adapter bound to
//! a version that lacks the operation refuses it with
//! [`SlurmError::UnsupportedOperation`](crate::SlurmError::UnsupportedOperation)
//! before touching the context, the client or the input.
//!
//! Every adapter follows the same flow:
//!
//! ```text
//!   begin() ──→ validate input ──→ encode(version) ──→ execute ──→ decode(version) ──→ convert
//!  (base.rs)                        (wire::vX)                      (WireX::VXX)      (shared)
//! ```
//!
//! Decoding tags every wire record with its version (`WireJob::V42(..)`);
//! one total converter per entity turns any variant into the domain type.
//! List operations re-apply every filter client side, then paginate.
//!
//! | Manager | Operations | Watch |
//! |---------|------------|-------|
//! | [`JobManager`] | list, get, create, update, delete | yes |
//! | [`NodeManager`] | list, get, update, delete | yes |
//! | [`PartitionManager`] | list, get | yes |
//! | [`ReservationManager`] | list, get, create, update, delete | no |
//! | [`QoSManager`] | list, get, create, update, delete | no |
//! | [`AccountManager`] | list, get, create, update, delete | no |
//! | [`UserManager`] | list, get, create, update, delete | no |
//! | [`AssociationManager`] | list, get, create, update, delete | no |
//! | [`ClusterManager`] | list, get, create, delete | no |
//! | [`WCKeyManager`] | list, get, create, delete | no |

mod account;
mod association;
mod cluster;
mod info;
mod job;
mod node;
mod partition;
mod qos;
mod reservation;
mod user;
mod wckey;

pub use account::{AccountAdapter, WireAccount};
pub use association::{AssociationAdapter, WireAssociation};
pub use cluster::{ClusterAdapter, WireCluster};
pub use info::{InfoAdapter, WirePing, WireTres};
pub use job::{JobAdapter, WireJob};
pub use node::{NodeAdapter, WireNode};
pub use partition::{PartitionAdapter, WirePartition};
pub use qos::{QoSAdapter, WireQoS};
pub use reservation::{ReservationAdapter, WireReservation};
pub use user::{UserAdapter, WireUser};
pub use wckey::{WCKeyAdapter, WireWCKey};

use async_trait::async_trait;

use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::*;
use crate::watch::{EventStream, WatchOptions};

/// Jobs on the controller.
#[async_trait]
pub trait JobManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &JobListOptions) -> SlurmResult<JobList>;

    /// Fails with `NotFound` if the controller does not know the job.
    async fn get(&self, ctx: &Context, id: u32) -> SlurmResult<Job>;

    /// Submit a job. The server assigns the id.
    async fn create(&self, ctx: &Context, job: &JobCreate) -> SlurmResult<JobSubmitResponse>;

    async fn update(&self, ctx: &Context, id: u32, update: &JobUpdate) -> SlurmResult<()>;

    /// Cancel a job.
    async fn delete(&self, ctx: &Context, id: u32) -> SlurmResult<()>;

    /// Poll for job changes matching `opts` (pagination ignored).
    async fn watch(
        &self,
        ctx: &Context,
        opts: &JobListOptions,
        watch: WatchOptions,
    ) -> SlurmResult<EventStream<Job>>;
}

/// Compute nodes. Node state is changed through `update`.
#[async_trait]
pub trait NodeManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &NodeListOptions) -> SlurmResult<NodeList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Node>;
    async fn update(&self, ctx: &Context, name: &str, update: &NodeUpdate) -> SlurmResult<()>;
    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()>;
    async fn watch(
        &self,
        ctx: &Context,
        opts: &NodeListOptions,
        watch: WatchOptions,
    ) -> SlurmResult<EventStream<Node>>;
}

/// Partitions; read-only in every supported version.
#[async_trait]
pub trait PartitionManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &PartitionListOptions) -> SlurmResult<PartitionList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Partition>;
    async fn watch(
        &self,
        ctx: &Context,
        opts: &PartitionListOptions,
        watch: WatchOptions,
    ) -> SlurmResult<EventStream<Partition>>;
}

/// Advance reservations. Mutation needs v0.0.43 or later.
#[async_trait]
pub trait ReservationManager: Send + Sync {
    async fn list(
        &self,
        ctx: &Context,
        opts: &ReservationListOptions,
    ) -> SlurmResult<ReservationList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Reservation>;

    /// Returns the reservation name.
    async fn create(&self, ctx: &Context, reservation: &ReservationCreate) -> SlurmResult<String>;
    async fn update(
        &self,
        ctx: &Context,
        name: &str,
        update: &ReservationUpdate,
    ) -> SlurmResult<()>;
    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()>;
}

#[async_trait]
pub trait QoSManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &QoSListOptions) -> SlurmResult<QoSList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<QoS>;
    async fn create(&self, ctx: &Context, qos: &QoSCreate) -> SlurmResult<String>;
    async fn update(&self, ctx: &Context, name: &str, update: &QoSUpdate) -> SlurmResult<()>;
    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()>;
}

#[async_trait]
pub trait AccountManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &AccountListOptions) -> SlurmResult<AccountList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Account>;
    async fn create(&self, ctx: &Context, account: &AccountCreate) -> SlurmResult<String>;
    async fn update(&self, ctx: &Context, name: &str, update: &AccountUpdate) -> SlurmResult<()>;
    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()>;
}

#[async_trait]
pub trait UserManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &UserListOptions) -> SlurmResult<UserList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<User>;
    async fn create(&self, ctx: &Context, user: &UserCreate) -> SlurmResult<String>;
    async fn update(&self, ctx: &Context, name: &str, update: &UserUpdate) -> SlurmResult<()>;
    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()>;
}

/// Associations are addressed by [`AssociationKey`]; an empty cluster in a
/// key or create request is replaced by the configured default.
#[async_trait]
pub trait AssociationManager: Send + Sync {
    async fn list(
        &self,
        ctx: &Context,
        opts: &AssociationListOptions,
    ) -> SlurmResult<AssociationList>;
    async fn get(&self, ctx: &Context, key: &AssociationKey) -> SlurmResult<Association>;

    /// Returns the key actually created, cluster default applied.
    async fn create(
        &self,
        ctx: &Context,
        association: &AssociationCreate,
    ) -> SlurmResult<AssociationKey>;
    async fn update(
        &self,
        ctx: &Context,
        key: &AssociationKey,
        update: &AssociationUpdate,
    ) -> SlurmResult<()>;
    async fn delete(&self, ctx: &Context, key: &AssociationKey) -> SlurmResult<()>;
}

/// Clusters in the accounting database. There is no update in any version.
#[async_trait]
pub trait ClusterManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &ClusterListOptions) -> SlurmResult<ClusterList>;
    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Cluster>;
    async fn create(&self, ctx: &Context, cluster: &ClusterCreate) -> SlurmResult<String>;
    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()>;
}

/// Workload characterization keys, addressed by numeric id.
#[async_trait]
pub trait WCKeyManager: Send + Sync {
    async fn list(&self, ctx: &Context, opts: &WCKeyListOptions) -> SlurmResult<WCKeyList>;
    async fn get(&self, ctx: &Context, id: u32) -> SlurmResult<WCKey>;

    /// Returns the wckey name.
    async fn create(&self, ctx: &Context, wckey: &WCKeyCreate) -> SlurmResult<String>;
    async fn delete(&self, ctx: &Context, id: u32) -> SlurmResult<()>;
}

/// First element of a decoded list, or `NotFound`.
pub(crate) fn first_or_not_found<T>(items: Vec<T>, what: impl FnOnce() -> String) -> SlurmResult<T> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| crate::error::SlurmError::NotFound(format!("{} not found", what())))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::transport::MockTransport;
    use crate::version::ApiVersion;
    use crate::wire::WireClient;

    /// A mock transport and a wire client speaking `version` through it.
    pub fn wired(version: ApiVersion) -> (MockTransport, WireClient) {
        let mock = MockTransport::new();
        let wire = WireClient::new(Arc::new(mock.clone()), version);
        (mock, wire)
    }

    /// No wire client, as built by `AdapterSet::detached`.
    pub fn detached() -> Option<WireClient> {
        None
    }
}
