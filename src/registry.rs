//! Version registry: builds the adapter family for one wire version.

use std::sync::Arc;

use tracing::debug;

use crate::adapter::{
    AccountAdapter, AssociationAdapter, ClusterAdapter, InfoAdapter, JobAdapter, NodeAdapter,
    PartitionAdapter, QoSAdapter, ReservationAdapter, UserAdapter, WCKeyAdapter,
};
use crate::config::Defaults;
use crate::version::ApiVersion;
use crate::wire::WireClient;

/// Every entity adapter bound to the same version, wire client and defaults.
#[derive(Debug, Clone)]
pub struct AdapterSet {
    pub version: ApiVersion,
    pub jobs: JobAdapter,
    pub nodes: NodeAdapter,
    pub partitions: PartitionAdapter,
    pub reservations: ReservationAdapter,
    pub qos: QoSAdapter,
    pub accounts: AccountAdapter,
    pub users: UserAdapter,
    pub associations: AssociationAdapter,
    pub clusters: ClusterAdapter,
    pub wckeys: WCKeyAdapter,
    pub info: InfoAdapter,
}

impl AdapterSet {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        debug!(%version, connected = wire.is_some(), "building adapters");
        Self {
            version,
            jobs: JobAdapter::new(version, wire.clone(), defaults.clone()),
            nodes: NodeAdapter::new(version, wire.clone(), defaults.clone()),
            partitions: PartitionAdapter::new(version, wire.clone(), defaults.clone()),
            reservations: ReservationAdapter::new(version, wire.clone(), defaults.clone()),
            qos: QoSAdapter::new(version, wire.clone(), defaults.clone()),
            accounts: AccountAdapter::new(version, wire.clone(), defaults.clone()),
            users: UserAdapter::new(version, wire.clone(), defaults.clone()),
            associations: AssociationAdapter::new(version, wire.clone(), defaults.clone()),
            clusters: ClusterAdapter::new(version, wire.clone(), defaults.clone()),
            wckeys: WCKeyAdapter::new(version, wire.clone(), defaults.clone()),
            info: InfoAdapter::new(version, wire, defaults),
        }
    }

    /// Adapters without a wire client. Every operation the version supports
    /// fails with `ClientNotInitialized`; unsupported ones still fail with
    /// `UnsupportedOperation`.
    pub fn detached(version: ApiVersion) -> Self {
        Self::new(version, None, Arc::new(Defaults::default()))
    }
}
