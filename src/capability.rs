//! Per-version capability introspection.
//!
//! Each wire version exposes a fixed subset of operations per entity. An
//! operation missing from the matrix either returns HTTP 405 on that
//! version or was never implemented server-side, so adapters refuse it
//! up front with [`SlurmError::UnsupportedOperation`] instead of probing.
//!
//! The matrix is static and pinned to the version:
//!
//! | Entity | v0.0.40 | v0.0.41 | v0.0.42 | v0.0.43 | v0.0.44 |
//! |---|---|---|---|---|---|
//! | Job | LGCUD | LGCUD | LGCUD | LGCUD | LGCUD |
//! | Node | LGUD | - | LGUD | LGUD | LGUD |
//! | Partition | LG | LG | LG | LG | LG |
//! | Reservation | LG | LG | LG | LGCUD | LGCUD |
//! | QoS | LGCD | LGCUD | LGCUD | LGCUD | LGCUD |
//! | Account / User / Association | LGCUD | LGCUD | LGCUD | LGCUD | LGCUD |
//! | Cluster | LG | LG | LG | LGCD | LGCD |
//! | TRES | L | L | L | L | L |
//! | WCKey | LG | LG | LG | LGCD | LGCD |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SlurmError, SlurmResult};
use crate::version::ApiVersion;

/// Domain entities managed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Job,
    Node,
    Partition,
    Reservation,
    QoS,
    Account,
    User,
    Association,
    Cluster,
    Tres,
    WCKey,
}

impl Entity {
    /// Human-readable name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Job => "job",
            Entity::Node => "node",
            Entity::Partition => "partition",
            Entity::Reservation => "reservation",
            Entity::QoS => "qos",
            Entity::Account => "account",
            Entity::User => "user",
            Entity::Association => "association",
            Entity::Cluster => "cluster",
            Entity::Tres => "tres",
            Entity::WCKey => "wckey",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations an adapter may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Operation::List => 1,
            Operation::Get => 1 << 1,
            Operation::Create => 1 << 2,
            Operation::Update => 1 << 3,
            Operation::Delete => 1 << 4,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Operation`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationSet(u8);

impl OperationSet {
    pub const NONE: OperationSet = OperationSet(0);
    pub const LIST: OperationSet = OperationSet(Operation::List.bit());
    pub const READ: OperationSet = OperationSet(Operation::List.bit() | Operation::Get.bit());
    pub const ALL: OperationSet = OperationSet(0b1_1111);

    /// Read operations plus `ops`.
    pub const fn read_and(ops: &[Operation]) -> Self {
        let mut bits = Self::READ.0;
        let mut i = 0;
        while i < ops.len() {
            bits |= ops[i].bit();
            i += 1;
        }
        OperationSet(bits)
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

const LGUD: OperationSet = OperationSet::read_and(&[Operation::Update, Operation::Delete]);
const LGCD: OperationSet = OperationSet::read_and(&[Operation::Create, Operation::Delete]);

/// The capability matrix of one wire version.
#[derive(Debug, Clone)]
pub struct Capabilities {
    version: ApiVersion,
    entries: [(Entity, OperationSet); 11],
}

static V0_0_40: Capabilities = Capabilities {
    version: ApiVersion::V0_0_40,
    entries: [
        (Entity::Job, OperationSet::ALL),
        (Entity::Node, LGUD),
        (Entity::Partition, OperationSet::READ),
        (Entity::Reservation, OperationSet::READ),
        (Entity::QoS, LGCD),
        (Entity::Account, OperationSet::ALL),
        (Entity::User, OperationSet::ALL),
        (Entity::Association, OperationSet::ALL),
        (Entity::Cluster, OperationSet::READ),
        (Entity::Tres, OperationSet::LIST),
        (Entity::WCKey, OperationSet::READ),
    ],
};

// Node payloads in v0.0.41 use inline structs that differ from every
// other version; node endpoints are not mapped there.
static V0_0_41: Capabilities = Capabilities {
    version: ApiVersion::V0_0_41,
    entries: [
        (Entity::Job, OperationSet::ALL),
        (Entity::Node, OperationSet::NONE),
        (Entity::Partition, OperationSet::READ),
        (Entity::Reservation, OperationSet::READ),
        (Entity::QoS, OperationSet::ALL),
        (Entity::Account, OperationSet::ALL),
        (Entity::User, OperationSet::ALL),
        (Entity::Association, OperationSet::ALL),
        (Entity::Cluster, OperationSet::READ),
        (Entity::Tres, OperationSet::LIST),
        (Entity::WCKey, OperationSet::READ),
    ],
};

static V0_0_42: Capabilities = Capabilities {
    version: ApiVersion::V0_0_42,
    entries: [
        (Entity::Job, OperationSet::ALL),
        (Entity::Node, LGUD),
        (Entity::Partition, OperationSet::READ),
        (Entity::Reservation, OperationSet::READ),
        (Entity::QoS, OperationSet::ALL),
        (Entity::Account, OperationSet::ALL),
        (Entity::User, OperationSet::ALL),
        (Entity::Association, OperationSet::ALL),
        (Entity::Cluster, OperationSet::READ),
        (Entity::Tres, OperationSet::LIST),
        (Entity::WCKey, OperationSet::READ),
    ],
};

static V0_0_43: Capabilities = Capabilities {
    version: ApiVersion::V0_0_43,
    entries: [
        (Entity::Job, OperationSet::ALL),
        (Entity::Node, LGUD),
        (Entity::Partition, OperationSet::READ),
        (Entity::Reservation, OperationSet::ALL),
        (Entity::QoS, OperationSet::ALL),
        (Entity::Account, OperationSet::ALL),
        (Entity::User, OperationSet::ALL),
        (Entity::Association, OperationSet::ALL),
        (Entity::Cluster, LGCD),
        (Entity::Tres, OperationSet::LIST),
        (Entity::WCKey, LGCD),
    ],
};

static V0_0_44: Capabilities = Capabilities {
    version: ApiVersion::V0_0_44,
    entries: [
        (Entity::Job, OperationSet::ALL),
        (Entity::Node, LGUD),
        (Entity::Partition, OperationSet::READ),
        (Entity::Reservation, OperationSet::ALL),
        (Entity::QoS, OperationSet::ALL),
        (Entity::Account, OperationSet::ALL),
        (Entity::User, OperationSet::ALL),
        (Entity::Association, OperationSet::ALL),
        (Entity::Cluster, LGCD),
        (Entity::Tres, OperationSet::LIST),
        (Entity::WCKey, LGCD),
    ],
};

impl Capabilities {
    /// The static matrix for `version`.
    pub fn for_version(version: ApiVersion) -> &'static Capabilities {
        match version {
            ApiVersion::V0_0_40 => &V0_0_40,
            ApiVersion::V0_0_41 => &V0_0_41,
            ApiVersion::V0_0_42 => &V0_0_42,
            ApiVersion::V0_0_43 => &V0_0_43,
            ApiVersion::V0_0_44 => &V0_0_44,
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Operations available for `entity`.
    pub fn operations(&self, entity: Entity) -> OperationSet {
        self.entries
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, ops)| *ops)
            .unwrap_or(OperationSet::NONE)
    }

    pub fn supports(&self, entity: Entity, op: Operation) -> bool {
        self.operations(entity).contains(op)
    }

    /// Fails with `UnsupportedOperation` if `op` is not in the matrix.
    pub fn require(&self, entity: Entity, op: Operation) -> SlurmResult<()> {
        if self.supports(entity, op) {
            Ok(())
        } else {
            Err(SlurmError::unsupported(
                format!("{entity} {op}"),
                self.version,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_every_version_has_a_matrix() {
        for version in ApiVersion::ALL {
            let caps = Capabilities::for_version(version);
            assert_eq!(caps.version(), version);
            assert!(caps.supports(Entity::Job, Operation::Create));
            assert!(caps.supports(Entity::Tres, Operation::List));
            assert!(!caps.supports(Entity::Tres, Operation::Get));
        }
    }

    #[test]
    fn test_partitions_are_read_only() {
        for version in ApiVersion::ALL {
            let caps = Capabilities::for_version(version);
            assert!(caps.supports(Entity::Partition, Operation::List));
            assert!(!caps.supports(Entity::Partition, Operation::Create));
            assert!(!caps.supports(Entity::Partition, Operation::Delete));
        }
    }

    #[test]
    fn test_nodes_missing_in_v0_0_41() {
        let caps = Capabilities::for_version(ApiVersion::V0_0_41);
        assert!(caps.operations(Entity::Node).is_empty());

        let err = caps.require(Entity::Node, Operation::List).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        assert_eq!(err.to_string(), "node list is not supported in v0.0.41");
    }

    #[test]
    fn test_reservation_mutation_from_v0_0_43() {
        let old = Capabilities::for_version(ApiVersion::V0_0_42);
        let new = Capabilities::for_version(ApiVersion::V0_0_43);
        assert!(!old.supports(Entity::Reservation, Operation::Create));
        assert!(new.supports(Entity::Reservation, Operation::Create));
        assert!(new.supports(Entity::Reservation, Operation::Update));
    }

    #[test]
    fn test_clusters_never_update() {
        for version in ApiVersion::ALL {
            let caps = Capabilities::for_version(version);
            assert!(!caps.supports(Entity::Cluster, Operation::Update));
        }
        let caps = Capabilities::for_version(ApiVersion::V0_0_44);
        assert!(caps.supports(Entity::Cluster, Operation::Create));
        assert!(caps.supports(Entity::Cluster, Operation::Delete));
    }

    #[test]
    fn test_operation_set() {
        assert!(OperationSet::READ.contains(Operation::Get));
        assert!(!OperationSet::READ.contains(Operation::Update));
        assert!(LGCD.contains(Operation::Create));
        assert!(!LGCD.contains(Operation::Update));
        assert!(OperationSet::NONE.is_empty());
    }
}
