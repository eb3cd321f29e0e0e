//! Version-independent domain model.
//!
//! Every entity is a flat value record. Wire data that is absent converts to
//! the zero value of the field (empty string, `0`, empty list, `None` for a
//! point in time), so callers never distinguish "absent" from "empty". An
//! empty identity (`name` or `id`) is a legal conversion result; callers
//! treat such an entity as unusable.
//!
//! Request shapes follow one convention: `*Create` carries the required
//! identity as a plain field and the rest as `Option`, `*Update` is all
//! `Option` and an update with no populated field is rejected.

mod account;
mod association;
mod cluster;
mod job;
mod node;
mod partition;
mod qos;
mod reservation;

pub use account::{Account, AccountCreate, AccountListOptions, AccountUpdate};
pub use account::{User, UserAssociation, UserCreate, UserListOptions, UserUpdate};
pub use association::{
    Association, AssociationCreate, AssociationKey, AssociationListOptions, AssociationUpdate,
};
pub use cluster::{Cluster, ClusterCreate, ClusterListOptions, ClusterStats, ControllerPing};
pub use cluster::{ServerInfo, ServerVersion};
pub use cluster::{Tres, WCKey, WCKeyCreate, WCKeyListOptions};
pub use job::{Job, JobCreate, JobListOptions, JobState, JobSubmitResponse, JobUpdate};
pub use node::{Node, NodeListOptions, NodeState, NodeUpdate};
pub use partition::{Partition, PartitionListOptions, PartitionState};
pub use qos::{QoS, QoSCreate, QoSLimits, QoSListOptions, QoSUpdate};
pub use reservation::{Reservation, ReservationCreate, ReservationListOptions, ReservationUpdate};

use serde::{Deserialize, Serialize};

/// One page of a list call.
///
/// `total` counts every entity that passed the filters, before pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> ListResult<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub type JobList = ListResult<Job>;
pub type NodeList = ListResult<Node>;
pub type PartitionList = ListResult<Partition>;
pub type ReservationList = ListResult<Reservation>;
pub type QoSList = ListResult<QoS>;
pub type AccountList = ListResult<Account>;
pub type UserList = ListResult<User>;
pub type AssociationList = ListResult<Association>;
pub type ClusterList = ListResult<Cluster>;
pub type TresList = ListResult<Tres>;
pub type WCKeyList = ListResult<WCKey>;

/// `true` if `filter` is empty or contains `value`, ignoring ASCII case.
pub(crate) fn matches_any(filter: &[String], value: &str) -> bool {
    filter.is_empty() || filter.iter().any(|f| f.eq_ignore_ascii_case(value))
}

/// `true` if `filter` is empty or shares an element with `values`.
pub(crate) fn overlaps(filter: &[String], values: &[String]) -> bool {
    filter.is_empty() || values.iter().any(|v| matches_any(filter, v))
}

/// `true` if `filter` is empty or contains `value`.
pub(crate) fn one_of<T: PartialEq>(filter: &[T], value: &T) -> bool {
    filter.is_empty() || filter.contains(value)
}

/// Declares a scheduler state enum.
///
/// Wire states are upper case strings; the first element of a wire state
/// array is the primary state. Unnamed values are kept in `Other`.
macro_rules! wire_state {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            #[default]
            Unknown,
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown => "UNKNOWN",
                    Self::Other(state) => state.as_str(),
                }
            }

            /// Primary state of a wire state array.
            pub fn from_wire(states: &[String]) -> Self {
                states
                    .first()
                    .map(|s| Self::from(s.as_str()))
                    .unwrap_or_default()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                let upper = value.trim().to_ascii_uppercase();
                match upper.as_str() {
                    "" | "UNKNOWN" => Self::Unknown,
                    $($wire => Self::$variant,)+
                    _ => Self::Other(upper),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use wire_state;

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filters() {
        assert!(matches_any(&[], "debug"));
        assert!(matches_any(&names(&["Debug"]), "debug"));
        assert!(!matches_any(&names(&["gpu"]), "debug"));

        assert!(overlaps(&[], &[]));
        assert!(overlaps(&names(&["gpu"]), &names(&["cpu", "GPU"])));
        assert!(!overlaps(&names(&["gpu"]), &[]));

        assert!(one_of(&[JobState::Running], &JobState::Running));
        assert!(!one_of(&[JobState::Running], &JobState::Pending));
    }

    #[test]
    fn test_state_parsing() {
        assert_eq!(JobState::from("running"), JobState::Running);
        assert_eq!(JobState::from(""), JobState::Unknown);
        assert_eq!(
            JobState::from("requeue_hold"),
            JobState::Other("REQUEUE_HOLD".into())
        );
        assert_eq!(
            NodeState::from_wire(&names(&["IDLE", "DRAIN"])),
            NodeState::Idle
        );
        assert_eq!(PartitionState::from_wire(&[]), PartitionState::Unknown);
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&JobState::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
        let state: NodeState = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(state, NodeState::Mixed);
    }

    #[test]
    fn test_list_result_default() {
        let page: JobList = ListResult::default();
        assert!(page.is_empty());
        assert_eq!(page.total, 0);
    }
}
