use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An advance reservation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub name: String,
    /// `None` when unset.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Nodes reserved.
    pub node_count: u32,
    /// Node expression, e.g. `c[001-004],gpu01`.
    pub node_list: String,
    /// Users allowed to run in the reservation.
    pub users: Vec<String>,
    /// Accounts allowed to run in the reservation.
    pub accounts: Vec<String>,
    pub partition: String,
    /// e.g. `MAINT`, `IGNORE_JOBS`.
    pub flags: Vec<String>,
}

impl Reservation {
    /// Returns `true` if `at` falls inside the reservation window.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= at && at < end,
            _ => false,
        }
    }
}

/// A new reservation. Start and end time are required together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub name: String,
    /// Required together with `end_time`.
    pub start_time: Option<DateTime<Utc>>,
    /// Must be after `start_time`.
    pub end_time: Option<DateTime<Utc>>,
    pub node_count: Option<u32>,
    /// Node names or expressions; joined with commas on the wire.
    pub node_list: Vec<String>,
    pub users: Vec<String>,
    pub accounts: Vec<String>,
    pub partition: Option<String>,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub node_count: Option<u32>,
    pub node_list: Option<Vec<String>>,
    pub users: Option<Vec<String>>,
    pub accounts: Option<Vec<String>>,
    pub partition: Option<String>,
    pub flags: Option<Vec<String>>,
}

impl ReservationUpdate {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.node_count.is_none()
            && self.node_list.is_none()
            && self.users.is_none()
            && self.accounts.is_none()
            && self.partition.is_none()
            && self.flags.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationListOptions {
    pub names: Vec<String>,
    pub users: Vec<String>,
    pub accounts: Vec<String>,
    pub partitions: Vec<String>,
    /// Only reservations whose window contains this instant.
    pub active_at: Option<DateTime<Utc>>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ReservationListOptions {
    pub(crate) fn matches(&self, reservation: &Reservation) -> bool {
        super::matches_any(&self.names, &reservation.name)
            && super::overlaps(&self.users, &reservation.users)
            && super::overlaps(&self.accounts, &reservation.accounts)
            && super::matches_any(&self.partitions, &reservation.partition)
            && self.active_at.is_none_or(|at| reservation.is_active_at(at))
    }
}
