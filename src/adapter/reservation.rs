use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{ReservationManager, first_or_not_found};
use crate::base::{BaseManager, filter_page};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::{SlurmError, SlurmResult};
use crate::model::{
    Reservation, ReservationCreate, ReservationList, ReservationListOptions, ReservationUpdate,
};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::v0_0_40::ReservationRecord;
use crate::wire::{
    NoValU64, WireClient, WireNumber, decode_as, encode, list, number_u32, split_csv, text,
    timestamp, unix, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44,
};

/// A reservation record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireReservation {
    V40(v0_0_40::ReservationInfo),
    V41(v0_0_41::ReservationInfo),
    V42(v0_0_42::ReservationInfo),
    V43(v0_0_43::ReservationInfo),
    V44(v0_0_44::ReservationInfo),
}

impl WireReservation {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "reservations", WireReservation::V40),
            ApiVersion::V0_0_41 => decode_as(body, "reservations", WireReservation::V41),
            ApiVersion::V0_0_42 => decode_as(body, "reservations", WireReservation::V42),
            ApiVersion::V0_0_43 => decode_as(body, "reservations", WireReservation::V43),
            ApiVersion::V0_0_44 => decode_as(body, "reservations", WireReservation::V44),
        }
    }
}

fn convert<N: WireNumber>(r: ReservationRecord<N>) -> Reservation {
    Reservation {
        name: text(&r.name),
        start_time: timestamp(&r.start_time),
        end_time: timestamp(&r.end_time),
        node_count: number_u32(&r.node_count),
        node_list: text(&r.node_list),
        users: r.users.as_deref().map(split_csv).unwrap_or_default(),
        accounts: r.accounts.as_deref().map(split_csv).unwrap_or_default(),
        partition: text(&r.partition),
        flags: list(&r.flags),
    }
}

impl From<WireReservation> for Reservation {
    fn from(wire: WireReservation) -> Self {
        match wire {
            WireReservation::V40(r) | WireReservation::V41(r) | WireReservation::V42(r) => {
                convert(r)
            }
            WireReservation::V43(r) | WireReservation::V44(r) => convert(r),
        }
    }
}

fn check_window(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> SlurmResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => Err(SlurmError::validation(
            "reservation end time must be after start time",
        )),
        _ => Ok(()),
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn create_body(version: ApiVersion, r: &ReservationCreate) -> SlurmResult<Value> {
    match version {
        ApiVersion::V0_0_43 | ApiVersion::V0_0_44 => encode(&v0_0_43::ReservationDescription {
            name: Some(r.name.clone()),
            start_time: r.start_time.as_ref().map(unix),
            end_time: r.end_time.as_ref().map(unix),
            node_count: r.node_count.map(|n| NoValU64::new(n.into())),
            node_list: non_empty(&r.node_list),
            users: non_empty(&r.users),
            accounts: non_empty(&r.accounts),
            partition: r.partition.clone(),
            flags: non_empty(&r.flags),
        }),
        _ => Err(SlurmError::unsupported("reservation create", version)),
    }
}

fn update_body(version: ApiVersion, name: &str, u: &ReservationUpdate) -> SlurmResult<Value> {
    match version {
        ApiVersion::V0_0_43 | ApiVersion::V0_0_44 => encode(&v0_0_43::ReservationDescription {
            name: Some(name.to_string()),
            start_time: u.start_time.as_ref().map(unix),
            end_time: u.end_time.as_ref().map(unix),
            node_count: u.node_count.map(|n| NoValU64::new(n.into())),
            node_list: u.node_list.clone(),
            users: u.users.clone(),
            accounts: u.accounts.clone(),
            partition: u.partition.clone(),
            flags: u.flags.clone(),
        }),
        _ => Err(SlurmError::unsupported("reservation update", version)),
    }
}

/// [`ReservationManager`] for one wire version.
#[derive(Debug, Clone)]
pub struct ReservationAdapter {
    base: BaseManager,
}

impl ReservationAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Reservation, version, wire, defaults),
        }
    }
}

#[async_trait]
impl ReservationManager for ReservationAdapter {
    async fn list(
        &self,
        ctx: &Context,
        opts: &ReservationListOptions,
    ) -> SlurmResult<ReservationList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurm, "reservations");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let reservations = WireReservation::decode(self.base.version(), &body)?
            .into_iter()
            .map(Reservation::from)
            .collect();
        Ok(filter_page(reservations, |r| opts.matches(r), opts.offset, opts.limit))
    }

    async fn get(&self, ctx: &Context, name: &str) -> SlurmResult<Reservation> {
        let wire = self.base.begin(ctx, Operation::Get)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurm, &format!("reservation/{name}"));
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let reservations = WireReservation::decode(self.base.version(), &body)?;
        first_or_not_found(reservations, || format!("reservation {name}")).map(Reservation::from)
    }

    async fn create(&self, ctx: &Context, reservation: &ReservationCreate) -> SlurmResult<String> {
        let wire = self.base.begin(ctx, Operation::Create)?;
        self.base.require_name(&reservation.name)?;
        if reservation.start_time.is_none() || reservation.end_time.is_none() {
            return Err(SlurmError::validation(
                "reservation start time and end time are required",
            ));
        }
        check_window(reservation.start_time, reservation.end_time)?;

        let body = create_body(self.base.version(), reservation)?;
        let path = self.base.path(Api::Slurm, "reservation");
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(reservation.name.clone())
    }

    async fn update(
        &self,
        ctx: &Context,
        name: &str,
        update: &ReservationUpdate,
    ) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Update)?;
        self.base.require_name(name)?;
        self.base.require_changes(update.is_empty())?;
        check_window(update.start_time, update.end_time)?;

        let body = update_body(self.base.version(), name, update)?;
        let path = self.base.path(Api::Slurm, &format!("reservation/{name}"));
        wire.execute(ctx, WireRequest::post(path, body)).await?;
        Ok(())
    }

    async fn delete(&self, ctx: &Context, name: &str) -> SlurmResult<()> {
        let wire = self.base.begin(ctx, Operation::Delete)?;
        self.base.require_name(name)?;

        let path = self.base.path(Api::Slurm, &format!("reservation/{name}"));
        wire.execute(ctx, WireRequest::delete(path)).await?;
        Ok(())
    }
}
