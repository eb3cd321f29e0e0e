//! Read-only cluster information: TRES definitions, controller ping, server
//! version and controller statistics.

use std::sync::Arc;

use serde_json::Value;

use crate::base::{BaseManager, paginate};
use crate::capability::{Entity, Operation};
use crate::config::Defaults;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{ClusterStats, ControllerPing, ServerInfo, ServerVersion, Tres, TresList};
use crate::transport::WireRequest;
use crate::version::{Api, ApiVersion};
use crate::wire::{
    WireClient, decode_as, object, text, v0_0_40, v0_0_41, v0_0_42, v0_0_43, v0_0_44,
};

/// A TRES record as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireTres {
    V40(v0_0_40::TresInfo),
    V41(v0_0_41::TresInfo),
    V42(v0_0_42::TresInfo),
    V43(v0_0_43::TresInfo),
    V44(v0_0_44::TresInfo),
}

impl WireTres {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "TRES", WireTres::V40),
            ApiVersion::V0_0_41 => decode_as(body, "TRES", WireTres::V41),
            ApiVersion::V0_0_42 => decode_as(body, "TRES", WireTres::V42),
            ApiVersion::V0_0_43 => decode_as(body, "TRES", WireTres::V43),
            ApiVersion::V0_0_44 => decode_as(body, "TRES", WireTres::V44),
        }
    }
}

impl From<WireTres> for Tres {
    fn from(wire: WireTres) -> Self {
        let (WireTres::V40(t)
        | WireTres::V41(t)
        | WireTres::V42(t)
        | WireTres::V43(t)
        | WireTres::V44(t)) = wire;
        Tres {
            id: t.id.unwrap_or(0),
            kind: text(&t.kind),
            name: text(&t.name),
            count: t.count.unwrap_or(0),
        }
    }
}

/// A ping entry as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WirePing {
    V40(v0_0_40::ControllerPing),
    V41(v0_0_41::ControllerPing),
    V42(v0_0_42::ControllerPing),
    V43(v0_0_43::ControllerPing),
    V44(v0_0_44::ControllerPing),
}

impl WirePing {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Vec<Self>> {
        match version {
            ApiVersion::V0_0_40 => decode_as(body, "pings", WirePing::V40),
            ApiVersion::V0_0_41 => decode_as(body, "pings", WirePing::V41),
            ApiVersion::V0_0_42 => decode_as(body, "pings", WirePing::V42),
            ApiVersion::V0_0_43 => decode_as(body, "pings", WirePing::V43),
            ApiVersion::V0_0_44 => decode_as(body, "pings", WirePing::V44),
        }
    }
}

impl From<WirePing> for ControllerPing {
    fn from(wire: WirePing) -> Self {
        let (WirePing::V40(p)
        | WirePing::V41(p)
        | WirePing::V42(p)
        | WirePing::V43(p)
        | WirePing::V44(p)) = wire;
        // Older controllers only report `pinged: "UP"`.
        let responding = p
            .responding
            .unwrap_or_else(|| p.pinged.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("up")));
        ControllerPing {
            hostname: text(&p.hostname),
            responding,
            latency_us: p.latency.unwrap_or(0),
            mode: text(&p.mode),
        }
    }
}

/// `/diag` statistics as decoded from one wire version.
#[derive(Debug, Clone)]
pub enum WireDiag {
    V40(v0_0_40::DiagStatistics),
    V41(v0_0_41::DiagStatistics),
    V42(v0_0_42::DiagStatistics),
    V43(v0_0_43::DiagStatistics),
    V44(v0_0_44::DiagStatistics),
}

impl WireDiag {
    fn decode(version: ApiVersion, body: &Value) -> SlurmResult<Self> {
        Ok(match version {
            ApiVersion::V0_0_40 => WireDiag::V40(object(body, "statistics")?),
            ApiVersion::V0_0_41 => WireDiag::V41(object(body, "statistics")?),
            ApiVersion::V0_0_42 => WireDiag::V42(object(body, "statistics")?),
            ApiVersion::V0_0_43 => WireDiag::V43(object(body, "statistics")?),
            ApiVersion::V0_0_44 => WireDiag::V44(object(body, "statistics")?),
        })
    }
}

impl From<WireDiag> for ClusterStats {
    fn from(wire: WireDiag) -> Self {
        let (WireDiag::V40(d)
        | WireDiag::V41(d)
        | WireDiag::V42(d)
        | WireDiag::V43(d)
        | WireDiag::V44(d)) = wire;
        ClusterStats {
            server_thread_count: d.server_thread_count.unwrap_or(0),
            agent_queue_size: d.agent_queue_size.unwrap_or(0),
            jobs_submitted: d.jobs_submitted.unwrap_or(0),
            jobs_started: d.jobs_started.unwrap_or(0),
            jobs_completed: d.jobs_completed.unwrap_or(0),
            jobs_canceled: d.jobs_canceled.unwrap_or(0),
            jobs_failed: d.jobs_failed.unwrap_or(0),
            jobs_pending: d.jobs_pending.unwrap_or(0),
            jobs_running: d.jobs_running.unwrap_or(0),
            schedule_cycle_last: d.schedule_cycle_last.unwrap_or(0),
            schedule_cycle_mean: d.schedule_cycle_mean.unwrap_or(0),
            backfill_cycle_last: d.bf_cycle_last.unwrap_or(0),
        }
    }
}

// The meta block has one shape in every version.
fn server_version(api: ApiVersion, body: &Value) -> SlurmResult<(ServerVersion, String)> {
    let meta: v0_0_40::ResponseMeta = object(body, "meta")?;
    let slurm = meta.slurm.unwrap_or_default();
    let version = match slurm.version {
        Some(v) if v.major.is_some() => [v.major, v.minor, v.micro]
            .iter()
            .map(|part| part.as_ref().map_or_else(|| "0".to_string(), ToString::to_string))
            .collect::<Vec<_>>()
            .join("."),
        _ => String::new(),
    };
    let data_parser = meta.plugin.and_then(|p| p.data_parser);
    Ok((
        ServerVersion {
            api,
            version,
            release: text(&slurm.release),
            data_parser: text(&data_parser),
        },
        text(&slurm.cluster),
    ))
}

/// Cluster-wide read-only queries for one wire version.
#[derive(Debug, Clone)]
pub struct InfoAdapter {
    base: BaseManager,
}

impl InfoAdapter {
    pub fn new(version: ApiVersion, wire: Option<WireClient>, defaults: Arc<Defaults>) -> Self {
        Self {
            base: BaseManager::new(Entity::Tres, version, wire, defaults),
        }
    }

    /// Every trackable resource the accounting database knows.
    pub async fn tres(&self, ctx: &Context) -> SlurmResult<TresList> {
        let wire = self.base.begin(ctx, Operation::List)?;
        let path = self.base.path(Api::Slurmdb, "tres");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let tres = WireTres::decode(self.base.version(), &body)?
            .into_iter()
            .map(Tres::from)
            .collect();
        Ok(paginate(tres, 0, None))
    }

    /// Ping every configured controller. Available in every version.
    pub async fn ping(&self, ctx: &Context) -> SlurmResult<Vec<ControllerPing>> {
        let wire = self.base.connect(ctx)?;
        let path = self.base.path(Api::Slurm, "ping");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        Ok(WirePing::decode(self.base.version(), &body)?
            .into_iter()
            .map(ControllerPing::from)
            .collect())
    }

    /// Version of the server, read from the metadata of a ping.
    pub async fn version(&self, ctx: &Context) -> SlurmResult<ServerVersion> {
        let wire = self.base.connect(ctx)?;
        let path = self.base.path(Api::Slurm, "ping");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        server_version(self.base.version(), &body).map(|(version, _)| version)
    }

    /// Cluster name, server version and controller statistics from `/diag`.
    pub async fn info(&self, ctx: &Context) -> SlurmResult<ServerInfo> {
        let wire = self.base.connect(ctx)?;
        let path = self.base.path(Api::Slurm, "diag");
        let body = wire.execute(ctx, WireRequest::get(path)).await?;
        let (version, cluster_name) = server_version(self.base.version(), &body)?;
        Ok(ServerInfo {
            cluster_name,
            version,
            stats: WireDiag::decode(self.base.version(), &body)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::{detached, wired};
    use crate::error::ErrorKind;
    use crate::transport::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_tres_listing() {
        let (mock, wire) = wired(ApiVersion::V0_0_42);
        mock.on(
            Method::Get,
            "/slurmdb/v0.0.42/tres",
            200,
            json!({"TRES": [
                {"type": "cpu", "id": 1},
                {"type": "gres", "name": "gpu", "id": 1001, "count": 8}
            ]}),
        );
        let adapter = InfoAdapter::new(ApiVersion::V0_0_42, Some(wire), Default::default());
        let tres = adapter.tres(&Context::background()).await.unwrap();
        assert_eq!(tres.total, 2);
        let labels: Vec<_> = tres.items.iter().map(Tres::label).collect();
        assert_eq!(labels, vec!["cpu", "gres/gpu"]);
        assert_eq!(tres.items[1].count, 8);
    }

    #[tokio::test]
    async fn test_ping_responding() {
        let (mock, wire) = wired(ApiVersion::V0_0_40);
        mock.on(
            Method::Get,
            "/slurm/v0.0.40/ping",
            200,
            json!({"pings": [
                {"hostname": "ctl01", "pinged": "UP", "latency": 412, "mode": "primary"},
                {"hostname": "ctl02", "responding": false, "mode": "backup"}
            ]}),
        );
        let adapter = InfoAdapter::new(ApiVersion::V0_0_40, Some(wire), Default::default());
        let pings = adapter.ping(&Context::background()).await.unwrap();
        assert_eq!(pings.len(), 2);
        assert!(pings[0].responding);
        assert_eq!(pings[0].latency_us, 412);
        assert!(!pings[1].responding);
        assert_eq!(pings[1].mode, "backup");
    }

    #[tokio::test]
    async fn test_version_from_meta() {
        let (mock, wire) = wired(ApiVersion::V0_0_43);
        mock.on(
            Method::Get,
            "/slurm/v0.0.43/ping",
            200,
            json!({
                "meta": {
                    "plugin": {"type": "openapi/slurmctld", "data_parser": "data_parser/v0.0.43"},
                    "slurm": {
                        "version": {"major": "25", "minor": 5, "micro": "2"},
                        "release": "25.05.2",
                        "cluster": "linux"
                    }
                },
                "pings": []
            }),
        );
        let adapter = InfoAdapter::new(ApiVersion::V0_0_43, Some(wire), Default::default());

        let version = adapter.version(&Context::background()).await.unwrap();
        assert_eq!(version.api, ApiVersion::V0_0_43);
        assert_eq!(version.version, "25.5.2");
        assert_eq!(version.release, "25.05.2");
        assert_eq!(version.data_parser, "data_parser/v0.0.43");
    }

    #[tokio::test]
    async fn test_version_without_meta() {
        let (mock, wire) = wired(ApiVersion::V0_0_40);
        mock.on(Method::Get, "/slurm/v0.0.40/ping", 200, json!({"pings": []}));
        let adapter = InfoAdapter::new(ApiVersion::V0_0_40, Some(wire), Default::default());

        let version = adapter.version(&Context::background()).await.unwrap();
        assert_eq!(version.api, ApiVersion::V0_0_40);
        assert!(version.version.is_empty());
        assert!(version.release.is_empty());
    }

    #[tokio::test]
    async fn test_info_from_diag() {
        let (mock, wire) = wired(ApiVersion::V0_0_44);
        mock.on(
            Method::Get,
            "/slurm/v0.0.44/diag",
            200,
            json!({
                "meta": {"slurm": {"release": "25.11.0", "cluster": "hpc"}},
                "statistics": {
                    "server_thread_count": 3,
                    "jobs_submitted": 120,
                    "jobs_running": 7,
                    "jobs_pending": 2,
                    "schedule_cycle_mean": 845,
                    "bf_cycle_last": 1200
                }
            }),
        );
        let adapter = InfoAdapter::new(ApiVersion::V0_0_44, Some(wire), Default::default());

        let info = adapter.info(&Context::background()).await.unwrap();
        assert_eq!(info.cluster_name, "hpc");
        assert_eq!(info.version.release, "25.11.0");
        assert_eq!(info.stats.server_thread_count, 3);
        assert_eq!(info.stats.jobs_submitted, 120);
        assert_eq!(info.stats.jobs_running, 7);
        assert_eq!(info.stats.schedule_cycle_mean, 845);
        assert_eq!(info.stats.backfill_cycle_last, 1200);
        assert_eq!(info.stats.jobs_failed, 0);
    }

    #[tokio::test]
    async fn test_info_rejects_malformed_statistics() {
        let (mock, wire) = wired(ApiVersion::V0_0_42);
        mock.on(
            Method::Get,
            "/slurm/v0.0.42/diag",
            200,
            json!({"statistics": {"jobs_submitted": "many"}}),
        );
        let adapter = InfoAdapter::new(ApiVersion::V0_0_42, Some(wire), Default::default());

        let err = adapter.info(&Context::background()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
    }

    #[tokio::test]
    async fn test_ping_needs_client() {
        let adapter = InfoAdapter::new(ApiVersion::V0_0_44, detached(), Default::default());
        let err = adapter.ping(&Context::background()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientNotInitialized);
        let err = adapter.info(&Context::background()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientNotInitialized);
    }
}
