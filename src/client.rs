//! The public facade.
//!
//! [`SlurmClient`] hides the wire version: callers reach every entity
//! through a manager trait object and only [`SlurmClient::version`] and
//! [`SlurmClient::capabilities`] reveal which version is in use.
//!
//! ```no_run
//! # async fn run() -> slurm_client::SlurmResult<()> {
//! use slurm_client::{ClientConfig, Context, JobListOptions, SlurmClient};
//!
//! let config = ClientConfig::new("http://head-node:6820")
//!     .with_token("eyJhbGciOi...")
//!     .with_version("v0.0.43");
//! let client = SlurmClient::new(config)?;
//!
//! let ctx = Context::background();
//! let jobs = client.jobs().list(&ctx, &JobListOptions::default()).await?;
//! println!("{} jobs", jobs.total);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::adapter::{
    AccountManager, AssociationManager, ClusterManager, JobManager, NodeManager,
    PartitionManager, QoSManager, ReservationManager, UserManager, WCKeyManager,
};
use crate::auth::AuthProvider;
use crate::capability::Capabilities;
use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::SlurmResult;
use crate::model::{ControllerPing, ServerInfo, ServerVersion, TresList};
use crate::registry::AdapterSet;
use crate::transport::{HttpTransport, Transport};
use crate::version::ApiVersion;
use crate::wire::WireClient;

/// Version-adapting Slurm REST client.
#[derive(Debug, Clone)]
pub struct SlurmClient {
    adapters: AdapterSet,
}

impl SlurmClient {
    /// Build an HTTP client from `config`.
    pub fn new(config: ClientConfig) -> SlurmResult<Self> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Wire version this client speaks.
    pub fn version(&self) -> ApiVersion {
        self.adapters.version
    }

    /// Operations available in [`version`](Self::version).
    pub fn capabilities(&self) -> &'static Capabilities {
        Capabilities::for_version(self.adapters.version)
    }

    pub fn jobs(&self) -> &dyn JobManager {
        &self.adapters.jobs
    }

    pub fn nodes(&self) -> &dyn NodeManager {
        &self.adapters.nodes
    }

    pub fn partitions(&self) -> &dyn PartitionManager {
        &self.adapters.partitions
    }

    pub fn reservations(&self) -> &dyn ReservationManager {
        &self.adapters.reservations
    }

    pub fn qos(&self) -> &dyn QoSManager {
        &self.adapters.qos
    }

    pub fn accounts(&self) -> &dyn AccountManager {
        &self.adapters.accounts
    }

    pub fn users(&self) -> &dyn UserManager {
        &self.adapters.users
    }

    pub fn associations(&self) -> &dyn AssociationManager {
        &self.adapters.associations
    }

    pub fn clusters(&self) -> &dyn ClusterManager {
        &self.adapters.clusters
    }

    pub fn wckeys(&self) -> &dyn WCKeyManager {
        &self.adapters.wckeys
    }

    /// Trackable resources known to the accounting database.
    pub async fn tres(&self, ctx: &Context) -> SlurmResult<TresList> {
        self.adapters.info.tres(ctx).await
    }

    /// Controller reachability.
    pub async fn ping(&self, ctx: &Context) -> SlurmResult<Vec<ControllerPing>> {
        self.adapters.info.ping(ctx).await
    }

    /// Version of the server behind the REST API.
    ///
    /// Unlike [`version`](Self::version) this asks the server.
    pub async fn server_version(&self, ctx: &Context) -> SlurmResult<ServerVersion> {
        self.adapters.info.version(ctx).await
    }

    /// Cluster name and controller statistics.
    pub async fn info(&self, ctx: &Context) -> SlurmResult<ServerInfo> {
        self.adapters.info.info(ctx).await
    }
}

/// Builder for [`SlurmClient`].
///
/// The configuration is validated in [`build`](Self::build). A custom
/// transport replaces the HTTP one entirely (the base URL is then only
/// validated, never used).
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("auth", &self.auth)
            .finish()
    }
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            auth: None,
        }
    }

    /// Send requests through `transport` instead of HTTP.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use `auth` instead of the token from the configuration.
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn build(self) -> SlurmResult<SlurmClient> {
        self.config.validate()?;
        let version = self.config.api_version()?;

        let transport: Arc<dyn Transport> = match (self.transport, self.auth) {
            (Some(transport), _) => transport,
            (None, Some(auth)) => Arc::new(HttpTransport::with_auth(&self.config, auth)?),
            (None, None) => Arc::new(HttpTransport::from_config(&self.config)?),
        };

        info!(
            %version,
            base_url = %self.config.base_url,
            default_cluster = %self.config.default_cluster,
            "slurm client ready"
        );

        let wire = WireClient::new(transport, version);
        Ok(SlurmClient {
            adapters: AdapterSet::new(version, Some(wire), Arc::new(self.config.defaults())),
        })
    }
}
