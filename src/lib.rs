//! Slurm Client: a version-adapting client for the Slurm REST API
//!
//! slurmrestd publishes a new OpenAPI schema with every Slurm release. This
//! crate gives callers one stable domain model for jobs, nodes, partitions,
//! reservations, QoS, accounts, users, associations, clusters, TRES and
//! wckeys, and speaks whichever wire version (`v0.0.40` to `v0.0.44`) the
//! server was configured with.
//!
//! # Overview
//!
//! - [`SlurmClient`] is the facade. It is built from a [`ClientConfig`] and
//!   hands out one manager per entity ([`JobManager`], [`NodeManager`], …).
//! - Every operation takes a [`Context`] for cancellation and deadlines.
//! - [`Capabilities`] describe which operations the chosen version supports;
//!   anything else fails with [`SlurmError::UnsupportedOperation`] without
//!   touching the network.
//! - Server failures are normalized into [`SlurmError`] with an [`ErrorKind`].
//! - Jobs, nodes and partitions can be watched by polling ([`WatchEvent`]).
//!
//! # Example
//!
//! ```no_run
//! use slurm_client::{ClientConfig, Context, JobCreate, SlurmClient};
//!
//! # async fn run() -> slurm_client::SlurmResult<()> {
//! let client = SlurmClient::new(ClientConfig::from_env()?)?;
//! let ctx = Context::background();
//!
//! let job = JobCreate::new("hello", "#!/bin/bash\nsrun hostname")
//!     .with_partition("debug")
//!     .with_time_limit(10);
//! let submitted = client.jobs().create(&ctx, &job).await?;
//! let job = client.jobs().get(&ctx, submitted.job_id).await?;
//! println!("{} is {}", job.id, job.state);
//! # Ok(())
//! # }
//! ```
//!
//! # Call path
//!
//! ```text
//!   SlurmClient ──→ XManager (dyn) ──→ XAdapter ──→ WireClient ──→ Transport
//!    (facade)       (adapter/mod.rs)   (per entity)  (wire/mod.rs)  (HTTP or mock)
//! ```

pub mod adapter;
pub mod auth;
pub mod base;
pub mod capability;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod registry;
pub mod response;
pub mod telemetry;
pub mod transport;
pub mod version;
pub mod watch;
pub mod wire;

pub use adapter::{
    AccountManager, AssociationManager, ClusterManager, JobManager, NodeManager,
    PartitionManager, QoSManager, ReservationManager, UserManager, WCKeyManager,
};
pub use auth::{AuthProvider, NoAuth, TokenAuth};
pub use capability::{Capabilities, Entity, Operation, OperationSet};
pub use client::{ClientBuilder, SlurmClient};
pub use config::{ClientConfig, Defaults};
pub use context::{Context, ContextError};
pub use error::{ErrorKind, SlurmError, SlurmResult};
pub use model::*;
pub use registry::AdapterSet;
pub use transport::{HttpTransport, Method, MockTransport, Transport, WireRequest, WireResponse};
pub use version::{Api, ApiVersion};
pub use watch::{EventStream, WatchEvent, WatchOptions};
