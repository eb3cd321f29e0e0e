//! Client configuration.
//!
//! A [`ClientConfig`] is built once, from code, a TOML file or the
//! environment, and is immutable after the client is constructed. Adapters
//! only see the slice they need ([`Defaults`]).
//!
//! ```toml
//! base_url = "https://slurm.example.org:6820"
//! token = "eyJhbGciOi..."
//! version = "v0.0.43"
//! timeout_secs = 60
//! default_cluster = "linux"
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{SlurmError, SlurmResult};
use crate::version::ApiVersion;

/// Cluster used for associations when the caller leaves it empty.
pub const DEFAULT_CLUSTER: &str = "linux";

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER.to_string()
}

/// Root configuration for a [`SlurmClient`](crate::SlurmClient).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of slurmrestd, e.g. `http://head-node:6820`.
    pub base_url: String,

    /// JWT sent with every request.
    #[serde(default)]
    pub token: Option<String>,

    /// User name sent alongside the token.
    #[serde(default)]
    pub user_name: Option<String>,

    /// Wire version to speak; the newest supported when unset.
    #[serde(default)]
    pub version: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log request and response bodies.
    #[serde(default)]
    pub debug: bool,

    /// Transport-level retries for requests that never got a response.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Cluster applied to association requests that omit one.
    #[serde(default = "default_cluster")]
    pub default_cluster: String,
}

/// Process-wide defaults read by adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub cluster: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            user_name: None,
            version: None,
            timeout_secs: default_timeout_secs(),
            debug: false,
            max_retries: default_max_retries(),
            default_cluster: default_cluster(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_default_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.default_cluster = cluster.into();
        self
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(contents: &str) -> SlurmResult<Self> {
        toml::from_str(contents)
            .map_err(|e| SlurmError::validation(format!("invalid configuration: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SlurmResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SlurmError::validation(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build configuration from `SLURM_REST_URL`, `SLURM_JWT`,
    /// `SLURM_USER_NAME`, `SLURM_API_VERSION` and `SLURM_CLUSTER`.
    pub fn from_env() -> SlurmResult<Self> {
        let base_url = env::var("SLURM_REST_URL")
            .map_err(|_| SlurmError::validation("SLURM_REST_URL is not set"))?;

        let mut config = Self::new(base_url);
        config.token = env::var("SLURM_JWT").ok();
        config.user_name = env::var("SLURM_USER_NAME").ok();
        config.version = env::var("SLURM_API_VERSION").ok();
        if let Ok(cluster) = env::var("SLURM_CLUSTER") {
            config.default_cluster = cluster;
        }
        Ok(config)
    }

    /// Structural validation; does not contact the server.
    pub fn validate(&self) -> SlurmResult<()> {
        self.base_url()?;
        self.api_version()?;
        if self.timeout_secs == 0 {
            return Err(SlurmError::validation("timeout_secs must be greater than zero"));
        }
        if self.default_cluster.trim().is_empty() {
            return Err(SlurmError::validation("default_cluster must not be empty"));
        }
        Ok(())
    }

    /// The parsed base URL.
    pub fn base_url(&self) -> SlurmResult<Url> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| SlurmError::validation(format!("invalid base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SlurmError::validation(
                "base_url must start with http:// or https://",
            ));
        }
        Ok(url)
    }

    /// The requested wire version, or the newest supported one.
    pub fn api_version(&self) -> SlurmResult<ApiVersion> {
        match &self.version {
            Some(v) => v.parse(),
            None => Ok(ApiVersion::latest()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn defaults(&self) -> Defaults {
        Defaults {
            cluster: self.default_cluster.clone(),
        }
    }
}
