//! Wire API versions.
//!
//! Each revision of the slurmrestd OpenAPI schema is pinned to one
//! [`ApiVersion`]. The version determines the REST path prefix, the JSON
//! schema the adapters decode and the static capability matrix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SlurmError;

/// A supported wire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiVersion {
    V0_0_40,
    V0_0_41,
    V0_0_42,
    V0_0_43,
    V0_0_44,
}

/// REST API family: controller (`slurm`) or accounting database (`slurmdb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    Slurm,
    Slurmdb,
}

impl ApiVersion {
    /// All supported versions, oldest first.
    pub const ALL: [ApiVersion; 5] = [
        ApiVersion::V0_0_40,
        ApiVersion::V0_0_41,
        ApiVersion::V0_0_42,
        ApiVersion::V0_0_43,
        ApiVersion::V0_0_44,
    ];

    /// The newest supported version.
    pub fn latest() -> Self {
        ApiVersion::V0_0_44
    }

    /// Version string as it appears in REST paths, e.g. `v0.0.43`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V0_0_40 => "v0.0.40",
            ApiVersion::V0_0_41 => "v0.0.41",
            ApiVersion::V0_0_42 => "v0.0.42",
            ApiVersion::V0_0_43 => "v0.0.43",
            ApiVersion::V0_0_44 => "v0.0.44",
        }
    }

    /// Path for `resource` under the given API family.
    ///
    /// `path(Api::Slurm, "jobs")` on v0.0.43 is `/slurm/v0.0.43/jobs`.
    pub fn path(&self, api: Api, resource: &str) -> String {
        let family = match api {
            Api::Slurm => "slurm",
            Api::Slurmdb => "slurmdb",
        };
        format!("/{family}/{}/{}", self.as_str(), resource.trim_start_matches('/'))
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = SlurmError;

    /// Accepts `v0.0.43`, `0.0.43` and the `v0_0_43` module spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('v').replace('_', ".");
        ApiVersion::ALL
            .into_iter()
            .find(|v| v.as_str()[1..] == normalized)
            .ok_or_else(|| SlurmError::UnsupportedVersion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_spellings() {
        assert_eq!("v0.0.43".parse::<ApiVersion>().unwrap(), ApiVersion::V0_0_43);
        assert_eq!("0.0.40".parse::<ApiVersion>().unwrap(), ApiVersion::V0_0_40);
        assert_eq!("v0_0_44".parse::<ApiVersion>().unwrap(), ApiVersion::V0_0_44);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "v0.0.39".parse::<ApiVersion>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
        assert!(err.to_string().contains("v0.0.39"));
        assert!("".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_paths() {
        let v = ApiVersion::V0_0_42;
        assert_eq!(v.path(Api::Slurm, "jobs"), "/slurm/v0.0.42/jobs");
        assert_eq!(v.path(Api::Slurmdb, "/qos/normal"), "/slurmdb/v0.0.42/qos/normal");
    }

    #[test]
    fn test_ordering() {
        assert!(ApiVersion::V0_0_40 < ApiVersion::V0_0_44);
        assert_eq!(ApiVersion::latest(), *ApiVersion::ALL.last().unwrap());
    }
}
