//! Wire layer: the client bound to one API version, plus the JSON schemas of
//! each version.
//!
//! Each `vX` module declares the shapes that version puts on the wire.
//! Shapes that did not change between versions are re-exported from the
//! version that introduced them; shapes that did change are separate types
//! (often a different instantiation of a generic shape). Every field is
//! optional so that a structurally valid but empty payload always decodes.

pub mod v0_0_40;
pub mod v0_0_41;
pub mod v0_0_42;
pub mod v0_0_43;
pub mod v0_0_44;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::context::Context;
use crate::error::{SlurmError, SlurmResult};
use crate::response::ResponseAdapter;
use crate::transport::{Transport, WireRequest};
use crate::version::{Api, ApiVersion};

/// One entry of the `errors` array slurmrestd embeds in responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WireError {
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub error_number: i32,
    #[serde(deserialize_with = "nullable")]
    pub error: String,
    #[serde(deserialize_with = "nullable")]
    pub source: String,
}

impl WireError {
    /// Most specific non-empty text of the entry.
    pub fn summary(&self) -> String {
        if !self.description.is_empty() {
            self.description.clone()
        } else if !self.error.is_empty() {
            self.error.clone()
        } else if self.error_number != 0 {
            format!("error {}", self.error_number)
        } else {
            String::new()
        }
    }
}

/// One entry of the `warnings` array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireWarning {
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub source: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Envelope {
    #[serde(deserialize_with = "nullable")]
    errors: Vec<WireError>,
    #[serde(deserialize_with = "nullable")]
    warnings: Vec<WireWarning>,
}

/// `null` reads as the default value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// slurmrestd's wrapper for numbers that may be unset or infinite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoValU64 {
    pub set: bool,
    pub infinite: bool,
    pub number: u64,
}

impl NoValU64 {
    pub fn new(number: u64) -> Self {
        Self {
            set: true,
            infinite: false,
            number,
        }
    }
}

/// Floating point variant of [`NoValU64`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoValF64 {
    pub set: bool,
    pub infinite: bool,
    pub number: f64,
}

impl NoValF64 {
    pub fn new(number: f64) -> Self {
        Self {
            set: true,
            infinite: false,
            number,
        }
    }
}

/// A numeric wire field, plain or wrapped.
///
/// Unset and infinite values read as zero.
pub trait WireNumber {
    fn get(&self) -> u64;
}

impl WireNumber for u32 {
    fn get(&self) -> u64 {
        u64::from(*self)
    }
}

impl WireNumber for u64 {
    fn get(&self) -> u64 {
        *self
    }
}

impl WireNumber for NoValU64 {
    fn get(&self) -> u64 {
        if self.set && !self.infinite {
            self.number
        } else {
            0
        }
    }
}

impl WireNumber for NoValF64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn get(&self) -> u64 {
        if self.set && !self.infinite && self.number > 0.0 {
            self.number as u64
        } else {
            0
        }
    }
}

/// A list-valued wire field: comma separated string or JSON array.
pub trait WireList {
    fn to_list(&self) -> Vec<String>;
}

impl WireList for String {
    fn to_list(&self) -> Vec<String> {
        split_csv(self)
    }
}

impl WireList for Vec<String> {
    fn to_list(&self) -> Vec<String> {
        self.iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Optional number to `u64`, absent reads as zero.
pub fn number<N: WireNumber>(value: &Option<N>) -> u64 {
    value.as_ref().map(WireNumber::get).unwrap_or(0)
}

/// Optional number to `u32`, saturating.
pub fn number_u32<N: WireNumber>(value: &Option<N>) -> u32 {
    u32::try_from(number(value)).unwrap_or(u32::MAX)
}

/// Optional list, absent reads as empty.
pub fn list<L: WireList>(value: &Option<L>) -> Vec<String> {
    value.as_ref().map(WireList::to_list).unwrap_or_default()
}

/// Optional string, absent reads as empty.
pub fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Split a comma separated list, dropping empty entries.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unix seconds to a timestamp; zero means unset.
pub fn timestamp<N: WireNumber>(value: &Option<N>) -> Option<DateTime<Utc>> {
    match number(value) {
        0 => None,
        secs => DateTime::from_timestamp(i64::try_from(secs).ok()?, 0),
    }
}

/// Timestamp to the wrapped unix-seconds form.
pub fn unix(value: &DateTime<Utc>) -> NoValU64 {
    NoValU64::new(u64::try_from(value.timestamp()).unwrap_or(0))
}

/// Decode the array under `field`; a missing or `null` field is empty.
///
/// Decoding is all or nothing: one malformed element fails the call.
pub fn items<T: DeserializeOwned>(body: &Value, field: &str) -> SlurmResult<Vec<T>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            SlurmError::InvalidResponse(format!("cannot decode '{field}': {e}"))
        }),
    }
}

/// Decode the object under `field`; a missing or `null` field is the default.
pub fn object<T: DeserializeOwned + Default>(body: &Value, field: &str) -> SlurmResult<T> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            SlurmError::InvalidResponse(format!("cannot decode '{field}': {e}"))
        }),
    }
}

/// Decode `field` as `T` and tag every element with a version variant.
pub fn decode_as<T, W>(body: &Value, field: &str, tag: fn(T) -> W) -> SlurmResult<Vec<W>>
where
    T: DeserializeOwned,
{
    Ok(items::<T>(body, field)?.into_iter().map(tag).collect())
}

/// Serialize a request payload.
pub fn encode<T: Serialize>(payload: &T) -> SlurmResult<Value> {
    serde_json::to_value(payload).map_err(|e| SlurmError::validation(format!("cannot encode request: {e}")))
}

/// Wire client bound to one API version.
#[derive(Clone)]
pub struct WireClient {
    transport: Arc<dyn Transport>,
    version: ApiVersion,
}

impl fmt::Debug for WireClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireClient")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl WireClient {
    pub fn new(transport: Arc<dyn Transport>, version: ApiVersion) -> Self {
        Self { transport, version }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Versioned path for `resource`.
    pub fn path(&self, api: Api, resource: &str) -> String {
        self.version.path(api, resource)
    }

    /// Send `request` and return the body of a clean response.
    ///
    /// Fails without sending if `ctx` is already done, and abandons the
    /// request if `ctx` becomes done first. Non-2xx statuses and embedded
    /// errors are normalized by [`ResponseAdapter`].
    pub async fn execute(&self, ctx: &Context, request: WireRequest) -> SlurmResult<Value> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let method = request.method;
        let path = request.path.clone();
        let response = tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason.into()),
            response = self.transport.send(request) => response?,
        };

        let envelope: Envelope = if response.body.is_object() {
            serde_json::from_value(response.body.clone()).map_err(|e| {
                SlurmError::InvalidResponse(format!(
                    "HTTP {}: cannot decode error envelope: {e}",
                    response.status
                ))
            })?
        } else {
            Envelope::default()
        };

        ResponseAdapter::new(response.status, &envelope.errors).check()?;

        for warning in &envelope.warnings {
            warn!(
                method = method.as_str(),
                %path,
                source = %warning.source,
                "slurmrestd warning: {}",
                warning.description
            );
        }

        Ok(response.body)
    }
}
