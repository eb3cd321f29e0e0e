//! Normalization of wire responses into [`SlurmError`].
//!
//! slurmrestd reports failures two ways: the HTTP status and an `errors`
//! array in the JSON body. Either may be missing. [`ResponseAdapter`] turns
//! any combination into one error whose message starts with
//! `HTTP <status>` so the status code survives for diagnosis.
//!
//! | Status | Error |
//! |--------|-------|
//! | 401, 403 | `Unauthorized` |
//! | 404 | `NotFound` |
//! | 409 | `Conflict` |
//! | other 4xx | `Validation` |
//! | 5xx | `Server` |
//! | 2xx with errors | `Server` |

use reqwest::StatusCode;

use crate::error::{SlurmError, SlurmResult};
use crate::wire::WireError;

/// Status code plus the structured errors carried by one response.
#[derive(Debug, Clone, Copy)]
pub struct ResponseAdapter<'a> {
    status: u16,
    errors: &'a [WireError],
}

impl<'a> ResponseAdapter<'a> {
    pub fn new(status: u16, errors: &'a [WireError]) -> Self {
        Self { status, errors }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `Ok` for a clean 2xx response, otherwise the normalized error.
    pub fn check(&self) -> SlurmResult<()> {
        if self.is_success() && self.errors.is_empty() {
            return Ok(());
        }
        Err(self.to_error())
    }

    fn message(&self) -> String {
        let details: Vec<String> = self
            .errors
            .iter()
            .map(WireError::summary)
            .filter(|s| !s.is_empty())
            .collect();

        if details.is_empty() {
            let reason = StatusCode::from_u16(self.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown Status");
            format!("HTTP {} {reason}", self.status)
        } else {
            format!("HTTP {}: {}", self.status, details.join("; "))
        }
    }

    fn to_error(&self) -> SlurmError {
        let message = self.message();
        match self.status {
            401 | 403 => SlurmError::Unauthorized(message),
            404 => SlurmError::NotFound(message),
            409 => SlurmError::Conflict(message),
            400..=499 => SlurmError::Validation(message),
            _ => SlurmError::Server(message),
        }
    }
}
