#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident record source trait and implementations.
//!
//! An [`AccidentSource`] turns a [`Year`] into the full list of
//! [`AccidentRecord`]s for that year. [`tfl::TflSource`] talks to the
//! Transport for London API; [`memory::MemorySource`] serves fixed
//! records and is used by tests and offline demos.

pub mod memory;
pub mod tfl;

use async_trait::async_trait;
use road_safety_accident_models::{AccidentRecord, Year};

/// The message shown to users whenever a fetch fails, regardless of the
/// underlying cause.
pub const FETCH_FAILED_MESSAGE: &str = "API request failed, please try again later";

/// Errors that can occur while fetching accident records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body was not a JSON array of accident records.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    /// The fixed, user-facing failure message.
    ///
    /// Transport details are for logs only.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

/// Trait that all accident record providers implement.
#[async_trait]
pub trait AccidentSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g., `"tfl"`).
    fn id(&self) -> &str;

    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetches every accident record for `year`.
    ///
    /// Issues at most one upstream request and never retries.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails, the server returns a
    /// non-success status, or the body cannot be decoded.
    async fn fetch_year(&self, year: Year) -> Result<Vec<AccidentRecord>, SourceError>;
}
