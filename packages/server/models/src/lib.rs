#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the road safety server.
//!
//! The derived views themselves are served as
//! `road_safety_dashboard_models::DerivedViews`; the types here cover
//! the selector metadata and error bodies around them.

use road_safety_accident_models::{SeverityFilter, Year};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Year selector options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiYears {
    /// Supported years, newest first.
    pub years: Vec<Year>,
    /// Year selected on first load.
    pub default: Year,
}

/// One option of the severity selector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeverityOption {
    /// Filter value.
    pub id: SeverityFilter,
    /// Colour used for this option's markers and bars.
    pub color: &'static str,
    /// Marker radius, `None` for `All`.
    pub radius: Option<u8>,
}

/// Query parameters for the accidents endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentQueryParams {
    /// Severity filter (`All`, `Fatal`, `Serious`, `Slight`). Defaults to
    /// `All`.
    pub severity: Option<String>,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
