#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter state and derived view types for the road safety dashboard.
//!
//! These are the only shapes a UI layer has to understand: a `GeoJSON`
//! feature collection for the map, [`SeverityCounts`] for the stat
//! panel and a [`MonthlyHistogram`] for the trend chart, bundled as
//! [`DerivedViews`] together with the filter they were computed for.

use geojson::FeatureCollection;
use road_safety_accident_models::{SeverityFilter, Year};
use serde::{Deserialize, Serialize};

/// Calendar month labels, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The two user-controlled selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Selected year.
    pub year: Year,
    /// Selected severity filter.
    pub severity: SeverityFilter,
}

/// Full-year accident totals, independent of the severity filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    /// Every record for the year.
    pub total: u64,
    /// Records labelled `Fatal`.
    pub fatal: u64,
    /// Records labelled `Serious`.
    pub serious: u64,
    /// Records labelled `Slight`.
    pub slight: u64,
    /// Records with a missing or unrecognized label.
    pub unrecognized: u64,
}

/// One bar of the trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// Month label (`"Jan"`..`"Dec"`).
    pub name: String,
    /// Accidents in that month.
    pub count: u64,
}

/// Twelve monthly accident counts. Index 0 is January.
///
/// Serialized as a list of [`MonthBucket`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<MonthBucket>")]
pub struct MonthlyHistogram {
    counts: [u64; 12],
}

impl MonthlyHistogram {
    /// Adds one accident to `month` (0-11). Out-of-range months are
    /// ignored.
    pub fn record(&mut self, month: usize) {
        if let Some(count) = self.counts.get_mut(month) {
            *count += 1;
        }
    }

    /// Count for `month` (0-11); zero when out of range.
    #[must_use]
    pub fn count(&self, month: usize) -> u64 {
        self.counts.get(month).copied().unwrap_or(0)
    }

    /// Raw counts, January first.
    #[must_use]
    pub const fn counts(&self) -> &[u64; 12] {
        &self.counts
    }

    /// Sum over all months.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Labelled buckets in calendar order.
    #[must_use]
    pub fn buckets(&self) -> Vec<MonthBucket> {
        MONTH_NAMES
            .iter()
            .zip(self.counts)
            .map(|(name, count)| MonthBucket {
                name: (*name).to_string(),
                count,
            })
            .collect()
    }
}

impl From<[u64; 12]> for MonthlyHistogram {
    fn from(counts: [u64; 12]) -> Self {
        Self { counts }
    }
}

impl From<MonthlyHistogram> for Vec<MonthBucket> {
    fn from(value: MonthlyHistogram) -> Self {
        value.buckets()
    }
}

/// Property bag carried by every accident point feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentProperties {
    /// Upstream accident identifier.
    pub id: i64,
    /// Severity label as received.
    pub severity: Option<String>,
    /// Display date (`dd/mm/yyyy`), or the raw string if unparseable.
    pub date: String,
    /// Location description.
    pub location: String,
    /// Number of casualties.
    pub casualties: usize,
    /// Number of vehicles.
    pub vehicles: usize,
}

/// Everything the views render, derived from one (records, filter) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedViews {
    /// The filter these views were computed for.
    pub filter: FilterState,
    /// Map points passing the severity filter, in input order.
    pub geometry: FeatureCollection,
    /// Full-year totals.
    pub counts: SeverityCounts,
    /// Monthly counts of the filtered records.
    pub histogram: MonthlyHistogram,
    /// Bar colour for the histogram under the active filter.
    pub bar_color: &'static str,
}

/// Tri-state progress of the current year's fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadState {
    /// A request is in flight.
    Loading,
    /// The latest request failed.
    Failed {
        /// User-facing failure message.
        message: String,
    },
    /// Records for the selected year are loaded.
    Ready,
}

impl LoadState {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The failure message, if the latest request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            Self::Loading | Self::Ready => None,
        }
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.west..=self.east).contains(&longitude) && (self.south..=self.north).contains(&latitude)
    }
}

/// Fixed camera and extent configuration for the accident map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewport {
    /// Initial centre longitude.
    pub longitude: f64,
    /// Initial centre latitude.
    pub latitude: f64,
    /// Initial zoom.
    pub zoom: f64,
    /// Lowest zoom the user may reach.
    pub min_zoom: f64,
    /// Highest zoom the user may reach.
    pub max_zoom: f64,
    /// Panning limit.
    pub max_bounds: BoundingBox,
    /// Basemap style document.
    pub map_style: &'static str,
    /// Id of the interactive accident layer.
    pub layer_id: &'static str,
}

/// Popup content for a hovered accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupDetails {
    /// Severity label as received.
    pub severity: Option<String>,
    /// Heading, e.g. `"Fatal Accident"`. `None` for unrecognized labels.
    pub title: Option<&'static str>,
    /// Heading colour.
    pub color: &'static str,
    /// Display date.
    pub date: String,
    /// Location description.
    pub location: String,
    /// Number of casualties.
    pub casualties: usize,
    /// Number of vehicles.
    pub vehicles: usize,
}

/// A popup anchored at the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverInfo {
    /// Pointer longitude.
    pub longitude: f64,
    /// Pointer latitude.
    pub latitude: f64,
    /// What the popup shows.
    pub details: PopupDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_ignores_out_of_range_months() {
        let mut histogram = MonthlyHistogram::default();
        histogram.record(0);
        histogram.record(11);
        histogram.record(12);
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.count(0), 1);
        assert_eq!(histogram.count(11), 1);
        assert_eq!(histogram.count(12), 0);
    }

    #[test]
    fn histogram_serializes_as_labelled_buckets() {
        let mut counts = [0; 12];
        counts[2] = 4;
        let json = serde_json::to_value(MonthlyHistogram::from(counts)).unwrap();
        let buckets = json.as_array().unwrap();
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0]["name"], "Jan");
        assert_eq!(buckets[2]["name"], "Mar");
        assert_eq!(buckets[2]["count"], 4);
        assert_eq!(buckets[11]["name"], "Dec");
    }

    #[test]
    fn load_state_exposes_error_message() {
        let failed = LoadState::Failed {
            message: "boom".to_string(),
        };
        assert_eq!(failed.error(), Some("boom"));
        assert!(!failed.is_loading());
        assert!(LoadState::Loading.is_loading());
        assert_eq!(LoadState::Ready.error(), None);
    }

    #[test]
    fn bounding_box_contains_edges() {
        let bbox = BoundingBox::new(-1.0, 51.0, 0.8, 52.0);
        assert!(bbox.contains(-0.1276, 51.5072));
        assert!(bbox.contains(-1.0, 52.0));
        assert!(!bbox.contains(1.0, 51.5));
        assert!(!bbox.contains(0.0, 50.9));
    }

    #[test]
    fn filter_state_defaults_to_latest_year_all_severities() {
        let filter = FilterState::default();
        assert_eq!(filter.year, Year::default());
        assert_eq!(filter.severity, SeverityFilter::All);
    }
}
