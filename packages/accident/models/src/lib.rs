#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident record, severity and year types for the road safety dashboard.
//!
//! [`AccidentRecord`] mirrors the shape returned by the Transport for
//! London `AccidentStats` API. Severity labels are kept as received so
//! that unrecognized values survive deserialization; the closed
//! [`Severity`] set and the shared severity palette live here so the map
//! and chart encodings cannot drift apart.

use chrono::{DateTime, Datelike as _, Days, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Accident outcome category.
///
/// String forms match the upstream labels exactly (`"Fatal"`, `"Serious"`,
/// `"Slight"`). Parsing is case-sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Severity {
    /// At least one casualty died.
    Fatal,
    /// At least one casualty was seriously injured.
    Serious,
    /// Only slight injuries.
    Slight,
}

impl Severity {
    /// Parses an upstream severity label. Returns `None` for anything
    /// outside the closed set.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }

    /// Returns the marker style for this severity.
    #[must_use]
    pub const fn style(self) -> SeverityStyle {
        match self {
            Self::Fatal => SeverityStyle {
                radius: 8,
                color: "#ef4444",
            },
            Self::Serious => SeverityStyle {
                radius: 5,
                color: "#fb923c",
            },
            Self::Slight => SeverityStyle {
                radius: 3,
                color: "#facc15",
            },
        }
    }

    /// Popup heading for an accident of this severity.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Fatal => "Fatal Accident",
            Self::Serious => "Serious Accident",
            Self::Slight => "Slight Accident",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Fatal, Self::Serious, Self::Slight]
    }
}

/// Radius and colour used to draw one accident marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityStyle {
    /// Circle radius in pixels.
    pub radius: u8,
    /// CSS hex colour.
    pub color: &'static str,
}

/// Smallest, neutral tier used for labels outside the closed set.
pub const DEFAULT_STYLE: SeverityStyle = SeverityStyle {
    radius: 3,
    color: "#facc15",
};

/// Chart colour used when no severity filter is active.
pub const ALL_SEVERITIES_COLOR: &str = "#60a5fa";

impl SeverityStyle {
    /// Resolves the style for a raw upstream label, falling back to
    /// [`DEFAULT_STYLE`].
    #[must_use]
    pub fn for_label(label: Option<&str>) -> Self {
        label
            .and_then(Severity::from_label)
            .map_or(DEFAULT_STYLE, Severity::style)
    }
}

/// User-selected severity filter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SeverityFilter {
    /// Pass every record through.
    #[default]
    All,
    /// Only `Fatal` records.
    Fatal,
    /// Only `Serious` records.
    Serious,
    /// Only `Slight` records.
    Slight,
}

impl SeverityFilter {
    /// The severity this filter selects, or `None` for [`Self::All`].
    #[must_use]
    pub const fn severity(self) -> Option<Severity> {
        match self {
            Self::All => None,
            Self::Fatal => Some(Severity::Fatal),
            Self::Serious => Some(Severity::Serious),
            Self::Slight => Some(Severity::Slight),
        }
    }

    /// Whether a record carrying `label` passes this filter.
    ///
    /// Matching is an exact label comparison, so a record with a missing
    /// or unrecognized label only passes [`Self::All`].
    #[must_use]
    pub fn matches(self, label: Option<&str>) -> bool {
        self.severity()
            .is_none_or(|severity| label == Some(severity.as_ref()))
    }

    /// Bar colour for the trend chart under this filter.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self.severity() {
            Some(severity) => severity.style().color,
            None => ALL_SEVERITIES_COLOR,
        }
    }

    /// Returns all variants of this enum, in selector order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::All, Self::Fatal, Self::Serious, Self::Slight]
    }
}

impl From<Severity> for SeverityFilter {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Fatal => Self::Fatal,
            Severity::Serious => Self::Serious,
            Severity::Slight => Self::Slight,
        }
    }
}

/// Error returned when parsing a [`SeverityFilter`] from user input fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid severity {:?}: expected one of All, Fatal, Serious, Slight",
            self.value
        )
    }
}

impl std::error::Error for InvalidSeverityError {}

impl SeverityFilter {
    /// Parses a filter from user input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSeverityError`] if `value` is not an exact filter
    /// label.
    pub fn parse(value: &str) -> Result<Self, InvalidSeverityError> {
        value.parse().map_err(|_| InvalidSeverityError {
            value: value.to_string(),
        })
    }
}

/// A year for which accident statistics are offered.
///
/// Serialized as a string (`"2019"`), matching the year selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Year(u16);

impl Year {
    /// Oldest supported year.
    pub const MIN: u16 = 2015;
    /// Newest supported year.
    pub const MAX: u16 = 2019;

    /// Creates a year, rejecting anything outside the supported range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidYearError`] if the year is not supported.
    pub fn new(value: u16) -> Result<Self, InvalidYearError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidYearError {
                value: value.to_string(),
            })
        }
    }

    /// Returns the numeric year.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns every supported year, newest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self(2019), Self(2018), Self(2017), Self(2016), Self(2015)]
    }
}

impl Default for Year {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Year {
    type Err = InvalidYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u16>().map_err(|_| InvalidYearError {
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl TryFrom<String> for Year {
    type Error = InvalidYearError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Year> for String {
    fn from(value: Year) -> Self {
        value.to_string()
    }
}

/// Error returned when a year is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidYearError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidYearError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported year {:?}: expected {}-{}",
            self.value,
            Year::MIN,
            Year::MAX
        )
    }
}

impl std::error::Error for InvalidYearError {}

/// One accident as returned by the `AccidentStats` API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Upstream accident identifier.
    pub id: i64,
    /// Latitude (WGS84).
    #[serde(default, deserialize_with = "lenient")]
    pub lat: Option<f64>,
    /// Longitude (WGS84).
    #[serde(default, deserialize_with = "lenient")]
    pub lon: Option<f64>,
    /// Free-text location description.
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,
    /// Occurrence timestamp as sent upstream (ISO 8601).
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub date: String,
    /// Severity label as sent upstream. Not validated.
    #[serde(default, deserialize_with = "lenient")]
    pub severity: Option<String>,
    /// London borough name.
    #[serde(default, deserialize_with = "lenient")]
    pub borough: Option<String>,
    /// People involved.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub casualties: Vec<Casualty>,
    /// Vehicles involved.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub vehicles: Vec<Vehicle>,
}

impl AccidentRecord {
    /// The raw severity label, if present.
    #[must_use]
    pub fn severity_label(&self) -> Option<&str> {
        self.severity.as_deref()
    }

    /// The severity if the label is one of the closed set.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity_label().and_then(Severity::from_label)
    }

    /// `(lon, lat)` if both coordinates are present, finite and non-zero.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = self.lat.filter(|v| v.is_finite() && *v != 0.0)?;
        let lon = self.lon.filter(|v| v.is_finite() && *v != 0.0)?;
        Some((lon, lat))
    }

    /// Parsed occurrence time, or `None` if the date is unparseable.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_accident_date(&self.date)
    }

    /// Occurrence time on London clocks, or `None` if the date is
    /// unparseable.
    #[must_use]
    pub fn occurred_local(&self) -> Option<NaiveDateTime> {
        parse_accident_local_time(&self.date)
    }

    /// Number of casualty sub-records.
    #[must_use]
    pub fn casualty_count(&self) -> usize {
        self.casualties.len()
    }

    /// Number of vehicle sub-records.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }
}

/// A person hurt in an accident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Casualty {
    /// Age in years. Negative or non-numeric upstream values read as
    /// `None`.
    #[serde(default, deserialize_with = "lenient")]
    pub age: Option<u32>,
    /// Driver, passenger or pedestrian.
    #[serde(default, deserialize_with = "lenient")]
    pub class: Option<String>,
    /// Injury severity label.
    #[serde(default, deserialize_with = "lenient")]
    pub severity: Option<String>,
    /// Mode of travel.
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<String>,
    /// Age band (e.g. `"Adult"`).
    #[serde(default, deserialize_with = "lenient")]
    pub age_band: Option<String>,
}

/// A vehicle involved in an accident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle type (e.g. `"Car"`, `"PedalCycle"`).
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub vehicle_type: Option<String>,
}

/// Parses an accident date.
///
/// Accepts RFC 3339 (`2019-01-24T15:40:00Z`), a naive ISO 8601 timestamp
/// with or without fractional seconds, or a bare `YYYY-MM-DD` date
/// (midnight UTC).
#[must_use]
pub fn parse_accident_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses an accident date into London wall-clock time.
///
/// Timestamps carrying an offset are converted with [`to_london_time`].
/// Naive timestamps are taken as already local. A bare date is midnight
/// UTC, which never changes the London calendar day.
#[must_use]
pub fn parse_accident_local_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(to_london_time(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| parse_accident_date(s).map(to_london_time))
}

/// Converts a UTC instant to London wall-clock time.
///
/// British Summer Time (UTC+1) runs from 01:00 UTC on the last Sunday of
/// March to 01:00 UTC on the last Sunday of October.
#[must_use]
pub fn to_london_time(at: DateTime<Utc>) -> NaiveDateTime {
    let utc = at.naive_utc();
    let year = utc.year();
    let bst = match (last_sunday(year, 3), last_sunday(year, 10)) {
        (Some(start), Some(end)) => {
            let start = start.and_hms_opt(1, 0, 0);
            let end = end.and_hms_opt(1, 0, 0);
            matches!((start, end), (Some(start), Some(end)) if utc >= start && utc < end)
        }
        _ => false,
    };
    if bst { utc + TimeDelta::hours(1) } else { utc }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let last_day = NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()?;
    last_day.checked_sub_days(Days::new(u64::from(
        last_day.weekday().num_days_from_sunday(),
    )))
}

/// Reads an optional field, treating `null` or a value of the wrong type
/// as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Valid(T),
        #[allow(dead_code)]
        Invalid(IgnoredAny),
    }

    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Valid(value)) => Some(value),
        Some(Lenient::Invalid(_)) | None => None,
    })
}

/// Like [`lenient`], falling back to `T::default()`.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}
