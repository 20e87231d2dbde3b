//! Pure derivations from raw accident records.
//!
//! Every function here is a pure function of its inputs and rebuilds its
//! output from scratch. Records with a missing or unrecognized severity,
//! an unparseable date or no usable position are excluded from the
//! affected view without raising an error. Months and display dates are
//! read on London clocks.

use chrono::Datelike as _;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value, feature::Id};
use road_safety_accident_models::{
    AccidentRecord, Severity, SeverityFilter, parse_accident_local_time,
};
use road_safety_dashboard_models::{
    AccidentProperties, DerivedViews, FilterState, MonthlyHistogram, SeverityCounts,
};

/// Display format for feature dates.
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Runs every derivation for one (records, filter) pair.
#[must_use]
pub fn derive(records: &[AccidentRecord], filter: FilterState) -> DerivedViews {
    DerivedViews {
        filter,
        geometry: derive_geometry(records, filter.severity),
        counts: derive_counts(records),
        histogram: derive_histogram(records, filter.severity),
        bar_color: filter.severity.color(),
    }
}

/// Builds one point feature per positioned record passing `severity`, in
/// input order.
#[must_use]
pub fn derive_geometry(records: &[AccidentRecord], severity: SeverityFilter) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: filtered(records, severity)
            .filter_map(|record| match record.position() {
                Some(position) => Some(to_feature(record, position)),
                None => {
                    log::debug!("Leaving accident {} off the map: no position", record.id);
                    None
                }
            })
            .collect(),
        foreign_members: None,
    }
}

/// Counts the full, unfiltered record list by severity label.
#[must_use]
pub fn derive_counts(records: &[AccidentRecord]) -> SeverityCounts {
    records
        .iter()
        .fold(SeverityCounts::default(), |mut counts, record| {
            counts.total += 1;
            match record.severity() {
                Some(Severity::Fatal) => counts.fatal += 1,
                Some(Severity::Serious) => counts.serious += 1,
                Some(Severity::Slight) => counts.slight += 1,
                None => counts.unrecognized += 1,
            }
            counts
        })
}

/// Buckets records passing `severity` by calendar month, London time.
#[must_use]
pub fn derive_histogram(records: &[AccidentRecord], severity: SeverityFilter) -> MonthlyHistogram {
    let mut histogram = MonthlyHistogram::default();
    for record in filtered(records, severity) {
        match record.occurred_local() {
            Some(at) => histogram.record(at.month0() as usize),
            None => log::debug!(
                "Skipping accident {} with unparseable date {:?}",
                record.id,
                record.date
            ),
        }
    }
    histogram
}

/// Property bag for one accident.
#[must_use]
pub fn accident_properties(record: &AccidentRecord) -> AccidentProperties {
    AccidentProperties {
        id: record.id,
        severity: record.severity.clone(),
        date: display_date(&record.date),
        location: record.location.clone().unwrap_or_default(),
        casualties: record.casualty_count(),
        vehicles: record.vehicle_count(),
    }
}

/// Formats an accident date as `dd/mm/yyyy`, passing unparseable input
/// through unchanged.
#[must_use]
pub fn display_date(raw: &str) -> String {
    parse_accident_local_time(raw).map_or_else(
        || raw.to_string(),
        |at| at.format(DISPLAY_DATE_FORMAT).to_string(),
    )
}

fn filtered(
    records: &[AccidentRecord],
    severity: SeverityFilter,
) -> impl Iterator<Item = &AccidentRecord> {
    records
        .iter()
        .filter(move |record| severity.matches(record.severity_label()))
}

fn to_feature(record: &AccidentRecord, (lon, lat): (f64, f64)) -> Feature {
    let properties = accident_properties(record);
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
        id: Some(Id::Number(record.id.into())),
        properties: Some(properties_object(properties)),
        foreign_members: None,
    }
}

fn properties_object(properties: AccidentProperties) -> JsonObject {
    let mut object = JsonObject::new();
    object.insert("id".to_string(), properties.id.into());
    object.insert(
        "severity".to_string(),
        properties.severity.map_or(JsonValue::Null, JsonValue::String),
    );
    object.insert("date".to_string(), properties.date.into());
    object.insert("location".to_string(), properties.location.into());
    object.insert("casualties".to_string(), properties.casualties.into());
    object.insert("vehicles".to_string(), properties.vehicles.into());
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, three_records};
    use road_safety_accident_models::Year;

    fn all() -> FilterState {
        FilterState::default()
    }

    fn only(severity: SeverityFilter) -> FilterState {
        FilterState {
            year: Year::default(),
            severity,
        }
    }

    #[test]
    fn all_filter_keeps_every_record() {
        let views = derive(&three_records(), all());

        assert_eq!(views.geometry.features.len(), 3);
        assert_eq!(
            views.counts,
            SeverityCounts {
                total: 3,
                fatal: 1,
                serious: 1,
                slight: 1,
                unrecognized: 0,
            }
        );
        let mut expected = [0; 12];
        expected[2] = 2;
        expected[6] = 1;
        assert_eq!(views.histogram.counts(), &expected);
        assert_eq!(views.bar_color, "#60a5fa");
    }

    #[test]
    fn severity_filter_narrows_geometry_and_histogram_only() {
        let records = three_records();
        let views = derive(&records, only(SeverityFilter::Fatal));

        assert_eq!(views.geometry.features.len(), 1);
        let mut expected = [0; 12];
        expected[2] = 1;
        assert_eq!(views.histogram.counts(), &expected);
        assert_eq!(views.counts, derive(&records, all()).counts);
        assert_eq!(views.bar_color, "#ef4444");
    }

    #[test]
    fn empty_input_yields_zeroed_views() {
        let views = derive(&[], all());
        assert!(views.geometry.features.is_empty());
        assert_eq!(views.histogram.counts(), &[0; 12]);
        assert_eq!(views.counts, SeverityCounts::default());
    }

    #[test]
    fn filter_without_matches_leaves_counts_untouched() {
        let records = vec![record(1, Some("Slight"), "2019-01-01")];
        let views = derive(&records, only(SeverityFilter::Fatal));
        assert!(views.geometry.features.is_empty());
        assert_eq!(views.histogram.total(), 0);
        assert_eq!(views.counts.total, 1);
        assert_eq!(views.counts.slight, 1);
    }

    #[test]
    fn geometry_length_matches_filter_for_every_option() {
        let mut records = three_records();
        records.push(record(4, Some("Fatal"), "2019-12-31"));
        records.push(record(5, None, "2019-02-01"));
        records.push(record(6, Some("fatal"), "2019-02-01"));

        for filter in SeverityFilter::all() {
            let expected = records
                .iter()
                .filter(|r| match filter.severity() {
                    None => true,
                    Some(s) => r.severity_label() == Some(s.as_ref()),
                })
                .count();
            let geometry = derive_geometry(&records, *filter);
            assert_eq!(geometry.features.len(), expected, "{filter}");

            let histogram = derive_histogram(&records, *filter);
            assert_eq!(histogram.total(), expected as u64, "{filter}");
        }
    }

    #[test]
    fn counts_put_unknown_labels_in_total_only() {
        let records = vec![
            record(1, Some("Fatal"), "2019-01-01"),
            record(2, None, "2019-01-01"),
            record(3, Some("Minor"), "2019-01-01"),
            record(4, Some("SLIGHT"), "2019-01-01"),
        ];
        let counts = derive_counts(&records);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.fatal, 1);
        assert_eq!(counts.slight, 0);
        assert_eq!(counts.unrecognized, 3);
        assert_eq!(
            counts.total,
            counts.fatal + counts.serious + counts.slight + counts.unrecognized
        );
    }

    #[test]
    fn unparseable_dates_are_dropped_from_histogram_only() {
        let records = vec![
            record(1, Some("Serious"), "2019-04-10T08:00:00Z"),
            record(2, Some("Serious"), "garbage"),
            record(3, Some("Serious"), ""),
        ];
        let views = derive(&records, all());
        assert_eq!(views.geometry.features.len(), 3);
        assert_eq!(views.histogram.total(), 1);
        assert_eq!(views.histogram.count(3), 1);
    }

    #[test]
    fn features_preserve_input_order_and_properties() {
        let records = vec![
            record(30, Some("Slight"), "2019-11-02T17:45:00Z"),
            record(10, Some("Fatal"), "2019-01-15"),
            record(20, Some("Serious"), "bad date"),
        ];
        let geometry = derive_geometry(&records, SeverityFilter::All);
        let ids: Vec<_> = geometry
            .features
            .iter()
            .map(|f| f.property("id").and_then(JsonValue::as_i64).unwrap())
            .collect();
        assert_eq!(ids, vec![30, 10, 20]);

        let first = &geometry.features[0];
        assert_eq!(first.property("date").unwrap(), "02/11/2019");
        assert_eq!(first.property("location").unwrap(), "Location 30");
        assert_eq!(first.property("casualties").unwrap(), 2);
        assert_eq!(first.property("vehicles").unwrap(), 1);
        assert_eq!(first.id, Some(Id::Number(30.into())));
        match &first.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![-0.12, 51.5]),
            other => panic!("expected point, got {other:?}"),
        }

        assert_eq!(geometry.features[2].property("date").unwrap(), "bad date");
    }

    #[test]
    fn missing_severity_serializes_as_null() {
        let geometry = derive_geometry(&[record(1, None, "2019-01-01")], SeverityFilter::All);
        assert_eq!(
            geometry.features[0].property("severity"),
            Some(&JsonValue::Null)
        );
    }

    #[test]
    fn unpositioned_records_are_left_off_the_map_only() {
        let mut no_coords = record(2, Some("Fatal"), "2019-03-09");
        no_coords.lat = None;
        let mut null_island = record(3, Some("Fatal"), "2019-04-01");
        null_island.lat = Some(0.0);
        null_island.lon = Some(0.0);
        let records = vec![record(1, Some("Fatal"), "2019-03-05"), no_coords, null_island];

        let views = derive(&records, only(SeverityFilter::Fatal));
        assert_eq!(views.geometry.features.len(), 1);
        assert_eq!(views.geometry.features[0].id, Some(Id::Number(1.into())));
        assert_eq!(views.counts.total, 3);
        assert_eq!(views.counts.fatal, 3);
        assert_eq!(views.histogram.count(2), 2);
        assert_eq!(views.histogram.count(3), 1);
    }

    #[test]
    fn months_are_bucketed_on_london_clocks() {
        let records = vec![
            // 00:30 BST on 1 July.
            record(1, Some("Slight"), "2019-06-30T23:30:00Z"),
            // GMT in winter, stays in January.
            record(2, Some("Slight"), "2019-01-31T23:30:00Z"),
        ];
        let views = derive(&records, all());
        assert_eq!(views.histogram.count(6), 1);
        assert_eq!(views.histogram.count(5), 0);
        assert_eq!(views.histogram.count(0), 1);
        assert_eq!(
            views.geometry.features[0].property("date").unwrap(),
            "01/07/2019"
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        let records = three_records();
        for filter in SeverityFilter::all() {
            let filter = only(*filter);
            assert_eq!(derive(&records, filter), derive(&records, filter));
        }
    }
}
