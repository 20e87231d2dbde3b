//! Plain-text rendering of the dashboard views.

use std::fmt::Write as _;

use road_safety_dashboard_models::{DerivedViews, LoadState, MONTH_NAMES};

/// Width of the longest histogram bar, in characters.
const BAR_WIDTH: u64 = 40;

/// Renders the stat panel and trend chart, preceded by a banner when the
/// latest fetch failed.
#[must_use]
pub fn render_dashboard(views: &DerivedViews, load: &LoadState) -> String {
    let mut out = String::new();

    if let Some(message) = load.error() {
        writeln!(out, "Data loading failed: {message}").unwrap();
        writeln!(out).unwrap();
    }

    let counts = &views.counts;
    writeln!(out, "{} data insights", views.filter.year).unwrap();
    writeln!(out, "  Total accidents    {:>10}", group_thousands(counts.total)).unwrap();
    writeln!(out, "  Fatal              {:>10}", group_thousands(counts.fatal)).unwrap();
    writeln!(out, "  Serious            {:>10}", group_thousands(counts.serious)).unwrap();
    writeln!(out, "  Slight             {:>10}", group_thousands(counts.slight)).unwrap();
    if counts.unrecognized > 0 {
        writeln!(
            out,
            "  Unrecognized       {:>10}",
            group_thousands(counts.unrecognized)
        )
        .unwrap();
    }

    writeln!(out).unwrap();
    writeln!(
        out,
        "Monthly accident trend ({} level)",
        views.filter.severity.as_ref().to_lowercase()
    )
    .unwrap();

    let max = views.histogram.counts().iter().copied().max().unwrap_or(0);
    for (name, count) in MONTH_NAMES.iter().zip(views.histogram.counts()) {
        let width = if max == 0 { 0 } else { count * BAR_WIDTH / max };
        let bar = "#".repeat(usize::try_from(width).unwrap_or(0));
        writeln!(out, "  {name} {count:>7} {bar}").unwrap();
    }

    writeln!(out).unwrap();
    writeln!(
        out,
        "Points on map: {}",
        group_thousands(views.geometry.features.len() as u64)
    )
    .unwrap();

    out
}

/// Formats `n` with comma thousands separators.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_safety_accident_models::{AccidentRecord, SeverityFilter};
    use road_safety_dashboard::pipeline::derive;
    use road_safety_dashboard_models::FilterState;

    fn record(id: i64, severity: &str, date: &str) -> AccidentRecord {
        AccidentRecord {
            id,
            lat: Some(51.5),
            lon: Some(-0.1),
            location: None,
            date: date.to_string(),
            severity: Some(severity.to_string()),
            borough: None,
            casualties: Vec::new(),
            vehicles: Vec::new(),
        }
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(54_321), "54,321");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn renders_counts_and_histogram() {
        let records = vec![
            record(1, "Fatal", "2019-03-05"),
            record(2, "Slight", "2019-03-20"),
            record(3, "Serious", "2019-07-01"),
        ];
        let views = derive(&records, FilterState::default());
        let text = render_dashboard(&views, &LoadState::Ready);

        assert!(text.contains("2019 data insights"));
        assert!(text.contains("(all level)"));
        assert!(text.contains(&format!("  Mar {:>7} {}", 2, "#".repeat(40))));
        assert!(text.contains(&format!("  Jul {:>7} {}", 1, "#".repeat(20))));
        assert!(text.contains("Points on map: 3"));
        assert!(!text.contains("Unrecognized"));
        assert!(!text.contains("Data loading failed"));
    }

    #[test]
    fn renders_failure_banner() {
        let views = derive(
            &[],
            FilterState {
                severity: SeverityFilter::Slight,
                ..FilterState::default()
            },
        );
        let load = LoadState::Failed {
            message: "API request failed, please try again later".to_string(),
        };
        let text = render_dashboard(&views, &load);
        assert!(text.starts_with("Data loading failed: API request failed"));
        assert!(text.contains("(slight level)"));
        assert!(text.contains("Points on map: 0"));
    }
}
