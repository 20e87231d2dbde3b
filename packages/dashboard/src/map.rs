//! Map view contract: viewport, marker encoding and hover lookup.
//!
//! Rendering is left to whatever mapping library the UI uses. What lives
//! here is the part of the map that has to agree with the rest of the
//! dashboard: which colour and radius a severity gets, and what popup a
//! hovered point produces.

use geojson::{Feature, FeatureCollection, JsonValue, feature::Id};
use road_safety_accident_models::{Severity, SeverityStyle};
use road_safety_dashboard_models::{
    AccidentProperties, BoundingBox, HoverInfo, MapViewport, PopupDetails,
};

/// Greater London camera, extent and basemap.
pub const LONDON_VIEWPORT: MapViewport = MapViewport {
    longitude: -0.1276,
    latitude: 51.5072,
    zoom: 10.5,
    min_zoom: 9.0,
    max_zoom: 18.0,
    max_bounds: BoundingBox::new(-1.0, 51.0, 0.8, 52.0),
    map_style: "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json",
    layer_id: "accidents-layer",
};

/// Marker style for a feature, keyed by its `severity` property.
#[must_use]
pub fn feature_style(feature: &Feature) -> SeverityStyle {
    SeverityStyle::for_label(feature.property("severity").and_then(JsonValue::as_str))
}

/// Reads the accident property bag back out of a feature.
#[must_use]
pub fn feature_properties(feature: &Feature) -> Option<AccidentProperties> {
    let properties = feature.properties.clone()?;
    serde_json::from_value(JsonValue::Object(properties))
        .inspect_err(|e| log::debug!("Feature has no accident properties: {e}"))
        .ok()
}

/// Finds the feature for an accident id.
#[must_use]
pub fn find_feature(collection: &FeatureCollection, id: i64) -> Option<&Feature> {
    let id = Id::Number(id.into());
    collection
        .features
        .iter()
        .find(|feature| feature.id.as_ref() == Some(&id))
}

/// Popup content for the accident `id` in `collection`, if it is on the
/// map.
#[must_use]
pub fn accident_popup(collection: &FeatureCollection, id: i64) -> Option<PopupDetails> {
    feature_properties(find_feature(collection, id)?).map(popup_details)
}

/// Resolves the popup for the pointer position.
///
/// `hovered` is whatever the renderer reports under the pointer on the
/// accident layer; the topmost (first) feature wins. Returns `None`,
/// meaning the popup is hidden, when nothing is hovered, the pointer is
/// outside the map extent, or the feature carries no accident properties.
#[must_use]
pub fn hover_info(hovered: &[Feature], longitude: f64, latitude: f64) -> Option<HoverInfo> {
    if !LONDON_VIEWPORT.max_bounds.contains(longitude, latitude) {
        return None;
    }
    let properties = feature_properties(hovered.first()?)?;
    Some(HoverInfo {
        longitude,
        latitude,
        details: popup_details(properties),
    })
}

/// Popup content for one accident.
#[must_use]
pub fn popup_details(properties: AccidentProperties) -> PopupDetails {
    let label = properties.severity.as_deref();
    PopupDetails {
        title: label.and_then(Severity::from_label).map(Severity::title),
        color: SeverityStyle::for_label(label).color,
        severity: properties.severity,
        date: properties.date,
        location: properties.location,
        casualties: properties.casualties,
        vehicles: properties.vehicles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, three_records};
    use crate::pipeline::derive_geometry;
    use road_safety_accident_models::{DEFAULT_STYLE, SeverityFilter};

    #[test]
    fn viewport_centre_is_inside_bounds() {
        let viewport = LONDON_VIEWPORT;
        assert!(
            viewport
                .max_bounds
                .contains(viewport.longitude, viewport.latitude)
        );
        assert!(viewport.min_zoom <= viewport.zoom && viewport.zoom <= viewport.max_zoom);
    }

    #[test]
    fn feature_style_follows_severity() {
        let geometry = derive_geometry(
            &[
                record(1, Some("Fatal"), "2019-01-01"),
                record(2, Some("Unknown"), "2019-01-01"),
                record(3, None, "2019-01-01"),
            ],
            SeverityFilter::All,
        );
        assert_eq!(feature_style(&geometry.features[0]), Severity::Fatal.style());
        assert_eq!(feature_style(&geometry.features[1]), DEFAULT_STYLE);
        assert_eq!(feature_style(&geometry.features[2]), DEFAULT_STYLE);
    }

    #[test]
    fn hover_uses_first_feature_and_pointer_position() {
        let geometry = derive_geometry(&three_records(), SeverityFilter::All);
        let info = hover_info(&geometry.features[1..], -0.2, 51.4).unwrap();

        assert!((info.longitude - -0.2).abs() < f64::EPSILON);
        assert!((info.latitude - 51.4).abs() < f64::EPSILON);
        assert_eq!(info.details.severity.as_deref(), Some("Slight"));
        assert_eq!(info.details.title, Some("Slight Accident"));
        assert_eq!(info.details.date, "20/03/2019");
        assert_eq!(info.details.location, "Location 2");
        assert_eq!(info.details.casualties, 2);
        assert_eq!(info.details.vehicles, 1);
    }

    #[test]
    fn hover_over_nothing_hides_popup() {
        assert!(hover_info(&[], -0.1, 51.5).is_none());
        let bare = Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        };
        assert!(hover_info(&[bare], -0.1, 51.5).is_none());
    }

    #[test]
    fn popup_for_unknown_severity_has_no_title() {
        let geometry = derive_geometry(&[record(9, Some("Other"), "2019-01-01")], SeverityFilter::All);
        let info = hover_info(&geometry.features, 0.0, 51.5).unwrap();
        assert_eq!(info.details.title, None);
        assert_eq!(info.details.color, DEFAULT_STYLE.color);
    }

    #[test]
    fn pointer_outside_map_extent_hides_popup() {
        let geometry = derive_geometry(&three_records(), SeverityFilter::All);
        assert!(hover_info(&geometry.features, -1.5, 51.5).is_none());
        assert!(hover_info(&geometry.features, -0.1, 52.2).is_none());
        assert!(hover_info(&geometry.features, -1.0, 51.0).is_some());
    }

    #[test]
    fn popup_by_id_reads_feature_properties() {
        let geometry = derive_geometry(&three_records(), SeverityFilter::All);
        let popup = accident_popup(&geometry, 1).unwrap();
        assert_eq!(popup.title, Some("Fatal Accident"));
        assert_eq!(popup.date, "05/03/2019");
        assert_eq!(popup.color, Severity::Fatal.style().color);
        assert!(accident_popup(&geometry, 42).is_none());
    }

    #[test]
    fn finds_feature_by_accident_id() {
        let geometry = derive_geometry(&three_records(), SeverityFilter::All);
        let feature = find_feature(&geometry, 3).unwrap();
        assert_eq!(feature.property("severity").unwrap(), "Serious");
        assert!(find_feature(&geometry, 99).is_none());
    }
}
