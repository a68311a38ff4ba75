//! Pure mapping from fetched records to the strings and styles the map and
//! list render. Nothing in here touches the DOM or the map widget, so all of
//! it runs under plain `cargo test`.

use serde_json::Value;
use shared::Spot;

use crate::overlay::Group;

/// Stroke/fill parameters handed to the shape layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub color: &'static str,
    pub weight: f64,
    /// `None` renders the shape unfilled.
    pub fill_opacity: Option<f64>,
}

pub const BOUNDARY_STYLE: ShapeStyle = ShapeStyle {
    color: "green",
    weight: 2.0,
    fill_opacity: Some(0.1),
};

pub const ROAD_STYLE: ShapeStyle = ShapeStyle {
    color: "gray",
    weight: 1.0,
    fill_opacity: None,
};

// Upstream GeoJSON is inconsistent about where the display name lives, so
// each group carries an ordered list of candidate property keys.
const BOUNDARY_NAME_KEYS: &[&str] = &["FORESTNAME", "Name", "NAME"];
const ROAD_NAME_KEYS: &[&str] = &["NAME", "Name", "ROADNAME"];

/// Property key the popup text is stashed under after [`annotate_shape_popups`].
pub const POPUP_PROPERTY: &str = "_popup";

/// One renderable point marker derived from a [`Spot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpotMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub popup_html: String,
}

impl SpotMarker {
    /// A spot becomes a marker only when both coordinates are present.
    pub fn from_spot(spot: &Spot) -> Option<Self> {
        let (latitude, longitude) = spot.coordinates()?;
        Some(Self {
            latitude,
            longitude,
            popup_html: spot_popup_html(spot),
        })
    }
}

/// Popup body for a spot marker: name and location always, description and
/// state only when present.
pub fn spot_popup_html(spot: &Spot) -> String {
    let mut html = format!(
        "<b>{}</b><br>{}",
        escape_html(&spot.name),
        escape_html(&spot.location)
    );
    if let Some(description) = spot.description.as_deref().filter(|d| !d.is_empty()) {
        html.push_str("<br>");
        html.push_str(&escape_html(description));
    }
    if let Some(state) = spot.state.as_deref() {
        html.push_str("<br><strong>State:</strong> ");
        html.push_str(&escape_html(state));
    }
    html
}

/// One list row, `"name — location (state)"`, the state part omitted when
/// the record has none.
pub fn list_line(spot: &Spot) -> String {
    match spot.state.as_deref() {
        Some(state) => format!("{} — {} ({state})", spot.name, spot.location),
        None => format!("{} — {}", spot.name, spot.location),
    }
}

/// Placeholder row shown when the fetched set is empty.
pub fn empty_list_line(filter: Option<&str>) -> String {
    match filter {
        Some(code) => format!("No spots found in {code}"),
        None => "No spots available".to_string(),
    }
}

/// Display name for a boundary/road feature, trying the group's candidate
/// property keys in precedence order.
pub fn shape_label(group: Group, properties: Option<&Value>) -> String {
    let (keys, fallback) = match group {
        Group::Boundaries => (BOUNDARY_NAME_KEYS, "Unnamed Boundary"),
        Group::Roads => (ROAD_NAME_KEYS, "Unnamed Road"),
        Group::Spots => return String::new(),
    };
    properties
        .and_then(|props| {
            keys.iter()
                .filter_map(|key| props.get(*key))
                .filter_map(Value::as_str)
                .find(|name| !name.is_empty())
        })
        .unwrap_or(fallback)
        .to_string()
}

fn shape_popup_html(group: Group, properties: Option<&Value>) -> Option<String> {
    let label = escape_html(&shape_label(group, properties));
    match group {
        Group::Boundaries => Some(format!("<b>Forest:</b> {label}")),
        Group::Roads => Some(format!("<b>Road:</b> {label}")),
        Group::Spots => None,
    }
}

/// Walks a GeoJSON FeatureCollection and writes each feature's popup text
/// into its properties, so the rendering side needs no naming logic.
pub fn annotate_shape_popups(group: Group, collection: &mut Value) {
    let Some(features) = collection
        .get_mut("features")
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for feature in features {
        let Some(popup) = shape_popup_html(group, feature.get("properties")) else {
            continue;
        };
        let Some(feature) = feature.as_object_mut() else {
            continue;
        };
        match feature.get_mut("properties").and_then(Value::as_object_mut) {
            Some(props) => {
                props.insert(POPUP_PROPERTY.to_string(), Value::String(popup));
            }
            // Features with null or missing properties still get a popup.
            None => {
                feature.insert(
                    "properties".to_string(),
                    serde_json::json!({ POPUP_PROPERTY: popup }),
                );
            }
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn style_for(group: Group) -> Option<ShapeStyle> {
    match group {
        Group::Boundaries => Some(BOUNDARY_STYLE),
        Group::Roads => Some(ROAD_STYLE),
        Group::Spots => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn spot(state: Option<&str>, description: Option<&str>) -> Spot {
        Spot {
            id: Some(1),
            name: "Pine Ridge".into(),
            location: "Forest A".into(),
            state: state.map(str::to_string),
            description: description.map(str::to_string),
            latitude: Some(39.1),
            longitude: Some(-105.3),
        }
    }

    #[test]
    fn marker_requires_both_coordinates() {
        let full = spot(Some("CO"), None);
        let marker = SpotMarker::from_spot(&full).unwrap();
        assert_eq!((marker.latitude, marker.longitude), (39.1, -105.3));

        let mut missing = full.clone();
        missing.longitude = None;
        assert_eq!(SpotMarker::from_spot(&missing), None);
        missing.longitude = Some(-105.3);
        missing.latitude = None;
        assert_eq!(SpotMarker::from_spot(&missing), None);
    }

    #[test]
    fn popup_includes_every_present_field() {
        let html = spot_popup_html(&spot(Some("CO"), Some("Near the creek.")));
        assert_eq!(
            html,
            "<b>Pine Ridge</b><br>Forest A<br>Near the creek.<br><strong>State:</strong> CO"
        );
    }

    #[test]
    fn popup_omits_empty_description_and_absent_state() {
        let html = spot_popup_html(&spot(None, Some("")));
        assert_eq!(html, "<b>Pine Ridge</b><br>Forest A");
    }

    #[test]
    fn popup_escapes_user_text() {
        let mut s = spot(None, None);
        s.name = "<script>alert(1)</script>".into();
        let html = spot_popup_html(&s);
        assert!(html.starts_with("<b>&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn list_line_formats_with_and_without_state() {
        assert_eq!(list_line(&spot(Some("CO"), None)), "Pine Ridge — Forest A (CO)");
        assert_eq!(list_line(&spot(None, None)), "Pine Ridge — Forest A");
    }

    #[test]
    fn empty_list_line_names_the_filter() {
        assert_eq!(empty_list_line(Some("CO")), "No spots found in CO");
        assert_eq!(empty_list_line(None), "No spots available");
    }

    #[test]
    fn boundary_label_prefers_forestname() {
        let props = json!({ "NAME": "generic", "FORESTNAME": "Pike National Forest" });
        assert_eq!(
            shape_label(Group::Boundaries, Some(&props)),
            "Pike National Forest"
        );
    }

    #[test]
    fn label_falls_through_candidate_keys_in_order() {
        let props = json!({ "Name": "Rampart Range Rd", "ROADNAME": "ignored" });
        assert_eq!(shape_label(Group::Roads, Some(&props)), "Rampart Range Rd");

        let only_last = json!({ "ROADNAME": "FS 300" });
        assert_eq!(shape_label(Group::Roads, Some(&only_last)), "FS 300");
    }

    #[test]
    fn label_skips_non_string_and_empty_values() {
        let props = json!({ "FORESTNAME": 7, "Name": "", "NAME": "Arapaho" });
        assert_eq!(shape_label(Group::Boundaries, Some(&props)), "Arapaho");
    }

    #[test]
    fn label_falls_back_when_nothing_matches() {
        assert_eq!(shape_label(Group::Boundaries, None), "Unnamed Boundary");
        assert_eq!(
            shape_label(Group::Roads, Some(&json!({}))),
            "Unnamed Road"
        );
    }

    #[test]
    fn annotate_writes_popup_property() {
        let mut collection = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "FORESTNAME": "Pike" }, "geometry": null },
                { "type": "Feature", "properties": null, "geometry": null }
            ]
        });
        annotate_shape_popups(Group::Boundaries, &mut collection);
        let features = collection["features"].as_array().unwrap();
        assert_eq!(
            features[0]["properties"][POPUP_PROPERTY],
            json!("<b>Forest:</b> Pike")
        );
        assert_eq!(
            features[1]["properties"][POPUP_PROPERTY],
            json!("<b>Forest:</b> Unnamed Boundary")
        );
    }

    #[test]
    fn annotate_tolerates_a_collection_without_features() {
        let mut not_a_collection = json!({ "type": "FeatureCollection" });
        annotate_shape_popups(Group::Roads, &mut not_a_collection);
        assert_eq!(not_a_collection, json!({ "type": "FeatureCollection" }));
    }

    #[test]
    fn styles_match_the_published_defaults() {
        assert_eq!(style_for(Group::Boundaries), Some(BOUNDARY_STYLE));
        assert_eq!(style_for(Group::Roads), Some(ROAD_STYLE));
        assert_eq!(style_for(Group::Spots), None);
        assert_eq!(ROAD_STYLE.fill_opacity, None);
    }
}
