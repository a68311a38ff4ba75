//! Named overlay groups and the operations the rest of the app performs on
//! them. The manager owns a [`MapSurface`] — the thin adapter that actually
//! draws — so the group semantics stay testable against a recording fake.

use serde_json::Value;
use shared::Spot;

use crate::display::{self, ShapeStyle, SpotMarker};
use crate::regions::Viewport;

/// The three independently togglable overlay groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Spots,
    Boundaries,
    Roads,
}

impl Group {
    pub fn name(self) -> &'static str {
        match self {
            Group::Spots => "spots",
            Group::Boundaries => "boundaries",
            Group::Roads => "roads",
        }
    }
}

/// Rendering adapter the manager drives. The production implementation wraps
/// the Leaflet widget; tests substitute a recorder.
pub trait MapSurface {
    fn clear_group(&mut self, group: Group);
    fn add_marker(&mut self, group: Group, marker: &SpotMarker);
    fn add_shapes(&mut self, group: Group, collection: &Value, style: ShapeStyle);
    fn set_group_visible(&mut self, group: Group, visible: bool);
    fn set_view(&mut self, view: Viewport);
    fn pan_to(&mut self, lat: f64, lng: f64);
    fn open_last_popup(&mut self, group: Group);
}

pub struct OverlayManager<S> {
    surface: S,
    spot_markers: usize,
}

impl<S: MapSurface> OverlayManager<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            spot_markers: 0,
        }
    }

    /// Swaps the spots group wholesale. Clear and re-add run back-to-back on
    /// the one UI thread, so no reader observes the intermediate empty state.
    /// Returns the number of markers rendered.
    pub fn replace_spots(&mut self, spots: &[Spot]) -> usize {
        let markers: Vec<SpotMarker> = spots.iter().filter_map(SpotMarker::from_spot).collect();
        self.surface.clear_group(Group::Spots);
        for marker in &markers {
            self.surface.add_marker(Group::Spots, marker);
        }
        self.spot_markers = markers.len();
        self.spot_markers
    }

    /// Appends one spot without touching the rest of the group. With `focus`
    /// the camera pans to the new marker and its popup opens. Returns whether
    /// a marker was actually added (spots without coordinates draw nothing).
    pub fn add_spot(&mut self, spot: &Spot, focus: bool) -> bool {
        let Some(marker) = SpotMarker::from_spot(spot) else {
            return false;
        };
        self.surface.add_marker(Group::Spots, &marker);
        self.spot_markers += 1;
        if focus {
            self.surface.pan_to(marker.latitude, marker.longitude);
            self.surface.open_last_popup(Group::Spots);
        }
        true
    }

    /// Swaps a shape group (boundaries or roads) for a freshly fetched
    /// FeatureCollection. Popup labels are resolved here, before anything
    /// reaches the widget. A call for the spots group is ignored.
    pub fn replace_shapes(&mut self, group: Group, mut collection: Value) {
        let Some(style) = display::style_for(group) else {
            return;
        };
        display::annotate_shape_popups(group, &mut collection);
        self.surface.clear_group(group);
        self.surface.add_shapes(group, &collection, style);
    }

    /// Toggles rendering of a group without discarding its data.
    pub fn set_group_visible(&mut self, group: Group, visible: bool) {
        self.surface.set_group_visible(group, visible);
    }

    pub fn set_view(&mut self, view: Viewport) {
        self.surface.set_view(view);
    }

    pub fn spot_marker_count(&self) -> usize {
        self.spot_markers
    }
}
