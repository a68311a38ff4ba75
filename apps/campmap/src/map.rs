//! Leaflet bindings and the page-wide map controller. Everything here runs
//! only in the hydrated browser build; the widget itself lives on the JS
//! side behind a handful of imported functions.

use std::cell::RefCell;

use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::display::{ShapeStyle, SpotMarker};
use crate::overlay::{Group, MapSurface, OverlayManager};
use crate::regions::{self, Viewport};
use crate::view::ViewState;

#[wasm_bindgen(inline_js = r#"
let map = null;
const groups = {};

export function initMap(targetId, lat, lng, zoom) {
  if (!window.L) {
    console.warn('Leaflet not loaded; map rendering disabled.');
    return false;
  }
  if (!document.getElementById(targetId)) {
    return false;
  }
  map = window.L.map(targetId).setView([lat, lng], zoom);
  window.L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '© OpenStreetMap contributors'
  }).addTo(map);
  for (const name of ['spots', 'boundaries', 'roads']) {
    groups[name] = window.L.layerGroup().addTo(map);
  }
  return true;
}

export function clearGroup(name) {
  if (groups[name]) groups[name].clearLayers();
}

export function addMarker(name, lat, lng, popupHtml) {
  if (!groups[name]) return;
  groups[name].addLayer(window.L.marker([lat, lng]).bindPopup(popupHtml));
}

export function addShapes(name, geojson, color, weight, fillOpacity) {
  if (!groups[name]) return;
  const style = fillOpacity == null
    ? { color: color, weight: weight, fill: false }
    : { color: color, weight: weight, fillOpacity: fillOpacity };
  const layer = window.L.geoJSON(JSON.parse(geojson), {
    style: style,
    onEachFeature: (feature, shape) => {
      const popup = feature.properties && feature.properties._popup;
      if (popup) shape.bindPopup(popup);
    }
  });
  groups[name].addLayer(layer);
}

export function setGroupVisible(name, visible) {
  if (!map || !groups[name]) return;
  if (visible) {
    groups[name].addTo(map);
  } else {
    map.removeLayer(groups[name]);
  }
}

export function setMapView(lat, lng, zoom) {
  if (map) map.setView([lat, lng], zoom);
}

export function panMapTo(lat, lng) {
  if (map) map.panTo([lat, lng]);
}

export function openLastPopup(name) {
  const layers = groups[name] ? groups[name].getLayers() : [];
  if (layers.length) layers[layers.length - 1].openPopup();
}

export function onMapClick(callback) {
  if (map) map.on('click', (e) => callback(e.latlng.lat, e.latlng.lng));
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map(target_id: &str, lat: f64, lng: f64, zoom: f64) -> bool;
    #[wasm_bindgen(js_name = clearGroup)]
    fn clear_group(name: &str);
    #[wasm_bindgen(js_name = addMarker)]
    fn add_marker(name: &str, lat: f64, lng: f64, popup_html: &str);
    #[wasm_bindgen(js_name = addShapes)]
    fn add_shapes(name: &str, geojson: &str, color: &str, weight: f64, fill_opacity: Option<f64>);
    #[wasm_bindgen(js_name = setGroupVisible)]
    fn set_group_visible(name: &str, visible: bool);
    #[wasm_bindgen(js_name = setMapView)]
    fn set_map_view(lat: f64, lng: f64, zoom: f64);
    #[wasm_bindgen(js_name = panMapTo)]
    fn pan_map_to(lat: f64, lng: f64);
    #[wasm_bindgen(js_name = openLastPopup)]
    fn open_last_popup(name: &str);
    #[wasm_bindgen(js_name = onMapClick)]
    fn on_map_click(callback: &Closure<dyn FnMut(f64, f64)>);
}

/// [`MapSurface`] backed by the Leaflet widget. When the host page has no
/// map container, or Leaflet itself is missing, the surface mounts inert and
/// every operation is a no-op — the list keeps working without the map.
pub struct LeafletSurface {
    ready: bool,
}

impl LeafletSurface {
    fn mount(target_id: &str, view: Viewport) -> Self {
        let ready =
            window().is_some() && init_map(target_id, view.lat, view.lng, f64::from(view.zoom));
        Self { ready }
    }

    pub fn ready(&self) -> bool {
        self.ready
    }
}

impl MapSurface for LeafletSurface {
    fn clear_group(&mut self, group: Group) {
        if self.ready {
            clear_group(group.name());
        }
    }

    fn add_marker(&mut self, group: Group, marker: &SpotMarker) {
        if self.ready {
            add_marker(
                group.name(),
                marker.latitude,
                marker.longitude,
                &marker.popup_html,
            );
        }
    }

    fn add_shapes(&mut self, group: Group, collection: &Value, style: ShapeStyle) {
        if !self.ready {
            return;
        }
        match serde_json::to_string(collection) {
            Ok(geojson) => add_shapes(
                group.name(),
                &geojson,
                style.color,
                style.weight,
                style.fill_opacity,
            ),
            Err(err) => web_sys::console::error_1(
                &format!("could not serialize {} geojson: {err}", group.name()).into(),
            ),
        }
    }

    fn set_group_visible(&mut self, group: Group, visible: bool) {
        if self.ready {
            set_group_visible(group.name(), visible);
        }
    }

    fn set_view(&mut self, view: Viewport) {
        if self.ready {
            set_map_view(view.lat, view.lng, f64::from(view.zoom));
        }
    }

    fn pan_to(&mut self, lat: f64, lng: f64) {
        if self.ready {
            pan_map_to(lat, lng);
        }
    }

    fn open_last_popup(&mut self, group: Group) {
        if self.ready {
            open_last_popup(group.name());
        }
    }
}

/// Everything the event handlers mutate: the overlay groups and the view
/// state. One instance per page, owned by this module instead of scattered
/// globals.
pub struct Controller {
    pub overlays: OverlayManager<LeafletSurface>,
    pub view: ViewState,
}

thread_local! {
    static CONTROLLER: RefCell<Option<Controller>> = const { RefCell::new(None) };
}

/// Initializes the map inside `#map` and installs the click handler. Safe to
/// call when the container is absent; the controller still comes up so
/// fetches and the list keep working. Returns whether the map is live.
pub fn mount(on_click: impl FnMut(f64, f64) + 'static) -> bool {
    let surface = LeafletSurface::mount("map", regions::INITIAL_VIEW);
    let ready = surface.ready();
    if ready {
        let callback: Closure<dyn FnMut(f64, f64)> = Closure::new(on_click);
        on_map_click(&callback);
        // The click handler lives as long as the map itself.
        callback.forget();
    }
    CONTROLLER.with(|slot| {
        *slot.borrow_mut() = Some(Controller {
            overlays: OverlayManager::new(surface),
            view: ViewState::new(),
        });
    });
    ready
}

/// Runs `f` against the controller, or returns `None` before [`mount`].
pub fn with<R>(f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
    CONTROLLER.with(|slot| slot.borrow_mut().as_mut().map(f))
}
