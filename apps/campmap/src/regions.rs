/// A map camera position: center plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

/// Zoom used when the camera jumps to a single state.
pub const STATE_ZOOM: u8 = 7;

/// Whole-country view shown when the filter is cleared.
pub const COUNTRY_VIEW: Viewport = Viewport {
    lat: 39.5,
    lng: -105.5,
    zoom: 5,
};

/// View the map opens with before any selection is made.
pub const INITIAL_VIEW: Viewport = Viewport {
    lat: 39.5,
    lng: -105.5,
    zoom: STATE_ZOOM,
};

// Fixed at build time; the server never supplies these.
static STATE_CENTERS: &[(&str, f64, f64)] = &[
    ("CO", 39.5, -105.5),
    ("CA", 36.7, -119.7),
    ("AZ", 34.0, -111.0),
    ("UT", 39.3, -111.6),
    ("NV", 38.8, -116.4),
    ("WY", 43.0, -107.6),
    ("MT", 47.0, -110.0),
    ("ID", 44.0, -114.0),
    ("WA", 47.4, -120.7),
    ("OR", 44.0, -120.5),
];

/// Camera position for a two-letter state code, if the code is known.
pub fn viewport_for(code: &str) -> Option<Viewport> {
    STATE_CENTERS
        .iter()
        .find(|(state, _, _)| *state == code)
        .map(|&(_, lat, lng)| Viewport {
            lat,
            lng,
            zoom: STATE_ZOOM,
        })
}

/// Codes offered by the region select, in display order.
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    STATE_CENTERS.iter().map(|(state, _, _)| *state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_code_has_a_viewport() {
        let vp = viewport_for("CA").unwrap();
        assert_eq!(vp, Viewport { lat: 36.7, lng: -119.7, zoom: STATE_ZOOM });
    }

    #[test]
    fn unknown_code_has_none() {
        assert_eq!(viewport_for("TX"), None);
        assert_eq!(viewport_for(""), None);
        assert_eq!(viewport_for("co"), None);
    }

    #[test]
    fn country_view_is_zoomed_out() {
        assert!(COUNTRY_VIEW.zoom < STATE_ZOOM);
        assert_eq!((COUNTRY_VIEW.lat, COUNTRY_VIEW.lng), (39.5, -105.5));
    }

    #[test]
    fn every_listed_code_resolves() {
        for code in known_codes() {
            assert!(viewport_for(code).is_some(), "{code} missing a center");
        }
    }
}
