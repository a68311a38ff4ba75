//! The add-spot form's transient state and the local checks a draft must
//! pass before it is allowed anywhere near the network.

use shared::NewSpot;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Raw form fields, exactly as typed. Coordinates stay strings until
/// validation so a half-typed number never breaks the form.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpotDraft {
    pub name: String,
    pub location: String,
    pub state: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
}

/// How a clicked coordinate is written into a form field.
pub fn format_coordinate(value: f64) -> String {
    format!("{value:.5}")
}

impl SpotDraft {
    /// Fills the coordinate fields from a map click.
    pub fn set_coordinates(&mut self, lat: f64, lng: f64) {
        self.latitude = format_coordinate(lat);
        self.longitude = format_coordinate(lng);
    }

    /// Local validation gate. Name, location and state are mandatory;
    /// non-numeric coordinates normalize to absent rather than erroring.
    pub fn validate(&self) -> Result<NewSpot, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::Missing("name"));
        }
        let location = self.location.trim();
        if location.is_empty() {
            return Err(DraftError::Missing("location"));
        }
        let state = self.state.trim();
        if state.is_empty() {
            return Err(DraftError::Missing("state"));
        }
        let description = self.description.trim();
        Ok(NewSpot {
            name: name.to_string(),
            location: location.to_string(),
            state: state.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            latitude: parse_coordinate(&self.latitude),
            longitude: parse_coordinate(&self.longitude),
        })
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    let parsed = raw.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> SpotDraft {
        SpotDraft {
            name: "Bear Creek".into(),
            location: "Near Guanella Pass".into(),
            state: "CO".into(),
            description: "Free dispersed camping.".into(),
            latitude: "39.6".into(),
            longitude: "-105.3".into(),
        }
    }

    #[test]
    fn valid_draft_becomes_a_submission() {
        let spot = filled().validate().unwrap();
        assert_eq!(spot.name, "Bear Creek");
        assert_eq!(spot.state, "CO");
        assert_eq!(spot.latitude, Some(39.6));
        assert_eq!(spot.longitude, Some(-105.3));
    }

    #[test]
    fn each_mandatory_field_is_enforced() {
        for (field, blank) in [
            ("name", SpotDraft { name: " ".into(), ..filled() }),
            ("location", SpotDraft { location: String::new(), ..filled() }),
            ("state", SpotDraft { state: String::new(), ..filled() }),
        ] {
            assert_eq!(blank.validate(), Err(DraftError::Missing(field)));
        }
    }

    #[test]
    fn non_numeric_coordinates_normalize_to_absent() {
        let draft = SpotDraft {
            latitude: "north a bit".into(),
            longitude: "".into(),
            ..filled()
        };
        let spot = draft.validate().unwrap();
        assert_eq!(spot.latitude, None);
        assert_eq!(spot.longitude, None);
    }

    #[test]
    fn nan_input_is_treated_as_absent() {
        let draft = SpotDraft {
            latitude: "NaN".into(),
            ..filled()
        };
        assert_eq!(draft.validate().unwrap().latitude, None);
    }

    #[test]
    fn empty_description_is_dropped() {
        let draft = SpotDraft {
            description: "  ".into(),
            ..filled()
        };
        assert_eq!(draft.validate().unwrap().description, None);
    }

    #[test]
    fn map_click_fills_both_coordinate_fields() {
        let mut draft = SpotDraft::default();
        draft.set_coordinates(39.123456, -105.654321);
        assert_eq!(draft.latitude, "39.12346");
        assert_eq!(draft.longitude, "-105.65432");
    }
}
