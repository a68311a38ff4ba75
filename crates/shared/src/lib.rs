use serde::{Deserialize, Serialize};

/// One camping location as served by `/api/camping_spots`.
///
/// The id is assigned by the backend; clients never invent one. A spot
/// without both coordinates is list-only and never becomes a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Spot {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Submission body for `POST /api/camping_spots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpot {
    pub name: String,
    pub location: String,
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NewSpot {
    /// The spot the server will have stored on a successful submission.
    pub fn into_spot(self, id: Option<i64>) -> Spot {
        Spot {
            id,
            name: self.name,
            location: self.location,
            state: Some(self.state),
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Server verdict on a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

impl SubmitOutcome {
    pub fn accepted(id: i64) -> Self {
        Self {
            success: true,
            error: None,
            id: Some(id),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            id: None,
        }
    }
}
