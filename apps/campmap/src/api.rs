//! Browser-side adapters for the backend's REST endpoints. Each call either
//! yields fully decoded data or an explicit [`FetchError`] — never a partial
//! result. No rendering or DOM state is touched here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}

pub const SPOTS_ENDPOINT: &str = "/api/camping_spots";
pub const BOUNDARIES_ENDPOINT: &str = "/api/forest_boundaries";
pub const ROADS_ENDPOINT: &str = "/api/forest_roads";

/// Spot-list URL, scoped by state code when a filter is active.
pub fn spots_url(region: Option<&str>) -> String {
    match region {
        Some(code) if !code.is_empty() => {
            format!("{SPOTS_ENDPOINT}?state={}", urlencoding::encode(code))
        }
        _ => SPOTS_ENDPOINT.to_string(),
    }
}

#[cfg(feature = "hydrate")]
mod requests {
    use super::*;
    use gloo_net::http::{Request, Response};
    use serde_json::Value;
    use shared::{NewSpot, Spot, SubmitOutcome};

    fn checked(response: Response) -> Result<Response, FetchError> {
        if response.ok() {
            Ok(response)
        } else {
            Err(FetchError::Status(response.status()))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, FetchError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;
        checked(response)?
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }

    /// Reads the spot list, optionally scoped to a region code, in
    /// server-supplied order.
    pub async fn fetch_spots(region: Option<&str>) -> Result<Vec<Spot>, FetchError> {
        get_json(&spots_url(region)).await
    }

    pub async fn fetch_boundaries() -> Result<Value, FetchError> {
        get_json(BOUNDARIES_ENDPOINT).await
    }

    pub async fn fetch_roads() -> Result<Value, FetchError> {
        get_json(ROADS_ENDPOINT).await
    }

    /// Posts a new spot. The server is the source of truth for acceptance;
    /// its verdict comes back in the [`SubmitOutcome`] body.
    pub async fn submit_spot(spot: &NewSpot) -> Result<SubmitOutcome, FetchError> {
        let response = Request::post(SPOTS_ENDPOINT)
            .json(spot)
            .map_err(|err| FetchError::Request(err.to_string()))?
            .send()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;
        checked(response)?
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

#[cfg(feature = "hydrate")]
pub use requests::*;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unfiltered_url_has_no_query() {
        assert_eq!(spots_url(None), "/api/camping_spots");
        assert_eq!(spots_url(Some("")), "/api/camping_spots");
    }

    #[test]
    fn filtered_url_carries_the_state_code() {
        assert_eq!(spots_url(Some("CO")), "/api/camping_spots?state=CO");
    }

    #[test]
    fn filter_values_are_percent_encoded() {
        assert_eq!(
            spots_url(Some("a b&c")),
            "/api/camping_spots?state=a%20b%26c"
        );
    }
}
