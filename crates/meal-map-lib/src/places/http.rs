//! HTTP place-search backend
//!
//! Talks to a Google-Places-shaped REST API:
//! - `GET {base}/autocomplete/json?input=..&language=..&key=..`
//! - `GET {base}/details/json?place_id=..&fields=..&language=..&key=..`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{PlaceDetails, PlaceSearch, SuggestionItem};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

const DETAIL_FIELDS: &str = "name,formatted_address,rating,geometry";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("meal-map/", env!("CARGO_PKG_VERSION"));

/// Place search over HTTP
#[derive(Clone)]
pub struct HttpPlaces {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpPlaces {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Point the backend at a different host (proxies, test servers)
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::SearchRequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get_text(&self, endpoint: &str, query: &[(&str, &str)]) -> reqwest::Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);
        self.client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl PlaceSearch for HttpPlaces {
    async fn autocomplete(&self, query: &str, language: &str) -> Result<Vec<SuggestionItem>> {
        let body = self
            .get_text(
                "autocomplete/json",
                &[("input", query), ("language", language)],
            )
            .await
            .map_err(|e| Error::SearchRequestFailed(e.to_string()))?;
        parse_autocomplete(&body)
    }

    async fn details(&self, place_id: &str, language: &str) -> Result<PlaceDetails> {
        let body = self
            .get_text(
                "details/json",
                &[
                    ("place_id", place_id),
                    ("fields", DETAIL_FIELDS),
                    ("language", language),
                ],
            )
            .await
            .map_err(|e| resolution_failed(place_id, e.to_string()))?;
        parse_details(place_id, &body)
    }
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Current payloads carry `place_id`; legacy ones carry `id` as well, or only `id`
#[derive(Deserialize)]
struct Prediction {
    place_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: Option<String>,
    result: Option<DetailsResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    rating: Option<f64>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Provider status codes that carry usable data
fn status_ok(status: Option<&str>) -> bool {
    matches!(status, None | Some("OK") | Some("ZERO_RESULTS"))
}

fn resolution_failed(place_id: &str, reason: String) -> Error {
    Error::ResolutionFailed {
        place_id: place_id.to_string(),
        reason,
    }
}

fn parse_autocomplete(body: &str) -> Result<Vec<SuggestionItem>> {
    let response: AutocompleteResponse = serde_json::from_str(body)
        .map_err(|e| Error::SearchRequestFailed(format!("failed to parse suggestions: {e}")))?;

    if !status_ok(response.status.as_deref()) {
        return Err(Error::SearchRequestFailed(format!(
            "provider returned status {}: {}",
            response.status.unwrap_or_default(),
            response.error_message.unwrap_or_default()
        )));
    }

    Ok(response
        .predictions
        .into_iter()
        .filter_map(|p| match p.place_id.or(p.id) {
            Some(id) => Some(SuggestionItem::new(id, p.description)),
            None => {
                tracing::warn!(description = %p.description, "Skipping prediction without an id");
                None
            }
        })
        .collect())
}

fn parse_details(place_id: &str, body: &str) -> Result<PlaceDetails> {
    let response: DetailsResponse = serde_json::from_str(body)
        .map_err(|e| resolution_failed(place_id, format!("failed to parse details: {e}")))?;

    if !status_ok(response.status.as_deref()) {
        return Err(resolution_failed(
            place_id,
            format!(
                "provider returned status {}: {}",
                response.status.unwrap_or_default(),
                response.error_message.unwrap_or_default()
            ),
        ));
    }

    let result = response
        .result
        .ok_or_else(|| resolution_failed(place_id, "empty result".to_string()))?;

    Ok(PlaceDetails {
        name: result.name,
        formatted_address: result.formatted_address,
        rating: result.rating,
        location: result.geometry.map(|g| (g.location.lat, g.location.lng)),
    })
}
