use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::domain::accommodation::GeocodedAddress;
use crate::usecase::contracts::Geocoder;

#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Coordinate::Number(n) => Some(*n),
            Coordinate::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GeospatialInformation {
    latitude: Option<Coordinate>,
    longitude: Option<Coordinate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PremisesAddress {
    geospatial_information: Option<GeospatialInformation>,
    geo_address: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AlsAddress {
    premises_address: Option<PremisesAddress>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Suggestion {
    address: Option<AlsAddress>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LookupResponse {
    #[serde(default)]
    suggested_address: Vec<Suggestion>,
}

impl LookupResponse {
    fn into_geocoded(self) -> Option<GeocodedAddress> {
        let premises = self
            .suggested_address
            .into_iter()
            .next()?
            .address?
            .premises_address?;
        let geo = premises.geospatial_information?;

        let latitude = geo.latitude?.value()?;
        let longitude = geo.longitude?.value()?;
        let geo_address = premises.geo_address.filter(|g| !g.trim().is_empty())?;

        Some(GeocodedAddress {
            latitude,
            longitude,
            geo_address,
        })
    }
}

/// Client for the Hong Kong Address Lookup Service.
#[derive(Clone)]
pub struct AlsClient {
    client: Client,
    base_url: String,
}

impl AlsClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("UniHaven/1.0")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, query: &str) -> Option<GeocodedAddress> {
        let url = format!("{}/lookup", self.base_url);

        let resp = match self
            .client
            .get(&url)
            .query(&[("q", query), ("n", "1")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, %query, "address lookup request failed");
                return None;
            }
        };

        let data: LookupResponse = match resp.json().await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, %query, "address lookup response parse failed");
                return None;
            }
        };

        let geocoded = data.into_geocoded();
        if geocoded.is_none() {
            tracing::warn!(%query, "incomplete address lookup response");
        }
        geocoded
    }
}

impl Geocoder for AlsClient {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Option<GeocodedAddress> {
        tracing::debug!("geocoding address");

        let result = self.lookup(query).await;
        let outcome = if result.is_some() { "success" } else { "failure" };
        metrics::counter!("geocoding_requests_total", "outcome" => outcome).increment(1);

        tracing::debug!(outcome, "geocoding finished");
        result
    }
}
