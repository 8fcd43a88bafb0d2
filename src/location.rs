use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::config::LocationConfig;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude")]
    lon: f64,
}

/// Last known device position. Reads as (0, 0) until a lookup succeeds.
#[derive(Debug, Default)]
pub struct Location {
    current: Coordinates,
    read_at: Option<Instant>,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        self.current
    }

    pub fn is_resolved(&self) -> bool {
        self.read_at.is_some()
    }

    /// Whether the cached reading is recent enough to skip a new lookup.
    pub fn is_fresh(&self, max_age: Duration, now: Instant) -> bool {
        self.read_at
            .is_some_and(|at| now.saturating_duration_since(at) <= max_age)
    }

    pub fn update(&mut self, coordinates: Coordinates, now: Instant) {
        self.current = coordinates;
        self.read_at = Some(now);
    }
}

/// One-shot position lookup. Fixed coordinates from configuration win;
/// otherwise an IP geolocation endpoint is asked.
#[derive(Debug, Clone)]
pub struct LocationProvider {
    lookup_url: String,
    fixed: Option<Coordinates>,
    max_age: Duration,
    client: reqwest::Client,
}

impl LocationProvider {
    pub fn new(config: &LocationConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let fixed = match (config.latitude, config.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        };

        Ok(LocationProvider {
            lookup_url: config.lookup_url.clone(),
            fixed,
            max_age: Duration::from_secs(config.max_age_secs),
            client,
        })
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub async fn locate(self) -> Result<Coordinates, ClientError> {
        if let Some(fixed) = self.fixed {
            return Ok(fixed);
        }

        let response = self.client.get(&self.lookup_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), response.text().await.unwrap_or_default()));
        }

        let body: LookupResponse = response.json().await?;
        tracing::info!(latitude = body.lat, longitude = body.lon, "location resolved");
        Ok(Coordinates {
            latitude: body.lat,
            longitude: body.lon,
        })
    }
}
