//! Address search client.
//!
//! Talks to a Nominatim-compatible `/search` endpoint and turns results into
//! [`GeocodedAddress`] values for the delivery quote.
//!
//! # Usage policy
//!
//! The public Nominatim instance allows at most one request per second and
//! requires an identifying `User-Agent`. Outbound calls go through a
//! `governor` limiter (1 req/s) and results are cached with `moka` for five
//! minutes, so repeated keystrokes of the same query are served locally.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use forno_core::GeocodedAddress;

use crate::config::GeocoderConfig;

/// Queries shorter than this (in characters, after trimming) are not sent.
pub const MIN_QUERY_CHARS: usize = 3;

/// Suggestions returned per query.
const RESULT_LIMIT: &str = "5";

/// Errors that can occur when searching addresses.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoder throttled us.
    #[error("Rate limited by geocoder")]
    RateLimited,

    /// Non-success status from the geocoder.
    #[error("Geocoder returned status {0}")]
    Status(u16),

    /// The configured base URL cannot be extended with `/search`.
    #[error("Invalid geocoder URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// One entry of a Nominatim `format=json` response.
///
/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn into_address(self) -> Option<GeocodedAddress> {
        let lat = self.lat.parse::<f64>().ok()?;
        let lng = self.lon.parse::<f64>().ok()?;
        Some(GeocodedAddress {
            display_name: self.display_name,
            lat,
            lng,
        })
    }
}

/// Client for address search.
///
/// Cheap to clone; clones share the cache and the rate limiter.
#[derive(Clone)]
pub struct GeocodingClient {
    inner: Arc<GeocodingClientInner>,
}

struct GeocodingClientInner {
    client: reqwest::Client,
    search_url: Url,
    country_codes: String,
    language: String,
    user_agent: String,
    cache: Cache<String, Vec<GeocodedAddress>>,
    limiter: DefaultDirectRateLimiter,
}

impl GeocodingClient {
    /// Create a new geocoding client.
    ///
    /// # Errors
    ///
    /// Returns `GeocodingError::InvalidUrl` if the base URL cannot take a
    /// `search` path segment.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodingError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(GeocodingClientInner {
                client: reqwest::Client::new(),
                search_url: search_url(&config.base_url)?,
                country_codes: config.country_codes.clone(),
                language: config.language.clone(),
                user_agent: config.user_agent.clone(),
                cache,
                limiter: RateLimiter::direct(Quota::per_second(NonZeroU32::MIN)),
            }),
        })
    }

    /// Search for addresses matching `query`.
    ///
    /// Returns an empty list without a request when the trimmed query is
    /// shorter than [`MIN_QUERY_CHARS`]. No match is also an empty list.
    ///
    /// # Errors
    ///
    /// Returns `GeocodingError` if the request fails or the geocoder answers
    /// with a non-success status.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<GeocodedAddress>, GeocodingError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let cache_key = query.to_lowercase();
        if let Some(cached) = self.inner.cache.get(&cache_key).await {
            debug!(results = cached.len(), "address search cache hit");
            return Ok(cached);
        }

        self.inner.limiter.until_ready().await;

        let response = self
            .inner
            .client
            .get(self.inner.search_url.clone())
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", RESULT_LIMIT),
                ("countrycodes", self.inner.country_codes.as_str()),
            ])
            .header(ACCEPT_LANGUAGE, &self.inner.language)
            .header(USER_AGENT, &self.inner.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodingError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let results = to_addresses(places);
        debug!(results = results.len(), "address search completed");

        self.inner.cache.insert(cache_key, results.clone()).await;
        Ok(results)
    }
}

/// `base` with a trailing `search` segment, keeping any path prefix.
fn search_url(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("search")
}

fn to_addresses(places: Vec<NominatimPlace>) -> Vec<GeocodedAddress> {
    places
        .into_iter()
        .filter_map(|place| {
            let name = place.display_name.clone();
            let address = place.into_address();
            if address.is_none() {
                warn!(display_name = %name, "skipping geocoder result with invalid coordinates");
            }
            address
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base: &str) -> GeocoderConfig {
        GeocoderConfig {
            base_url: Url::parse(base).unwrap(),
            ..GeocoderConfig::default()
        }
    }

    #[test]
    fn test_search_url_from_root() {
        let url = search_url(&Url::parse("https://nominatim.openstreetmap.org").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://nominatim.openstreetmap.org/search");
    }

    #[test]
    fn test_search_url_keeps_prefix() {
        let url = search_url(&Url::parse("http://geo.internal/nominatim").unwrap()).unwrap();
        assert_eq!(url.as_str(), "http://geo.internal/nominatim/search");
    }

    #[test]
    fn test_parse_nominatim_response() {
        let body = r#"[
            {"place_id": 1, "display_name": "Avenida Paulista, São Paulo", "lat": "-23.5613", "lon": "-46.6565"},
            {"place_id": 2, "display_name": "Broken", "lat": "n/a", "lon": "-46.0"}
        ]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(body).unwrap();
        let addresses = to_addresses(places);

        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].display_name, "Avenida Paulista, São Paulo");
        assert!((addresses[0].lat - -23.5613).abs() < 1e-9);
        assert!((addresses[0].lng - -46.6565).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        // Port 9 (discard) is never contacted for short queries.
        let client = GeocodingClient::new(&config("http://127.0.0.1:9")).unwrap();
        assert!(client.search("  ab ").await.unwrap().is_empty());
        assert!(client.search("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_is_an_error() {
        let client = GeocodingClient::new(&config("http://127.0.0.1:9")).unwrap();
        assert!(client.search("Rua Augusta").await.is_err());
    }
}
