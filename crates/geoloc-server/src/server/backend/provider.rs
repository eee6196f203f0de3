//! Reverse geocoding over HTTP against a Google Geocoding API compatible
//! endpoint.
//!
//! Request: `GET {url}?latlng={lat},{lng}[&key={key}]`. The first result's
//! `formatted_address` is the answer. Any other response shape is a provider
//! failure; none of them are retried.

use async_trait::async_trait;
use geoloc_core::{BoxError, GeocodingProvider};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Default user agent for provider requests.
pub const DEFAULT_USER_AGENT: &str = concat!("geoloc/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to geocoding provider failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("geocoding provider returned HTTP {0}")]
    Http(reqwest::StatusCode),

    #[error("failed to decode geocoding response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("geocoding provider answered {status}{}", detail(.message))]
    Lookup {
        status: String,
        message: Option<String>,
    },

    #[error("no address found at {latitude},{longitude}")]
    NoResult { latitude: f64, longitude: f64 },
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

/// HTTP-backed [`GeocodingProvider`].
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpGeocoder {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, ProviderError> {
        let mut query = vec![("latlng", format!("{latitude},{longitude}"))];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(ProviderError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(status));
        }

        let body: GeocodeResponse = response.json().await.map_err(ProviderError::Decode)?;
        match body.status.as_str() {
            "OK" => body
                .results
                .into_iter()
                .next()
                .map(|result| result.formatted_address)
                .ok_or(ProviderError::NoResult {
                    latitude,
                    longitude,
                }),
            "ZERO_RESULTS" => Err(ProviderError::NoResult {
                latitude,
                longitude,
            }),
            _ => Err(ProviderError::Lookup {
                status: body.status,
                message: body.error_message,
            }),
        }
    }
}

#[async_trait]
impl GeocodingProvider for HttpGeocoder {
    #[tracing::instrument(skip(self))]
    async fn resolve_address(&self, latitude: f64, longitude: f64) -> Result<String, BoxError> {
        Ok(self.reverse(latitude, longitude).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn geocoder(server: &MockServer, api_key: Option<&str>) -> HttpGeocoder {
        HttpGeocoder::new(
            server.url("/geocode/json"),
            api_key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returns_first_formatted_address() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/geocode/json")
                .query_param("latlng", "33.969601,-84.100033")
                .query_param("key", "secret");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [
                    {"formatted_address": "Atlanta, GA"},
                    {"formatted_address": "Georgia, USA"}
                ]
            }));
        });

        let address = geocoder(&server, Some("secret"))
            .resolve_address(33.969601, -84.100033)
            .await
            .unwrap();

        assert_eq!(address, "Atlanta, GA");
        mock.assert();
    }

    #[tokio::test]
    async fn zero_results_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(200)
                .json_body(json!({"status": "ZERO_RESULTS", "results": []}));
        });

        let err = geocoder(&server, None)
            .resolve_address(0.0, 0.0)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no address found"), "{err}");
    }

    #[tokio::test]
    async fn provider_status_and_message_are_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(200).json_body(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid."
            }));
        });

        let err = geocoder(&server, Some("bad"))
            .resolve_address(1.0, 2.0)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "geocoding provider answered REQUEST_DENIED: The provided API key is invalid."
        );
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(503).body("unavailable");
        });

        let err = geocoder(&server, None)
            .resolve_address(1.0, 2.0)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("HTTP 503"), "{err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(200).body("<html>not json</html>");
        });

        let err = geocoder(&server, None)
            .resolve_address(1.0, 2.0)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("decode"), "{err}");
    }
}
