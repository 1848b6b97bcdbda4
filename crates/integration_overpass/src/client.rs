//! Overpass bus stop client
//!
//! Sends a single Overpass QL query per lookup and returns the bus stop nodes
//! that carry a position.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::OverpassConfig;
use crate::error::OverpassError;
use crate::models::OverpassNode;

/// Trait for bus stop lookup clients
#[async_trait]
pub trait OverpassClient: Send + Sync {
    /// Find bus stop nodes within `radius_meters` of a coordinate
    ///
    /// At most `limit` nodes are requested from the server.
    async fn find_bus_stops(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<OverpassNode>, OverpassError>;

    /// Check if the Overpass service is reachable
    async fn is_healthy(&self) -> bool;
}

/// Build the Overpass QL query for bus stops around a point
#[must_use]
pub fn build_bus_stop_query(latitude: f64, longitude: f64, radius_meters: u32, limit: u32) -> String {
    format!(
        r#"[out:json]; node["highway"="bus_stop"](around:{radius_meters},{latitude},{longitude}); out {limit};"#
    )
}

/// HTTP client for the public Overpass API
#[derive(Debug)]
pub struct HttpOverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl HttpOverpassClient {
    /// Create a new Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &OverpassConfig) -> Result<Self, OverpassError> {
        config
            .validate()
            .map_err(OverpassError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OverpassError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Parse the raw Overpass JSON response into typed nodes
    ///
    /// Elements missing either coordinate are dropped.
    fn parse_response(body: &str) -> Result<Vec<OverpassNode>, OverpassError> {
        let raw: RawResponse =
            serde_json::from_str(body).map_err(|e| OverpassError::ParseError(e.to_string()))?;

        if let Some(remark) = raw.remark.as_deref() {
            // Overpass reports server-side query timeouts as a 200 with a remark
            if remark.contains("timed out") || remark.contains("out of memory") {
                return Err(OverpassError::ServiceUnavailable(remark.to_string()));
            }
            warn!(%remark, "Overpass returned a remark");
        }

        let total = raw.elements.len();
        let nodes: Vec<OverpassNode> = raw
            .elements
            .into_iter()
            .filter_map(Self::convert_element)
            .collect();

        if nodes.len() < total {
            debug!(
                dropped = total - nodes.len(),
                "Dropped elements without coordinates"
            );
        }

        Ok(nodes)
    }

    /// Convert a raw element to a typed node, if it has a position
    fn convert_element(raw: RawElement) -> Option<OverpassNode> {
        Some(OverpassNode {
            id: raw.id,
            latitude: raw.lat?,
            longitude: raw.lon?,
            tags: raw.tags.unwrap_or_default(),
        })
    }

    fn map_send_error(&self, e: &reqwest::Error) -> OverpassError {
        if e.is_timeout() {
            OverpassError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            OverpassError::ConnectionFailed(e.to_string())
        }
    }
}

#[async_trait]
impl OverpassClient for HttpOverpassClient {
    #[instrument(skip(self))]
    async fn find_bus_stops(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<OverpassNode>, OverpassError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(OverpassError::InvalidLocation(format!(
                "{latitude}, {longitude}"
            )));
        }

        let url = self.config.interpreter_url();
        let query = build_bus_stop_query(latitude, longitude, radius_meters, limit);

        debug!(?url, %query, "Querying nearby bus stops");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OverpassError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        if status == reqwest::StatusCode::GATEWAY_TIMEOUT {
            return Err(OverpassError::ServiceUnavailable(format!("HTTP {status}")));
        }

        if !status.is_success() {
            return Err(OverpassError::RequestFailed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OverpassError::ParseError(e.to_string()))?;

        let nodes = Self::parse_response(&body)?;

        if nodes.is_empty() {
            warn!("No bus stops found");
        }

        debug!(count = nodes.len(), "Bus stops found");
        Ok(nodes)
    }

    async fn is_healthy(&self) -> bool {
        let url = format!("{}/status", self.config.base_url.trim_end_matches('/'));
        self.client
            .get(&url)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    elements: Vec<RawElement>,
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    tags: Option<HashMap<String, String>>,
}
