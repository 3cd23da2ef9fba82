//! EventsClient - authenticated HTTP client for the network server

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, StreamError};
use crate::source::{EventSource, EventStream};
use crate::stream::Subscription;

/// Path of the gateway listing endpoint, relative to the server base URL
const GATEWAYS_PATH: &str = "api/v1/gateways";

/// TCP keep-alive interval for the long-lived stream connection
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// Timeout for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A gateway as returned by the listing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayInfo {
    /// Opaque gateway identifier
    pub id: String,
    /// Human-readable name, if the server has one
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayListResponse {
    #[serde(default)]
    gateways: Vec<GatewayInfo>,
}

/// Pre-authenticated client for the network server's HTTP API.
///
/// Carries the API key as a default `Authorization` header and tunes
/// the connection for a long-lived stream (TCP keep-alive, connect
/// timeout, no overall request timeout since the stream never ends).
pub struct EventsClient {
    base_url: Url,
    http: Client,
}

impl EventsClient {
    /// Build a client for the given server and API key
    pub fn new(server: &str, api_key: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(server)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| ClientError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .tcp_keepalive(KEEPALIVE_INTERVAL)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// One-shot listing of all gateway ids visible to the API key.
    ///
    /// Used at startup when no explicit gateway list is configured;
    /// the result becomes the fixed subscription set for the process
    /// lifetime.
    pub async fn list_gateways(&self) -> Result<Vec<String>, ClientError> {
        let url = self.base_url.join(GATEWAYS_PATH)?;
        debug!(%url, "listing gateways");

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server { status, message });
        }

        let list: GatewayListResponse = response.json().await?;

        let mut ids = Vec::with_capacity(list.gateways.len());
        for gw in list.gateways {
            info!(gateway_id = %gw.id, name = gw.name.as_deref(), "found gateway");
            ids.push(gw.id);
        }

        Ok(ids)
    }
}

#[async_trait]
impl EventSource for EventsClient {
    async fn open(&self, gateway_ids: &[String]) -> Result<Box<dyn EventStream>, StreamError> {
        let subscription = Subscription::connect(&self.http, &self.base_url, gateway_ids).await?;
        Ok(Box::new(subscription))
    }
}
