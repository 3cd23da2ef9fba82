//! gwstat-client - Event stream client for the gwstat telemetry bridge
//!
//! Talks to the network server's HTTP API: one-shot gateway discovery
//! and the server-pushed SSE event stream. The `ReconnectingConsumer`
//! keeps a logical stream alive across transient failures and forwards
//! decoded connection-stats events downstream.
//!
//! # Usage
//!
//! ```ignore
//! use gwstat_client::{EventsClient, ReconnectingConsumer};
//!
//! let client = Arc::new(EventsClient::new(server, api_key)?);
//! let gateways = client.list_gateways().await?;
//! let consumer = ReconnectingConsumer::new(client, gateways);
//! tokio::spawn(consumer.run(tx));
//! ```

pub mod client;
pub mod consumer;
pub mod error;
pub mod source;
pub mod stream;
pub mod testing;

pub use client::{EventsClient, GatewayInfo};
pub use consumer::{ConsumerError, ReconnectPolicy, ReconnectingConsumer};
pub use error::{ClientError, StreamError};
pub use source::{EventSource, EventStream};
pub use stream::Subscription;
