//! Integration tests for the gwstat telemetry bridge
//!
//! This crate contains end-to-end tests that exercise the full
//! pipeline over real sockets:
//! - scripted event-stream server (SSE)
//! - `EventsClient` / `ReconnectingConsumer`
//! - `Reporter` and the gateway state store
//! - the Prometheus exposition endpoint
//!
//! Run with: `cargo test -p gwstat-tests`

// This crate only contains tests, no library code
