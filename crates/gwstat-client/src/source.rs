//! Event source abstraction
//!
//! Object-safe seams between the reconnecting consumer and the
//! concrete HTTP client, so the reconnection state machine can be
//! driven by a scripted source in tests.

use async_trait::async_trait;
use gwstat_core::EventEnvelope;

use crate::error::StreamError;
use crate::stream::Subscription;

/// Something that can open event stream sessions for a gateway set
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Open one new stream session. Each call is a single attempt;
    /// retry policy belongs to the caller.
    async fn open(&self, gateway_ids: &[String]) -> Result<Box<dyn EventStream>, StreamError>;
}

/// One live stream session
#[async_trait]
pub trait EventStream: Send {
    /// Block until the next envelope arrives or the stream fails
    async fn recv(&mut self) -> Result<EventEnvelope, StreamError>;
}

#[async_trait]
impl EventStream for Subscription {
    async fn recv(&mut self) -> Result<EventEnvelope, StreamError> {
        Subscription::recv(self).await
    }
}
