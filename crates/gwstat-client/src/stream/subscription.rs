//! Subscription - one live stream session
//!
//! A `Subscription` represents a single attempt at the event stream
//! for a fixed gateway set. It has no retry logic of its own; keeping
//! a logical stream alive across sessions is the
//! `ReconnectingConsumer`'s job.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use gwstat_core::EventEnvelope;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::parser::{Frame, FrameParser};
use crate::error::StreamError;

/// Path of the event stream endpoint, relative to the server base URL
pub(crate) const EVENTS_PATH: &str = "api/v1/events";

/// An active event stream session for a fixed set of gateways.
///
/// `recv()` blocks until the next envelope arrives or the stream fails
/// with a classified `StreamError`. Frames that cannot be parsed are
/// logged and skipped; they never end the session.
pub struct Subscription {
    bytes: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    parser: FrameParser,
    pending: VecDeque<Frame>,
}

impl Subscription {
    /// Open one stream session for the given gateway ids
    pub(crate) async fn connect(
        http: &Client,
        base_url: &Url,
        gateway_ids: &[String],
    ) -> Result<Self, StreamError> {
        let url = base_url.join(EVENTS_PATH)?;

        debug!(%url, gateways = gateway_ids.len(), "connecting event stream");

        let response = http
            .get(url)
            .query(&[("gateways", gateway_ids.join(","))])
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StreamError::Server { status, message });
        }

        Ok(Self {
            bytes: Box::pin(response.bytes_stream()),
            parser: FrameParser::new(),
            pending: VecDeque::new(),
        })
    }

    /// Receive the next event envelope.
    ///
    /// In-band status frames surface as their classified error; a
    /// transport failure while reading the body counts as
    /// `Unavailable`, and the server ending the stream as `Closed`.
    pub async fn recv(&mut self) -> Result<EventEnvelope, StreamError> {
        loop {
            match self.pending.pop_front() {
                Some(Frame::Event(envelope)) => return Ok(envelope),
                Some(Frame::Status(status)) => {
                    return Err(StreamError::from_status(status.code, status.message))
                }
                Some(Frame::Invalid(reason)) => {
                    warn!(%reason, "skipping unparseable stream frame");
                    continue;
                }
                None => {}
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.parser.feed(&chunk)),
                Some(Err(e)) => return Err(StreamError::Unavailable(e.to_string())),
                None => return Err(StreamError::Closed),
            }
        }
    }
}
