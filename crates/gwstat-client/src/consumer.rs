//! ReconnectingConsumer - keeps a logical event stream alive

use std::sync::Arc;
use std::time::Duration;

use gwstat_core::{decode_event, Decoded, StatsEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use crate::error::StreamError;
use crate::source::{EventSource, EventStream};

/// Policy for recovering from an `Unavailable`-class stream failure.
///
/// The backoff is fixed rather than exponential; the stream is quiet
/// enough that a constant delay keeps reconnect behavior predictable.
/// `max_attempts` bounds consecutive failed reopen attempts within one
/// outage, after which the consumer escalates instead of retrying forever.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Delay before each reopen attempt
    pub backoff: Duration,
    /// Consecutive failed reopen attempts tolerated per outage
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            max_attempts: 6,
        }
    }
}

/// Terminal failures of the consumer loop
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The stream failed in a way the policy does not recover from
    #[error("event stream failed: {0}")]
    Stream(#[from] StreamError),

    /// Every reopen attempt of one outage failed
    #[error("reconnect failed after {attempts} attempts: {source}")]
    ReconnectExhausted {
        attempts: u32,
        #[source]
        source: StreamError,
    },

    /// The downstream reporter is gone
    #[error("event channel closed")]
    ChannelClosed,
}

/// Keeps one logical event stream alive across transient failures and
/// forwards decoded connection-stats events downstream, in receive
/// order.
///
/// The resilience contract:
/// - `Canceled` receive errors are absorbed on the same session;
/// - `Unavailable`-class errors trigger a fixed backoff and a reopen
///   with the identical gateway set;
/// - everything else, including failure to open at startup, is
///   fatal and surfaces to the caller.
pub struct ReconnectingConsumer {
    source: Arc<dyn EventSource>,
    gateway_ids: Vec<String>,
    policy: ReconnectPolicy,
}

impl ReconnectingConsumer {
    pub fn new(source: Arc<dyn EventSource>, gateway_ids: Vec<String>) -> Self {
        Self::with_policy(source, gateway_ids, ReconnectPolicy::default())
    }

    pub fn with_policy(
        source: Arc<dyn EventSource>,
        gateway_ids: Vec<String>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            source,
            gateway_ids,
            policy,
        }
    }

    /// Run the consume loop until a fatal failure.
    ///
    /// This never returns `Ok` of its own accord; the loop is meant
    /// to live as long as the process does.
    pub async fn run(self, tx: mpsc::Sender<StatsEvent>) -> Result<(), ConsumerError> {
        let mut stream = self.source.open(&self.gateway_ids).await?;
        info!(gateways = self.gateway_ids.len(), "event stream open");

        loop {
            match stream.recv().await {
                Ok(envelope) => match decode_event(&envelope) {
                    Decoded::Recognized(event) => {
                        tx.send(event)
                            .await
                            .map_err(|_| ConsumerError::ChannelClosed)?;
                    }
                    Decoded::Ignored => trace!(event = %envelope.name, "ignoring event"),
                    Decoded::Malformed(reason) => {
                        warn!(event = %envelope.name, %reason, "discarding malformed stats event")
                    }
                },
                Err(e) if e.is_canceled() => {
                    debug!("receive canceled, retrying on the same session")
                }
                Err(e) if e.is_unavailable() => {
                    warn!(error = %e, "lost connection, reconnecting");
                    stream = self.reopen().await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Back off and open a new session, bounded by the policy
    async fn reopen(&self) -> Result<Box<dyn EventStream>, ConsumerError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            sleep(self.policy.backoff).await;

            match self.source.open(&self.gateway_ids).await {
                Ok(stream) => {
                    info!(attempt, "reconnected to event stream");
                    return Ok(stream);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "reconnect attempt failed");
                    if attempt >= max_attempts {
                        return Err(ConsumerError::ReconnectExhausted {
                            attempts: attempt,
                            source: e,
                        });
                    }
                }
            }
        }
    }
}
