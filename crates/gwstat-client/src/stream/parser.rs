//! SSE (Server-Sent Events) frame parser
//!
//! Parses the SSE wire format into event envelopes and in-band stream
//! status frames. The parser is incremental: feed it byte chunks as
//! they arrive and collect whatever complete frames they finish.

use gwstat_core::EventEnvelope;
use serde::Deserialize;
use tracing::trace;

/// SSE event type carrying an in-band stream status
const ERROR_EVENT_TYPE: &str = "error";

/// One complete frame extracted from the stream
#[derive(Debug)]
pub enum Frame {
    /// An event envelope
    Event(EventEnvelope),
    /// An in-band stream status (`event: error`)
    Status(StatusFrame),
    /// A frame whose payload could not be parsed; logged and skipped
    /// by the session, never fatal.
    Invalid(String),
}

/// In-band status payload serializing the upstream's stream state
#[derive(Debug, Clone, Deserialize)]
pub struct StatusFrame {
    /// Status code; 1 = canceled, 14 = unavailable
    pub code: u32,
    /// Human-readable detail
    #[serde(default)]
    pub message: String,
}

/// Incremental SSE parser state
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Buffer for incomplete lines
    buffer: Vec<u8>,
    /// Data lines accumulated for the current frame
    data: String,
    /// Current frame's event type (if any)
    event_type: Option<String>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the parser and extract any complete frames
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let mut line = &line[..line.len() - 1];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }

            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Process a single line; a blank line dispatches the frame
    fn process_line(&mut self, line: &[u8]) -> Option<Frame> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment line (keepalive)
        if line.starts_with(b":") {
            trace!("SSE keepalive/comment");
            return None;
        }

        let Ok(line) = std::str::from_utf8(line) else {
            return Some(Frame::Invalid("invalid UTF-8 in SSE line".into()));
        };

        let (field, value) = match line.find(':') {
            Some(pos) => {
                let (f, v) = line.split_at(pos);
                (f, v[1..].strip_prefix(' ').unwrap_or(&v[1..]))
            }
            None => (line, ""),
        };

        match field {
            "data" => {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value);
            }
            "event" => self.event_type = Some(value.to_string()),
            // Reconnection is the consumer's job, not the wire's
            "retry" | "id" => trace!(field, value, "ignoring SSE field"),
            _ => trace!(field, "unknown SSE field"),
        }

        None
    }

    /// Dispatch the accumulated frame on a blank line
    fn dispatch(&mut self) -> Option<Frame> {
        if self.data.is_empty() {
            self.event_type = None;
            return None;
        }

        let data = std::mem::take(&mut self.data);
        let event_type = self.event_type.take();

        if event_type.as_deref() == Some(ERROR_EVENT_TYPE) {
            return Some(match serde_json::from_str::<StatusFrame>(&data) {
                Ok(status) => Frame::Status(status),
                Err(e) => Frame::Invalid(format!("bad status frame: {} (data: {})", e, data)),
            });
        }

        Some(match serde_json::from_str::<EventEnvelope>(&data) {
            Ok(envelope) => Frame::Event(envelope),
            Err(e) => {
                let preview: String = data.chars().take(100).collect();
                Frame::Invalid(format!("bad event envelope: {} (data: {})", e, preview))
            }
        })
    }
}
