//! Event stream session handling
//!
//! `Subscription` is one live stream attempt; the SSE wire format is
//! handled by the incremental parser in `parser`.

pub mod parser;
pub mod subscription;

pub use parser::{Frame, FrameParser, StatusFrame};
pub use subscription::Subscription;
