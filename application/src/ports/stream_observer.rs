//! Stream observation port
//!
//! Lets the presentation layer follow a stream as it is merged into the
//! transcript. Observers only watch: the transcript is already updated by the
//! time a callback fires.

use chatline_domain::StreamStatus;

/// Callback for transcript mutations during a stream
///
/// Implementations live in the presentation layer (console printer, tests).
pub trait StreamObserver: Send + Sync {
    /// Called once the assistant turn is open, before the request is sent.
    fn on_stream_start(&self) {}

    /// Called for each fragment right after it was merged.
    fn on_delta(&self, fragment: &str);

    /// Called once with the terminal status, after the turn was sealed.
    fn on_stream_end(&self, _status: &StreamStatus) {}
}

/// No-op observer for when nobody is watching
pub struct NoStreamObserver;

impl StreamObserver for NoStreamObserver {
    fn on_delta(&self, _fragment: &str) {}
}
