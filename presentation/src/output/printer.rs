//! Live stream printer
//!
//! Writes each merged fragment as soon as it arrives and leaves the cursor
//! on a fresh line when the stream ends.

use chatline_application::ports::stream_observer::StreamObserver;
use chatline_domain::StreamStatus;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;
use tracing::debug;

struct PrinterState<W> {
    out: W,
    /// Whether the last byte written was a newline (or nothing was written)
    at_line_start: bool,
}

/// [`StreamObserver`] that echoes the reply to a writer
pub struct StreamPrinter<W: Write + Send> {
    state: Mutex<PrinterState<W>>,
}

impl StreamPrinter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StreamPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(PrinterState {
                out,
                at_line_start: true,
            }),
        }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        match self.state.into_inner() {
            Ok(state) => state.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }
}

impl<W: Write + Send> StreamObserver for StreamPrinter<W> {
    fn on_delta(&self, fragment: &str) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        // Output errors (closed pipe) must not disturb the stream
        if let Err(e) = state
            .out
            .write_all(fragment.as_bytes())
            .and_then(|_| state.out.flush())
        {
            debug!("Failed to print fragment: {}", e);
            return;
        }
        state.at_line_start = fragment.ends_with('\n');
    }

    fn on_stream_end(&self, _status: &StreamStatus) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if !state.at_line_start {
            let _ = writeln!(state.out);
            let _ = state.out.flush();
            state.at_line_start = true;
        }
    }
}
