//! Incremental UTF-8 decoder for chunked response bodies.
//!
//! The backend streams plain text with no framing, so a chunk boundary may
//! fall in the middle of a multi-byte character. [`Utf8StreamDecoder`] holds
//! back an incomplete trailing sequence and prefixes it to the next chunk.
//!
//! Malformed bytes never fail the stream: each invalid sequence is replaced
//! with U+FFFD, the same substitution `String::from_utf8_lossy` performs.

/// Replacement for malformed input
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Stateful chunk-to-text decoder (one per stream).
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk.
    ///
    /// Returns every complete character available so far. An incomplete
    /// sequence at the end of `bytes` is kept for the next call and is
    /// never part of the returned fragment.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        if self.pending.is_empty() {
            return self.decode_owned(bytes);
        }
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);
        self.decode_owned(&input)
    }

    /// Finish the stream.
    ///
    /// Anything still buffered is a truncated sequence that can never
    /// complete, so it is dropped and an empty fragment is returned.
    pub fn flush(&mut self) -> String {
        self.pending.clear();
        String::new()
    }

    /// Number of bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn decode_owned(&mut self, mut input: &[u8]) -> String {
        let mut out = String::with_capacity(input.len());
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    return out;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    // `valid_up_to` marks a prefix that is valid UTF-8
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT);
                            input = &rest[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end of input
                            self.pending.extend_from_slice(rest);
                            return out;
                        }
                    }
                }
            }
        }
    }
}
