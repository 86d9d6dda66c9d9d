//! Byte-stream decoding.
//!
//! - [`utf8::Utf8StreamDecoder`]: chunked bytes to text fragments

pub mod utf8;
