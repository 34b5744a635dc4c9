//! Platform collaborator traits
//!
//! The probe core consumes three services from its host firmware: a
//! monotonic millisecond clock, a byte-addressable non-volatile memory,
//! and the dispatcher's "send chunk" response primitive. Each is a trait
//! so targets and the host test suite can inject their own
//! implementations.

/// Monotonic millisecond clock source.
///
/// The counter is free-running and allowed to wrap; interval checks must
/// use `u32::wrapping_sub` against a stored reference sample.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch (typically boot).
    fn now_ms(&self) -> u32;
}

/// Byte-addressable non-volatile storage.
///
/// Writes take effect immediately; the driver performs no batching or
/// commit step of its own.
pub trait Storage {
    /// Read one byte at `offset`.
    fn read_byte(&mut self, offset: u32) -> u8;
    /// Write one byte at `offset`.
    fn write_byte(&mut self, offset: u32, byte: u8);
}

/// Upstream response channel.
///
/// One logical response line is delivered as a sequence of text chunks;
/// the chunk carrying `last_chunk = true` terminates the line.
pub trait ResponseSink {
    /// Send one chunk of response text on `channel`.
    fn send_chunk(&mut self, channel: u8, text: &str, last_chunk: bool);
}
