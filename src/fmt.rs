//! Response-field rendering
//!
//! Small bounded-buffer helpers turning values into the dispatcher's
//! wire field formats. The chunked answer channel itself lives upstream;
//! these only produce the text of single fields.

use core::fmt::Write;
use heapless::String;

/// Rendered field; large enough for any value the drivers emit.
pub(crate) type FieldBuf = String<16>;

/// Two lowercase hex digits, as bus addresses are reported.
pub(crate) fn hex_u8(value: u8) -> FieldBuf {
    let mut buf = FieldBuf::new();
    write!(buf, "{:02x}", value).ok();
    buf
}

/// Plain decimal.
pub(crate) fn dec_i32(value: i32) -> FieldBuf {
    let mut buf = FieldBuf::new();
    write!(buf, "{}", value).ok();
    buf
}

/// Zero-padded 8-digit decimal, as timestamps are reported.
pub(crate) fn dec_u32_padded8(value: u32) -> FieldBuf {
    let mut buf = FieldBuf::new();
    write!(buf, "{:08}", value).ok();
    buf
}

/// Three-decimal fixed notation, as angles and fractions are reported.
pub(crate) fn float3(value: f32) -> FieldBuf {
    let mut buf = FieldBuf::new();
    write!(buf, "{:.3}", value).ok();
    buf
}
