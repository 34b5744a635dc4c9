//! Register map for the thermal-array sensor
//!
//! The probe's primary sensor is a 32×24 pixel thermal array with a
//! word-addressed register file: a status/flags word, measurement data
//! (ambient temperature, raw IR frame, processed object-temperature
//! frame), identity words, and a small non-volatile configuration area.
//! Only the layout the driver touches is listed here.

/// Status flags word.
pub const FLAGS: u16 = 0x1000;

/// Ambient (sensor) temperature word.
pub const TA_DATA: u16 = 0x1001;

/// Frame-progress word, cached per device slot after raw reads.
pub const PROGRESS: u16 = 0x1002;

/// Start of the raw IR frame ([`PIXEL_COUNT`] words).
pub const IR_DATA: u16 = 0x1080;

/// Start of the processed object-temperature frame ([`PIXEL_COUNT`] words).
pub const TO_DATA: u16 = 0x1400;

/// First of the [`ID_WORDS`] serial-number words.
pub const ID0: u16 = 0x2000;

/// Number of serial-number words.
pub const ID_WORDS: usize = 4;

/// Firmware version: word 0 holds major/minor bytes, word 1 the patch.
pub const FW_VERSION: u16 = 0x2010;

/// Refresh-rate configuration word (non-volatile).
pub const EE_REFRESH_RATE: u16 = 0x2400;

/// Emissivity configuration word (non-volatile).
pub const EE_EMISSIVITY: u16 = 0x2401;

/// Exclusive end of the word-addressable register space.
pub const SPACE_WORDS: u32 = 0x3000;

/// Pixels per frame (32 columns × 24 rows).
pub const PIXEL_COUNT: usize = 768;

/// Words in one reported frame: ambient temperature plus the pixels.
pub const FRAME_WORDS: usize = PIXEL_COUNT + 1;

/// Flags bit: DSP busy computing the next frame.
pub const FLAG_BUSY: u16 = 0x0001;

/// Flags bit: a new frame is ready.
pub const FLAG_READY: u16 = 0x0100;

/// Ambient-temperature scale: raw LSBs per degree Celsius.
pub const LSB_SENSOR_C: f32 = 100.0;

/// Object-temperature scale: raw LSBs per degree Celsius.
pub const LSB_OBJECT_C: f32 = 50.0;

/// Highest valid refresh-rate setting.
pub const REFRESH_RATE_MAX: u8 = 7;

/// Emissivity fixed point: raw value representing 1.0.
const EMISSIVITY_ONE: f32 = 0x4000 as f32;

/// Convert a raw emissivity word to its fractional value.
#[must_use]
pub fn emissivity_to_float(raw: i16) -> f32 {
    f32::from(raw) / EMISSIVITY_ONE
}

/// Convert a fractional emissivity to its raw fixed-point word.
#[must_use]
pub fn emissivity_from_float(value: f32) -> i16 {
    (value * EMISSIVITY_ONE) as i16
}
