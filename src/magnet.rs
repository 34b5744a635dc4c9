//! Joystick magnetometer
//!
//! The joystick application samples a 3-axis magnetometer with
//! byte-addressed registers: one control register enables the axes and
//! the temperature channel and selects the continuous 50 Hz mode, and
//! the sample block delivers x/y/z/t as little-endian 16-bit values.

use crate::bus::BusInterface;
use crate::Error;

/// Status register.
pub const STAT1: u8 = 0x00;

/// Start of the sample block (x low byte).
pub const DATA_X_L: u8 = 0x01;

/// Control register 1: axis/temperature enables and mode.
pub const CTRL1: u8 = 0x0e;

/// Enable the X axis.
pub const CTRL1_EN_X: u8 = 0x01;
/// Enable the Y axis.
pub const CTRL1_EN_Y: u8 = 0x02;
/// Enable the Z axis.
pub const CTRL1_EN_Z: u8 = 0x04;
/// Enable the temperature channel.
pub const CTRL1_EN_T: u8 = 0x08;
/// Continuous measurement at 50 Hz.
pub const CTRL1_MODE_50HZ: u8 = 0x60;

/// Bytes in one x/y/z/t sample block.
const SAMPLE_BYTES: usize = 8;

/// One magnetometer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagSample {
    /// X-axis field (raw).
    pub x: i16,
    /// Y-axis field (raw).
    pub y: i16,
    /// Z-axis field (raw).
    pub z: i16,
    /// Die temperature (raw).
    pub t: i16,
}

/// Configure the device for joystick use: all axes plus temperature,
/// continuous 50 Hz.
pub fn configure<B: BusInterface>(bus: &mut B, address: u8) -> Result<(), Error> {
    write_register(
        bus,
        address,
        CTRL1,
        CTRL1_EN_X | CTRL1_EN_Y | CTRL1_EN_Z | CTRL1_EN_T | CTRL1_MODE_50HZ,
    )
}

/// Read one x/y/z/t sample.
pub fn read_sample<B: BusInterface>(bus: &mut B, address: u8) -> Result<MagSample, Error> {
    let quirks = bus.quirks();
    bus.begin(address);
    bus.write_byte(DATA_X_L);
    let ack = quirks.normalize(bus.end(true));
    if !ack.is_ok() {
        return Err(Error::Communication);
    }
    if bus.request(address, SAMPLE_BYTES) < SAMPLE_BYTES {
        return Err(Error::Communication);
    }
    let mut bytes = [0u8; SAMPLE_BYTES];
    for byte in bytes.iter_mut() {
        *byte = bus.read_byte();
    }
    Ok(MagSample {
        x: i16::from_le_bytes([bytes[0], bytes[1]]),
        y: i16::from_le_bytes([bytes[2], bytes[3]]),
        z: i16::from_le_bytes([bytes[4], bytes[5]]),
        t: i16::from_le_bytes([bytes[6], bytes[7]]),
    })
}

fn write_register<B: BusInterface>(
    bus: &mut B,
    address: u8,
    register: u8,
    value: u8,
) -> Result<(), Error> {
    let quirks = bus.quirks();
    bus.begin(address);
    bus.write_byte(register);
    bus.write_byte(value);
    let ack = quirks.normalize(bus.end(false));
    if ack.is_ok() {
        Ok(())
    } else {
        Err(Error::Communication)
    }
}
