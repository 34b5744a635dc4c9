//! High-level probe context and thermal-array command surface
//!
//! [`Probe`] is the one explicit context the dispatcher hands to every
//! driver entry point: the bus, the platform collaborators, the device
//! pool, and the joystick application state. Nothing here is a process
//! global; construct it at start-up, tear it down with
//! [`Probe::release`].
//!
//! The thermal-array methods are thin command adapters: resolve the
//! slot, run lazy bring-up, delegate to the session, and convert to the
//! reported units. Errors come back as [`Error`] values; the dispatcher
//! renders them with [`Error::message`] and aborts only the current
//! command's response.

use crate::bus::BusInterface;
use crate::fmt;
use crate::joystick::JoystickApp;
use crate::platform::{Clock, ResponseSink, Storage};
use crate::pool::HandlePool;
use crate::session::ThermalSession;
use crate::transfer::BlockTransfer;
use crate::{registers, Error, DEVICE_POOL_CAPACITY};

/// Shape of the memory window reported alongside `mr`/`mw` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryLayout {
    /// Bits stored at each address.
    pub bits_per_address: u8,
    /// Address step between consecutive values.
    pub address_increments: u8,
}

impl MemoryLayout {
    /// The thermal array's word-addressed layout.
    pub const WORD: Self = Self {
        bits_per_address: 16,
        address_increments: 1,
    };
}

/// The probe driver context.
pub struct Probe<B, S, C> {
    pub(crate) bus: B,
    pub(crate) storage: S,
    pub(crate) clock: C,
    pub(crate) pool: HandlePool<DEVICE_POOL_CAPACITY>,
    pub(crate) joystick: JoystickApp,
}

impl<B: BusInterface, S: Storage, C: Clock> Probe<B, S, C> {
    /// Create a context over the platform collaborators.
    pub fn new(bus: B, storage: S, clock: C) -> Self {
        Self {
            bus,
            storage,
            clock,
            pool: HandlePool::new(),
            joystick: JoystickApp::new(),
        }
    }

    /// Tear the context down, returning the collaborators.
    pub fn release(self) -> (B, S, C) {
        (self.bus, self.storage, self.clock)
    }

    /// The device pool (read-only view).
    pub fn pool(&self) -> &HandlePool<DEVICE_POOL_CAPACITY> {
        &self.pool
    }

    /// Set the joystick application's target bus address.
    pub fn set_joystick_address(&mut self, address: u8) {
        self.joystick.set_address(address);
    }

    /// The joystick application's target bus address (0 = unknown).
    pub fn joystick_address(&self) -> u8 {
        self.joystick.address()
    }

    fn session(&mut self, address: u8) -> Result<ThermalSession<'_, B>, Error> {
        let slot = self.pool.resolve_or_allocate(address)?;
        Ok(ThermalSession::new(&mut self.bus, slot))
    }

    /// Read one frame converted to measurement values.
    ///
    /// `out[0]` is the ambient temperature in °C, `out[1..=768]` the
    /// object temperatures in °C. Returns the value count.
    pub fn measured_values(&mut self, address: u8, out: &mut [f32]) -> Result<usize, Error> {
        if out.len() < registers::FRAME_WORDS {
            return Err(Error::BufferTooSmall);
        }
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        let mut frame = [0u16; registers::FRAME_WORDS];
        session.read_object_frame(&mut frame)?;
        out[0] = f32::from(frame[0] as i16) / registers::LSB_SENSOR_C;
        for (value, raw) in out[1..registers::FRAME_WORDS]
            .iter_mut()
            .zip(&frame[1..registers::FRAME_WORDS])
        {
            *value = f32::from(*raw as i16) / registers::LSB_OBJECT_C;
        }
        Ok(registers::FRAME_WORDS)
    }

    /// Read one raw frame: ambient word then the 768 IR words.
    ///
    /// Also refreshes the slot's cached frame-progress word.
    pub fn raw_values(&mut self, address: u8, out: &mut [u16]) -> Result<usize, Error> {
        if out.len() < registers::FRAME_WORDS {
            return Err(Error::BufferTooSmall);
        }
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        session.read_raw_frame(out)
    }

    /// Check whether the device has a new frame ready.
    pub fn new_data(&mut self, address: u8) -> Result<bool, Error> {
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        session.new_data_ready()
    }

    /// Read the device serial number (4 words).
    pub fn serial_number(&mut self, address: u8, out: &mut [u16]) -> Result<usize, Error> {
        if out.len() < registers::ID_WORDS {
            return Err(Error::BufferTooSmall);
        }
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        session.serial_number(out)
    }

    /// Report the device configuration on `channel`.
    ///
    /// Emits one `cs:<address>:<field>` line per configuration field,
    /// followed by the read-only measurement-layout description.
    pub fn report_config(
        &mut self,
        address: u8,
        channel: u8,
        sink: &mut impl ResponseSink,
    ) -> Result<(), Error> {
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        let hex = fmt::hex_u8(address);

        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":SA=", false);
        sink.send_chunk(channel, hex.as_str(), true);

        let rate = session.refresh_rate()?;
        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":RR=", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(rate)).as_str(), true);

        let emissivity = session.emissivity()?;
        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":EM=", false);
        sink.send_chunk(
            channel,
            fmt::float3(registers::emissivity_to_float(emissivity)).as_str(),
            true,
        );

        let version = session.firmware_version()?;
        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":RO:FW=", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(version.major)).as_str(), false);
        sink.send_chunk(channel, ".", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(version.minor)).as_str(), false);
        sink.send_chunk(channel, ".", false);
        sink.send_chunk(channel, fmt::dec_i32(i32::from(version.patch)).as_str(), true);

        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":RO:MV_HEADER=TA,TO_[768]", true);

        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":RO:MV_UNIT=DegC,DegC[768]", true);

        sink.send_chunk(channel, "cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);
        sink.send_chunk(channel, ":RO:MV_RES=100,50[768]", true);

        Ok(())
    }

    /// Apply a `<field>=<value>` configuration write and report the
    /// outcome on `channel`.
    pub fn write_config(
        &mut self,
        address: u8,
        channel: u8,
        input: &str,
        sink: &mut impl ResponseSink,
    ) -> Result<(), Error> {
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        let hex = fmt::hex_u8(address);

        sink.send_chunk(channel, "+cs:", false);
        sink.send_chunk(channel, hex.as_str(), false);

        if let Some(rest) = input.strip_prefix("RR=") {
            match rest.trim().parse::<i16>() {
                Ok(rate) if (0..=i16::from(registers::REFRESH_RATE_MAX)).contains(&rate) => {
                    session.set_refresh_rate(rate as u8)?;
                    sink.send_chunk(channel, ":RR=OK [ee]", true);
                }
                _ => sink.send_chunk(channel, ":RR=FAIL; outbound", true),
            }
            return Ok(());
        }

        if let Some(rest) = input.strip_prefix("EM=") {
            match rest.trim().parse::<i16>() {
                Ok(emissivity) => {
                    session.set_emissivity(emissivity)?;
                    sink.send_chunk(channel, ":EM=OK [ee]", true);
                }
                _ => sink.send_chunk(channel, ":EM=FAIL; outbound", true),
            }
            return Ok(());
        }

        sink.send_chunk(channel, ":FAIL; unknown variable", true);
        Ok(())
    }

    /// Block-read device memory into `out`.
    pub fn memory_read(
        &mut self,
        address: u8,
        start: u16,
        out: &mut [u16],
    ) -> Result<MemoryLayout, Error> {
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        session.memory_read(start, out)?;
        Ok(MemoryLayout::WORD)
    }

    /// Block-write `data` into device memory.
    pub fn memory_write(
        &mut self,
        address: u8,
        start: u16,
        data: &[u16],
    ) -> Result<MemoryLayout, Error> {
        let mut session = self.session(address)?;
        session.ensure_initialized()?;
        session.memory_write(start, data)?;
        Ok(MemoryLayout::WORD)
    }

    /// Check whether the device at `address` answers as a thermal array.
    ///
    /// Runs before any initialization and allocates no handle: one
    /// serial-number word is read directly. A device that does not
    /// answer, or answers with a blank identity, is not a match.
    pub fn probe_device(&mut self, address: u8) -> Result<bool, Error> {
        if address >= 0x80 {
            return Err(Error::OutOfRange);
        }
        let mut id = [0u16; 1];
        let mut transfer = BlockTransfer::new(&mut self.bus, address, registers::SPACE_WORDS);
        match transfer.read(registers::ID0, &mut id) {
            Ok(()) => Ok(id[0] != 0),
            Err(_) => Ok(false),
        }
    }

    /// Stop tracking the device at `address` and free its slot.
    pub fn tear_down(&mut self, address: u8) {
        self.pool.release(address);
    }
}
