//! Thermal-array device session
//!
//! A session pairs the bus with one pool slot and layers the typed
//! sensor operations on the block-transfer engine. Bring-up is lazy: the
//! first successful access after allocation probes the device once and
//! flips the slot to ready; a failed probe leaves the slot untouched so
//! the next access retries.
//!
//! Every operation that fills a caller buffer checks capacity before any
//! bus activity — a too-small buffer never produces a partial result.

use crate::bus::BusInterface;
use crate::pool::DeviceSlot;
use crate::transfer::BlockTransfer;
use crate::{registers, Error};

/// Sensor firmware version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Patch level.
    pub patch: u8,
}

/// One device's session: the bus plus its pool slot.
pub struct ThermalSession<'a, B> {
    bus: &'a mut B,
    slot: &'a mut DeviceSlot,
}

impl<'a, B: BusInterface> ThermalSession<'a, B> {
    /// Open a session for `slot` on `bus`.
    pub fn new(bus: &'a mut B, slot: &'a mut DeviceSlot) -> Self {
        Self { bus, slot }
    }

    /// Run one-time device bring-up if it has not succeeded yet.
    ///
    /// Idempotent. The probe is a single serial-number word read; on
    /// failure the slot stays uninitialized and the error surfaces as
    /// [`Error::Communication`], so the next access retries bring-up.
    pub fn ensure_initialized(&mut self) -> Result<(), Error> {
        if self.slot.is_ready() {
            return Ok(());
        }
        let address = self.slot.address();
        let mut id = [0u16; 1];
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer
            .read(registers::ID0, &mut id)
            .map_err(|_| Error::Communication)?;
        self.slot.mark_ready();
        #[cfg(feature = "defmt")]
        defmt::debug!("device {=u8} initialized", address);
        Ok(())
    }

    /// Read the processed object-temperature frame.
    ///
    /// Fills `out[0]` with the ambient-temperature word and
    /// `out[1..=768]` with the object words; returns the word count.
    pub fn read_object_frame(&mut self, out: &mut [u16]) -> Result<usize, Error> {
        if out.len() < registers::FRAME_WORDS {
            return Err(Error::BufferTooSmall);
        }
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer.read(registers::TO_DATA, &mut out[1..registers::FRAME_WORDS])?;
        transfer.read(registers::TA_DATA, &mut out[..1])?;
        Ok(registers::FRAME_WORDS)
    }

    /// Read the raw IR frame and refresh the slot's progress cache.
    ///
    /// Same layout as [`read_object_frame`](Self::read_object_frame),
    /// sourced from the raw IR registers.
    pub fn read_raw_frame(&mut self, out: &mut [u16]) -> Result<usize, Error> {
        if out.len() < registers::FRAME_WORDS {
            return Err(Error::BufferTooSmall);
        }
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer.read(registers::IR_DATA, &mut out[1..registers::FRAME_WORDS])?;
        transfer.read(registers::TA_DATA, &mut out[..1])?;
        let mut progress = [0u16; 1];
        transfer.read(registers::PROGRESS, &mut progress)?;
        self.slot.progress = progress[0];
        Ok(registers::FRAME_WORDS)
    }

    /// Read the device serial number (4 words).
    pub fn serial_number(&mut self, out: &mut [u16]) -> Result<usize, Error> {
        if out.len() < registers::ID_WORDS {
            return Err(Error::BufferTooSmall);
        }
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer.read(registers::ID0, &mut out[..registers::ID_WORDS])?;
        Ok(registers::ID_WORDS)
    }

    /// Check whether a new frame is ready to be read.
    ///
    /// Ready while the DSP is still busy means the device is
    /// mid-computation and must not be sampled; in that case one
    /// object-frame word is read and discarded to clear the hardware
    /// ready latch, and no new data is reported.
    pub fn new_data_ready(&mut self) -> Result<bool, Error> {
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        let mut word = [0u16; 1];
        transfer.read(registers::FLAGS, &mut word)?;
        let busy = word[0] & registers::FLAG_BUSY != 0;
        let ready = word[0] & registers::FLAG_READY != 0;
        if ready && busy {
            transfer.read(registers::TO_DATA, &mut word)?;
            return Ok(false);
        }
        Ok(ready)
    }

    /// Read the refresh-rate setting.
    pub fn refresh_rate(&mut self) -> Result<u8, Error> {
        Ok(self.read_word(registers::EE_REFRESH_RATE)? as u8)
    }

    /// Write the refresh-rate setting.
    pub fn set_refresh_rate(&mut self, rate: u8) -> Result<(), Error> {
        self.write_word(registers::EE_REFRESH_RATE, u16::from(rate))
    }

    /// Read the emissivity word.
    pub fn emissivity(&mut self) -> Result<i16, Error> {
        Ok(self.read_word(registers::EE_EMISSIVITY)? as i16)
    }

    /// Write the emissivity word.
    pub fn set_emissivity(&mut self, emissivity: i16) -> Result<(), Error> {
        self.write_word(registers::EE_EMISSIVITY, emissivity as u16)
    }

    /// Read the sensor firmware version.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, Error> {
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        let mut words = [0u16; 2];
        transfer.read(registers::FW_VERSION, &mut words)?;
        Ok(FirmwareVersion {
            major: (words[0] >> 8) as u8,
            minor: (words[0] & 0x00ff) as u8,
            patch: (words[1] & 0x00ff) as u8,
        })
    }

    /// Block-read arbitrary device memory.
    ///
    /// Range checking comes from the transfer engine; out-of-range
    /// requests are rejected before any bus activity.
    pub fn memory_read(&mut self, start: u16, out: &mut [u16]) -> Result<(), Error> {
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer.read(start, out)
    }

    /// Block-write arbitrary device memory.
    pub fn memory_write(&mut self, start: u16, data: &[u16]) -> Result<(), Error> {
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer.write(start, data)
    }

    fn read_word(&mut self, register: u16) -> Result<u16, Error> {
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        let mut word = [0u16; 1];
        transfer.read(register, &mut word)?;
        Ok(word[0])
    }

    fn write_word(&mut self, register: u16, value: u16) -> Result<(), Error> {
        let address = self.slot.address();
        let mut transfer = BlockTransfer::new(&mut *self.bus, address, registers::SPACE_WORDS);
        transfer.write(register, &[value])
    }
}
