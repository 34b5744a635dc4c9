//! Chunked register block transfers
//!
//! The sensors expose word-addressed register files far larger than the
//! bus controller's hardware buffer, so a logical block transfer is
//! split into chunks. Each chunk re-sends the 16-bit register pointer
//! (big-endian), keeps the bus claimed with a repeated start for the
//! data phase, and moves at most [`chunk_capacity`] bytes. The first
//! failed chunk aborts the whole transfer: data already placed in the
//! caller's buffer is stale by contract and must be discarded.
//!
//! [`chunk_capacity`]: crate::bus::BusInterface::chunk_capacity

use crate::bus::{AckCode, BusInterface};
use crate::Error;

/// One block-transfer target: a device and its addressable space.
///
/// Borrows the bus for the duration of the transfer; the range check
/// runs before any bus activity, so a rejected request has zero side
/// effects.
pub struct BlockTransfer<'a, B> {
    bus: &'a mut B,
    address: u8,
    space_words: u32,
}

impl<'a, B: BusInterface> BlockTransfer<'a, B> {
    /// Target the device at `address` whose register space ends at
    /// `space_words` (exclusive).
    pub fn new(bus: &'a mut B, address: u8, space_words: u32) -> Self {
        Self {
            bus,
            address,
            space_words,
        }
    }

    fn check_range(&self, start: u16, words: usize) -> Result<(), Error> {
        if u32::from(start) + words as u32 > self.space_words {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }

    /// Send the register pointer for the chunk starting at `register`.
    fn open_chunk(&mut self, register: u16) {
        self.bus.begin(self.address);
        self.bus.write_byte((register >> 8) as u8);
        self.bus.write_byte((register & 0x00ff) as u8);
    }

    /// Read `out.len()` consecutive words starting at `start_register`.
    pub fn read(&mut self, start_register: u16, out: &mut [u16]) -> Result<(), Error> {
        self.check_range(start_register, out.len())?;

        let quirks = self.bus.quirks();
        let capacity = self.bus.chunk_capacity() & !1;
        debug_assert!(capacity >= 2);

        let mut register = start_register;
        let mut cursor = 0usize;
        let mut remaining = out.len() * 2;
        while remaining > 0 {
            self.open_chunk(register);
            let ack = quirks.normalize(self.bus.end(true));
            if !ack.is_ok() {
                #[cfg(feature = "defmt")]
                defmt::debug!("block read aborted at {=u16}: ack {=u8}", register, ack.0);
                return Err(Error::Bus(ack));
            }

            let n = remaining.min(capacity);
            if self.bus.request(self.address, n) < n {
                return Err(Error::Bus(AckCode::DATA_NACK));
            }
            let mut taken = 0;
            while taken < n {
                let high = self.bus.read_byte();
                let low = self.bus.read_byte();
                out[cursor] = u16::from_be_bytes([high, low]);
                cursor += 1;
                taken += 2;
            }

            register = register.wrapping_add((n / 2) as u16);
            remaining -= n;
        }
        Ok(())
    }

    /// Write `data` to consecutive words starting at `start_register`.
    pub fn write(&mut self, start_register: u16, data: &[u16]) -> Result<(), Error> {
        self.check_range(start_register, data.len())?;

        let quirks = self.bus.quirks();
        let capacity = self.bus.chunk_capacity() & !1;
        debug_assert!(capacity >= 2);

        let mut register = start_register;
        let mut offset = 0usize;
        while offset < data.len() {
            let words = ((data.len() - offset) * 2).min(capacity) / 2;
            self.open_chunk(register);
            for word in &data[offset..offset + words] {
                let [high, low] = word.to_be_bytes();
                self.bus.write_byte(high);
                self.bus.write_byte(low);
            }
            let ack = quirks.normalize(self.bus.end(false));
            if !ack.is_ok() {
                #[cfg(feature = "defmt")]
                defmt::debug!("block write aborted at {=u16}: ack {=u8}", register, ack.0);
                return Err(Error::Bus(ack));
            }

            register = register.wrapping_add(words as u16);
            offset += words;
        }
        Ok(())
    }
}
