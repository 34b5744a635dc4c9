//! Bus interface implementation over `embedded-hal`
//!
//! This module adapts any [`embedded_hal::i2c::I2c`] peripheral to the
//! crate's transaction-level [`BusInterface`] seam.
//!
//! `embedded-hal` exposes whole transactions rather than an open bus, so
//! the adapter queues bytes until the transaction closes. A close with
//! `repeated_start = true` defers the queued bytes: the following
//! [`request`](BusInterface::request) then issues a single
//! write-then-read `embedded-hal` transaction, which is exactly the
//! repeated-start framing the devices require. Because the deferred
//! close cannot observe an acknowledgment yet, its failure surfaces as a
//! short read phase instead.

use crate::bus::{AckCode, BusInterface, BusQuirks};
use embedded_hal::i2c::{Error as I2cError, ErrorKind, I2c, NoAcknowledgeSource};
use heapless::Vec;

/// Data bytes one read phase of the adapter can move.
pub const CHUNK_CAPACITY: usize = 32;

/// Transmit queue size: a 16-bit register pointer plus one full chunk.
const TX_CAPACITY: usize = CHUNK_CAPACITY + 2;

/// I2C interface for the probe core.
///
/// Wraps an `embedded-hal` bus and presents it as a [`BusInterface`].
pub struct I2cInterface<I2C> {
    i2c: I2C,
    quirks: BusQuirks,
    target: u8,
    tx: Vec<u8, TX_CAPACITY>,
    tx_overflow: bool,
    pending: Vec<u8, TX_CAPACITY>,
    pending_target: u8,
    rx: Vec<u8, CHUNK_CAPACITY>,
    rx_cursor: usize,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new interface with no platform quirks.
    pub fn new(i2c: I2C) -> Self {
        Self::with_quirks(i2c, BusQuirks::NONE)
    }

    /// Create a new interface with the given controller errata.
    pub fn with_quirks(i2c: I2C, quirks: BusQuirks) -> Self {
        Self {
            i2c,
            quirks,
            target: 0,
            tx: Vec::new(),
            tx_overflow: false,
            pending: Vec::new(),
            pending_target: 0,
            rx: Vec::new(),
            rx_cursor: 0,
        }
    }

    /// Consume the interface and return the I2C peripheral.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn ack_from_error<E: I2cError>(error: &E) -> AckCode {
    match error.kind() {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => AckCode::ADDRESS_NACK,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => AckCode::DATA_NACK,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown) => AckCode::ADDRESS_NACK,
        _ => AckCode::OTHER,
    }
}

impl<I2C: I2c> BusInterface for I2cInterface<I2C> {
    fn chunk_capacity(&self) -> usize {
        CHUNK_CAPACITY
    }

    fn quirks(&self) -> BusQuirks {
        self.quirks
    }

    fn begin(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
        self.tx_overflow = false;
    }

    fn write_byte(&mut self, byte: u8) {
        if self.tx.push(byte).is_err() {
            self.tx_overflow = true;
        }
    }

    fn end(&mut self, repeated_start: bool) -> AckCode {
        if self.tx_overflow {
            self.tx.clear();
            return AckCode::DATA_TOO_LONG;
        }
        if repeated_start {
            // Defer the queued bytes; the next read phase sends them as
            // the write half of one write-then-read transaction.
            self.pending.clear();
            self.pending.extend_from_slice(&self.tx).ok();
            self.pending_target = self.target;
            self.tx.clear();
            return AckCode::OK;
        }
        if self.tx.is_empty() {
            return AckCode::OK;
        }
        let result = self.i2c.write(self.target, &self.tx);
        self.tx.clear();
        match result {
            Ok(()) => AckCode::OK,
            Err(error) => ack_from_error(&error),
        }
    }

    fn request(&mut self, address: u8, count: usize) -> usize {
        let count = count.min(CHUNK_CAPACITY);
        self.rx.clear();
        self.rx_cursor = 0;
        if self.rx.resize(count, 0).is_err() {
            return 0;
        }
        let result = if !self.pending.is_empty() && self.pending_target == address {
            let result = self.i2c.write_read(address, &self.pending, &mut self.rx);
            self.pending.clear();
            result
        } else {
            self.i2c.read(address, &mut self.rx)
        };
        match result {
            Ok(()) => count,
            Err(_) => {
                self.rx.clear();
                0
            }
        }
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self.rx.get(self.rx_cursor).copied().unwrap_or(0);
        self.rx_cursor += 1;
        byte
    }
}
