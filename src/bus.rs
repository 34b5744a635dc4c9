//! Transaction-level bus seam
//!
//! The transfer engine and the sensor drivers speak to the wire through
//! [`BusInterface`], a thin model of a buffered I2C controller: open a
//! transaction, queue bytes, close with or without a repeated start, and
//! issue read phases. [`interface::I2cInterface`](crate::interface::I2cInterface)
//! adapts any `embedded_hal::i2c::I2c` bus to this trait; targets with a
//! native controller API can implement it directly.

/// Acknowledgment status code returned when a transaction closes.
///
/// Zero is success. The remaining named values follow the common
/// buffered-controller convention; implementations may return other
/// nonzero codes, all of which are treated as failures unless the
/// platform's [`BusQuirks`] says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckCode(pub u8);

impl AckCode {
    /// Transaction acknowledged.
    pub const OK: Self = Self(0);
    /// Queued data exceeded the controller's transmit buffer.
    pub const DATA_TOO_LONG: Self = Self(1);
    /// Address byte was not acknowledged.
    pub const ADDRESS_NACK: Self = Self(2);
    /// A data byte was not acknowledged.
    pub const DATA_NACK: Self = Self(3);
    /// Controller-specific failure.
    pub const OTHER: Self = Self(4);

    /// Whether this code signals success.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }
}

/// Platform-capability description of bus-controller errata.
///
/// Some controller variants report a spurious nonzero status on an
/// otherwise clean close. That is a property of the target platform, not
/// of the protocol, so the workaround is carried here by the bus
/// implementation instead of being hard-coded in the transfer engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusQuirks {
    /// Status code the controller reports spuriously on a successful
    /// close; when it matches, the close is treated as acknowledged.
    pub spurious_ack: Option<AckCode>,
}

impl BusQuirks {
    /// No known errata.
    pub const NONE: Self = Self { spurious_ack: None };

    /// Fold a known-spurious status code back to [`AckCode::OK`].
    #[must_use]
    pub const fn normalize(self, ack: AckCode) -> AckCode {
        match self.spurious_ack {
            Some(code) => {
                if code.0 == ack.0 {
                    AckCode::OK
                } else {
                    ack
                }
            }
            None => ack,
        }
    }
}

/// Buffered bus controller.
///
/// A write transaction is `begin` / `write_byte`… / `end`; a read phase
/// is `request` / `read_byte`…. Closing with `repeated_start = true`
/// keeps the bus claimed so the next phase is framed to the device as
/// part of the same transaction (required by devices that reset their
/// register pointer on a stop condition).
///
/// Implementations own any settle delays the controller needs between
/// transactions; callers never sleep.
pub trait BusInterface {
    /// Largest number of data bytes one read or write phase can move.
    ///
    /// Must be even and at least 2; block transfers are split into
    /// phases of at most this size.
    fn chunk_capacity(&self) -> usize;

    /// Errata description for this controller.
    fn quirks(&self) -> BusQuirks {
        BusQuirks::NONE
    }

    /// Open a transaction addressed to the 7-bit `address`.
    fn begin(&mut self, address: u8);

    /// Queue one byte into the open transaction.
    fn write_byte(&mut self, byte: u8);

    /// Close the open transaction and report the acknowledgment status.
    ///
    /// With `repeated_start` the bus stays claimed for the next phase.
    fn end(&mut self, repeated_start: bool) -> AckCode;

    /// Issue a read phase of `count` bytes from `address`.
    ///
    /// Returns the number of bytes actually received; anything less than
    /// `count` means the phase failed.
    fn request(&mut self, address: u8, count: usize) -> usize;

    /// Pop the next received byte of the last read phase.
    fn read_byte(&mut self) -> u8;
}
