#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bus;
pub mod calibration;
pub mod device;
mod fmt;
pub mod interface;
pub mod joystick;
pub mod magnet;
pub mod platform;
pub mod pool;
pub mod registers;
pub mod session;
pub mod transfer;

// Re-export main types
pub use bus::{AckCode, BusInterface, BusQuirks};
pub use calibration::Calibration;
pub use device::{MemoryLayout, Probe};
pub use interface::I2cInterface;
pub use joystick::JoystickApp;
pub use platform::{Clock, ResponseSink, Storage};
pub use pool::{DeviceSlot, HandlePool, SlotTag};
pub use session::{FirmwareVersion, ThermalSession};
pub use transfer::BlockTransfer;

/// Number of sensors the probe can track at the same time.
///
/// One slot is consumed per distinct bus address until it is torn down.
/// Allocating beyond this capacity fails with [`Error::PoolExhausted`].
pub const DEVICE_POOL_CAPACITY: usize = 2;

/// Application identifier meaning "no application running".
///
/// Returned by application `begin`/`end` entry points to hand control
/// back to the dispatcher's idle loop.
pub const APP_NONE: u8 = 0;

/// Application identifier of the joystick application.
pub const JOYSTICK_APP_ID: u8 = 4;

/// Driver errors
///
/// Every operation reports its outcome as one of these values; nothing
/// in the driver aborts the process. The command dispatcher renders the
/// value with [`Error::message`] and terminates only the current
/// command's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Every device slot is in use and none could be reclaimed.
    ///
    /// A capacity error, not a transient one: the caller must tear down
    /// a tracked device (or the firmware must be rebuilt with a larger
    /// [`DEVICE_POOL_CAPACITY`]) before the address can be served.
    PoolExhausted,
    /// The request addresses registers outside the valid space.
    ///
    /// Rejected before any bus activity.
    OutOfRange,
    /// The caller-supplied output buffer cannot hold the full result.
    ///
    /// Rejected before any bus activity; no partial result is ever
    /// produced.
    BufferTooSmall,
    /// Bus acknowledgment failure during a transaction.
    ///
    /// Device state is unknown afterwards; data already written into a
    /// caller's buffer must not be trusted.
    Communication,
    /// Acknowledgment failure on one chunk of a block transfer.
    ///
    /// Carries the controller's status code. The whole transfer is
    /// aborted; remaining chunks are never attempted.
    Bus(AckCode),
}

impl Error {
    /// Human-readable message reported upstream for this outcome.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Error::PoolExhausted => {
                "No free handle; recompile firmware with a larger device pool"
            }
            Error::OutOfRange => "Out of range",
            Error::BufferTooSmall => "Buffer too small",
            Error::Communication | Error::Bus(_) => "Communication error",
        }
    }
}
