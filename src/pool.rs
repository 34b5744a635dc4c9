//! Device handle pool
//!
//! A fixed-size arena mapping bus addresses to per-device state. The
//! dispatcher addresses sensors by bus address only; the pool turns that
//! into a slot, allocating on first contact, reusing slots whose address
//! is not yet known, and failing loudly when capacity runs out. Slot
//! positions carry no meaning outside this module — address plus
//! initialization tag is the whole identity.

use crate::Error;

/// Initialization state of an occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotTag {
    /// Allocated, but device bring-up has not succeeded yet.
    Uninitialized,
    /// Bring-up completed; the device is ready for use.
    Ready,
}

/// Per-device state tracked by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSlot {
    address: u8,
    tag: SlotTag,
    /// Sensor-specific scratch word cached alongside the address
    /// (currently the last frame-progress value).
    pub progress: u16,
}

impl DeviceSlot {
    /// 7-bit bus address of the tracked device (0 = not yet known).
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Current initialization tag.
    #[must_use]
    pub const fn tag(&self) -> SlotTag {
        self.tag
    }

    /// Whether device bring-up has completed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.tag, SlotTag::Ready)
    }

    pub(crate) fn mark_ready(&mut self) {
        self.tag = SlotTag::Ready;
    }
}

/// Fixed-capacity pool of device slots.
///
/// Capacity is a compile-time constant; resolution is a linear scan,
/// which is intentional at these sizes. No allocation ever happens after
/// construction.
#[derive(Debug)]
pub struct HandlePool<const N: usize> {
    slots: [Option<DeviceSlot>; N],
}

impl<const N: usize> HandlePool<N> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Resolve `address` to its slot, allocating or reclaiming if needed.
    ///
    /// Resolution order:
    /// 1. an occupied slot already carrying `address`;
    /// 2. an occupied slot whose address is still unknown (zero) — it is
    ///    reassigned to `address` and reset to
    ///    [`SlotTag::Uninitialized`];
    /// 3. a free slot, allocated fresh;
    /// 4. otherwise [`Error::PoolExhausted`], leaving every slot
    ///    untouched.
    ///
    /// Addresses outside the 7-bit range are rejected with
    /// [`Error::OutOfRange`] before scanning.
    pub fn resolve_or_allocate(&mut self, address: u8) -> Result<&mut DeviceSlot, Error> {
        if address >= 0x80 {
            return Err(Error::OutOfRange);
        }

        let mut found = None;

        // Known device.
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.as_ref().is_some_and(|s| s.address == address) {
                found = Some(index);
                break;
            }
        }

        // Device whose true address was not known at allocation time.
        if found.is_none() {
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if let Some(s) = slot {
                    if s.address == 0 {
                        s.address = address;
                        s.tag = SlotTag::Uninitialized;
                        found = Some(index);
                        break;
                    }
                }
            }
        }

        // First free slot.
        if found.is_none() {
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if slot.is_none() {
                    *slot = Some(DeviceSlot {
                        address,
                        tag: SlotTag::Uninitialized,
                        progress: 0,
                    });
                    found = Some(index);
                    break;
                }
            }
        }

        match found {
            Some(index) => self.slots[index].as_mut().ok_or(Error::PoolExhausted),
            None => Err(Error::PoolExhausted),
        }
    }

    /// Release the slot tracking `address`.
    ///
    /// Idempotent: releasing an untracked address is a no-op.
    pub fn release(&mut self, address: u8) {
        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|s| s.address == address) {
                *slot = None;
            }
        }
    }

    /// Look up the slot tracking `address`, if any.
    #[must_use]
    pub fn find(&self, address: u8) -> Option<&DeviceSlot> {
        self.slots
            .iter()
            .flatten()
            .find(|slot| slot.address == address)
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Total slot capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterate over the occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceSlot> {
        self.slots.iter().flatten()
    }
}

impl<const N: usize> Default for HandlePool<N> {
    fn default() -> Self {
        Self::new()
    }
}
