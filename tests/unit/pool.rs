//! Unit tests for the device handle pool

use i2c_probe::{Error, HandlePool, SlotTag};

#[test]
fn test_allocate_then_resolve_reuses_slot() {
    let mut pool: HandlePool<2> = HandlePool::new();
    pool.resolve_or_allocate(0x10).unwrap();
    assert_eq!(pool.occupied(), 1);

    // Same address resolves to the existing slot, not a new one.
    pool.resolve_or_allocate(0x10).unwrap();
    assert_eq!(pool.occupied(), 1);
}

#[test]
fn test_new_slot_starts_uninitialized() {
    let mut pool: HandlePool<2> = HandlePool::new();
    let slot = pool.resolve_or_allocate(0x10).unwrap();
    assert_eq!(slot.tag(), SlotTag::Uninitialized);
    assert_eq!(slot.address(), 0x10);
    assert_eq!(slot.progress, 0);
}

#[test]
fn test_exhaustion_leaves_slots_unmodified() {
    let mut pool: HandlePool<2> = HandlePool::new();
    pool.resolve_or_allocate(0x10).unwrap();
    pool.resolve_or_allocate(0x11).unwrap();

    let before: Vec<_> = pool.iter().copied().collect();
    assert_eq!(
        pool.resolve_or_allocate(0x12).unwrap_err(),
        Error::PoolExhausted
    );
    let after: Vec<_> = pool.iter().copied().collect();
    assert_eq!(before, after);
}

#[test]
fn test_release_frees_capacity() {
    let mut pool: HandlePool<2> = HandlePool::new();
    pool.resolve_or_allocate(0x10).unwrap();
    pool.resolve_or_allocate(0x11).unwrap();
    assert!(pool.resolve_or_allocate(0x12).is_err());

    pool.release(0x10);
    assert_eq!(pool.occupied(), 1);
    pool.resolve_or_allocate(0x12).unwrap();
    assert_eq!(pool.occupied(), 2);
}

#[test]
fn test_release_is_idempotent() {
    let mut pool: HandlePool<2> = HandlePool::new();
    pool.resolve_or_allocate(0x10).unwrap();
    pool.release(0x10);
    pool.release(0x10);
    pool.release(0x55); // never allocated
    assert_eq!(pool.occupied(), 0);
}

#[test]
fn test_address_unknown_slot_is_reassigned() {
    let mut pool: HandlePool<2> = HandlePool::new();
    // A slot whose true address is not known yet carries address zero.
    pool.resolve_or_allocate(0x00).unwrap();
    assert_eq!(pool.occupied(), 1);

    // First contact with a real address claims that slot instead of
    // allocating a second one.
    let slot = pool.resolve_or_allocate(0x42).unwrap();
    assert_eq!(slot.address(), 0x42);
    assert_eq!(slot.tag(), SlotTag::Uninitialized);
    assert_eq!(pool.occupied(), 1);
    assert!(pool.find(0x00).is_none());
    assert!(pool.find(0x42).is_some());
}

#[test]
fn test_no_duplicate_addresses_under_churn() {
    let mut pool: HandlePool<4> = HandlePool::new();
    let script: &[(bool, u8)] = &[
        (true, 0x10),
        (true, 0x11),
        (false, 0x10),
        (true, 0x12),
        (true, 0x11),
        (true, 0x10),
        (false, 0x11),
        (true, 0x13),
        (true, 0x13),
        (false, 0x12),
        (true, 0x11),
    ];
    for &(allocate, address) in script {
        if allocate {
            let _ = pool.resolve_or_allocate(address);
        } else {
            pool.release(address);
        }
        let mut addresses: Vec<u8> = pool.iter().map(|slot| slot.address()).collect();
        addresses.sort_unstable();
        let total = addresses.len();
        addresses.dedup();
        assert_eq!(addresses.len(), total, "duplicate address in pool");
    }
}

#[test]
fn test_invalid_address_rejected() {
    let mut pool: HandlePool<2> = HandlePool::new();
    assert_eq!(
        pool.resolve_or_allocate(0x80).unwrap_err(),
        Error::OutOfRange
    );
    assert_eq!(pool.occupied(), 0);
}

#[test]
fn test_capacity_reporting() {
    let pool: HandlePool<3> = HandlePool::new();
    assert_eq!(pool.capacity(), 3);
    assert_eq!(pool.occupied(), 0);
}
