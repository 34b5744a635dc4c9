//! Unit tests for the thermal-array session layer

use crate::common::{create_probe, setup_thermal_device, THERMAL_SA};
use i2c_probe::{registers, AckCode, Error, SlotTag};

#[test]
fn test_lazy_init_probes_identity_once() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut out = vec![0u16; registers::FRAME_WORDS];
    probe.raw_values(THERMAL_SA, &mut out).unwrap();
    probe.raw_values(THERMAL_SA, &mut out).unwrap();

    // Bring-up reads one identity word; a second access must not repeat it.
    assert_eq!(bus.pointer_writes(THERMAL_SA, registers::ID0), 1);
    assert!(probe.pool().find(THERMAL_SA).unwrap().is_ready());
}

#[test]
fn test_failed_bring_up_leaves_slot_uninitialized_and_retries() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);
    bus.set_ack_code(AckCode::ADDRESS_NACK);

    let mut out = vec![0u16; registers::FRAME_WORDS];
    assert_eq!(
        probe.raw_values(THERMAL_SA, &mut out),
        Err(Error::Communication)
    );
    assert_eq!(
        probe.pool().find(THERMAL_SA).unwrap().tag(),
        SlotTag::Uninitialized
    );

    // Device comes back: the next access retries bring-up and succeeds.
    bus.set_ack_code(AckCode::OK);
    probe.raw_values(THERMAL_SA, &mut out).unwrap();
    assert!(probe.pool().find(THERMAL_SA).unwrap().is_ready());
    assert_eq!(bus.pointer_writes(THERMAL_SA, registers::ID0), 2);
}

#[test]
fn test_buffer_too_small_causes_zero_bus_calls() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut small = vec![0u16; 10];
    assert_eq!(
        probe.raw_values(THERMAL_SA, &mut small),
        Err(Error::BufferTooSmall)
    );
    let mut small_f = vec![0.0f32; registers::FRAME_WORDS - 1];
    assert_eq!(
        probe.measured_values(THERMAL_SA, &mut small_f),
        Err(Error::BufferTooSmall)
    );
    let mut small_sn = vec![0u16; registers::ID_WORDS - 1];
    assert_eq!(
        probe.serial_number(THERMAL_SA, &mut small_sn),
        Err(Error::BufferTooSmall)
    );
    assert!(bus.transactions().is_empty(), "pre-flight checks must not touch the bus");
}

#[test]
fn test_raw_frame_layout_and_progress_cache() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);
    bus.set_word_register(THERMAL_SA, registers::TA_DATA, 2500);
    bus.set_word_register(THERMAL_SA, registers::PROGRESS, 0x1234);
    let pixels: Vec<u16> = (0..registers::PIXEL_COUNT as u16).collect();
    bus.load_words(THERMAL_SA, registers::IR_DATA, &pixels);

    let mut out = vec![0u16; registers::FRAME_WORDS];
    let count = probe.raw_values(THERMAL_SA, &mut out).unwrap();

    assert_eq!(count, registers::FRAME_WORDS);
    assert_eq!(out[0], 2500);
    assert_eq!(out[1], 0);
    assert_eq!(out[registers::PIXEL_COUNT], (registers::PIXEL_COUNT - 1) as u16);
    assert_eq!(probe.pool().find(THERMAL_SA).unwrap().progress, 0x1234);
}

#[test]
fn test_new_data_ready() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    bus.set_word_register(THERMAL_SA, registers::FLAGS, registers::FLAG_READY);
    assert_eq!(probe.new_data(THERMAL_SA), Ok(true));

    bus.set_word_register(THERMAL_SA, registers::FLAGS, 0);
    assert_eq!(probe.new_data(THERMAL_SA), Ok(false));
}

#[test]
fn test_new_data_busy_resynchronizes() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    // Ready while still busy: the device must not be sampled now. The
    // session clears the ready latch with a throwaway read and reports
    // no new data.
    bus.set_word_register(
        THERMAL_SA,
        registers::FLAGS,
        registers::FLAG_READY | registers::FLAG_BUSY,
    );
    assert_eq!(probe.new_data(THERMAL_SA), Ok(false));
    assert_eq!(bus.pointer_writes(THERMAL_SA, registers::TO_DATA), 1);
}

#[test]
fn test_new_data_idle_skips_corrective_read() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    bus.set_word_register(THERMAL_SA, registers::FLAGS, registers::FLAG_BUSY);
    assert_eq!(probe.new_data(THERMAL_SA), Ok(false));
    assert_eq!(bus.pointer_writes(THERMAL_SA, registers::TO_DATA), 0);
}

#[test]
fn test_serial_number_words() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut out = vec![0u16; registers::ID_WORDS];
    let count = probe.serial_number(THERMAL_SA, &mut out).unwrap();
    assert_eq!(count, registers::ID_WORDS);
    assert_eq!(out, vec![0x1122, 0x3344, 0x5566, 0x7788]);
}
