//! Unit tests for the thermal-array command surface

use crate::common::{create_probe, setup_thermal_device, MockSink, THERMAL_SA};
use i2c_probe::{registers, AckCode, Error, MemoryLayout};

#[test]
fn test_measured_values_unit_conversion() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);
    bus.set_word_register(THERMAL_SA, registers::TA_DATA, 2500);
    bus.set_word_register(THERMAL_SA, registers::TO_DATA, 1000);
    bus.set_word_register(THERMAL_SA, registers::TO_DATA + 1, (-150i16) as u16);

    let mut out = vec![0.0f32; registers::FRAME_WORDS];
    let count = probe.measured_values(THERMAL_SA, &mut out).unwrap();

    assert_eq!(count, registers::FRAME_WORDS);
    assert_eq!(out[0], 25.0); // ambient, 1/100 °C per LSB
    assert_eq!(out[1], 20.0); // object, 1/50 °C per LSB
    assert_eq!(out[2], -3.0); // raw words are signed
}

#[test]
fn test_report_config_lines() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut sink = MockSink::new();
    probe.report_config(THERMAL_SA, 1, &mut sink).unwrap();

    assert_eq!(
        sink.lines(),
        vec![
            "cs:33:SA=33",
            "cs:33:RR=2",
            "cs:33:EM=1.000",
            "cs:33:RO:FW=1.2.3",
            "cs:33:RO:MV_HEADER=TA,TO_[768]",
            "cs:33:RO:MV_UNIT=DegC,DegC[768]",
            "cs:33:RO:MV_RES=100,50[768]",
        ]
    );
}

#[test]
fn test_write_config_refresh_rate() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut sink = MockSink::new();
    probe.write_config(THERMAL_SA, 1, "RR=5", &mut sink).unwrap();
    assert_eq!(sink.lines(), vec!["+cs:33:RR=OK [ee]"]);
    assert_eq!(bus.word_register(THERMAL_SA, registers::EE_REFRESH_RATE), 5);
}

#[test]
fn test_write_config_refresh_rate_out_of_bounds() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut sink = MockSink::new();
    probe.write_config(THERMAL_SA, 1, "RR=9", &mut sink).unwrap();
    assert_eq!(sink.lines(), vec!["+cs:33:RR=FAIL; outbound"]);
    // Setting unchanged.
    assert_eq!(bus.word_register(THERMAL_SA, registers::EE_REFRESH_RATE), 2);
}

#[test]
fn test_write_config_emissivity() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut sink = MockSink::new();
    probe
        .write_config(THERMAL_SA, 1, "EM=8192", &mut sink)
        .unwrap();
    assert_eq!(sink.lines(), vec!["+cs:33:EM=OK [ee]"]);
    assert_eq!(bus.word_register(THERMAL_SA, registers::EE_EMISSIVITY), 8192);
}

#[test]
fn test_write_config_unknown_variable() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut sink = MockSink::new();
    probe.write_config(THERMAL_SA, 1, "XX=1", &mut sink).unwrap();
    assert_eq!(sink.lines(), vec!["+cs:33:FAIL; unknown variable"]);
}

#[test]
fn test_memory_read_layout_and_data() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);
    bus.load_words(THERMAL_SA, 0x0500, &[10, 20, 30]);

    let mut out = vec![0u16; 3];
    let layout = probe.memory_read(THERMAL_SA, 0x0500, &mut out).unwrap();
    assert_eq!(layout, MemoryLayout::WORD);
    assert_eq!(layout.bits_per_address, 16);
    assert_eq!(layout.address_increments, 1);
    assert_eq!(out, vec![10, 20, 30]);
}

#[test]
fn test_memory_read_out_of_range() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let mut out = vec![0u16; 4];
    let start = (registers::SPACE_WORDS - 2) as u16;
    assert_eq!(
        probe.memory_read(THERMAL_SA, start, &mut out),
        Err(Error::OutOfRange)
    );
}

#[test]
fn test_memory_write_round_trip() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    let layout = probe
        .memory_write(THERMAL_SA, 0x0500, &[0xaaaa, 0x5555])
        .unwrap();
    assert_eq!(layout, MemoryLayout::WORD);

    let mut out = vec![0u16; 2];
    probe.memory_read(THERMAL_SA, 0x0500, &mut out).unwrap();
    assert_eq!(out, vec![0xaaaa, 0x5555]);
}

#[test]
fn test_probe_device_identity() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, THERMAL_SA);

    assert_eq!(probe.probe_device(THERMAL_SA), Ok(true));
    // A silent address reads as blank identity.
    assert_eq!(probe.probe_device(0x44), Ok(false));
    // Probing never allocates a handle.
    assert_eq!(probe.pool().occupied(), 0);
}

#[test]
fn test_probe_device_not_answering() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    bus.set_ack_code(AckCode::ADDRESS_NACK);
    assert_eq!(probe.probe_device(THERMAL_SA), Ok(false));
}

#[test]
fn test_pool_exhaustion_is_user_visible() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, 0x33);
    setup_thermal_device(&bus, 0x34);
    setup_thermal_device(&bus, 0x35);

    let mut out = vec![0u16; registers::FRAME_WORDS];
    probe.raw_values(0x33, &mut out).unwrap();
    probe.raw_values(0x34, &mut out).unwrap();

    let error = probe.raw_values(0x35, &mut out).unwrap_err();
    assert_eq!(error, Error::PoolExhausted);
    assert_eq!(
        error.message(),
        "No free handle; recompile firmware with a larger device pool"
    );
}

#[test]
fn test_tear_down_frees_slot() {
    let (mut probe, bus, _storage, _clock) = create_probe();
    setup_thermal_device(&bus, 0x33);
    setup_thermal_device(&bus, 0x34);
    setup_thermal_device(&bus, 0x35);

    let mut out = vec![0u16; registers::FRAME_WORDS];
    probe.raw_values(0x33, &mut out).unwrap();
    probe.raw_values(0x34, &mut out).unwrap();
    assert!(probe.raw_values(0x35, &mut out).is_err());

    probe.tear_down(0x33);
    probe.raw_values(0x35, &mut out).unwrap();
    assert_eq!(probe.pool().occupied(), 2);
}
