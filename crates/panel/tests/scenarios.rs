//! End-to-end program runs against recorded buses.
//!
//! Each test feeds one hand-encoded program through `run_program` and checks
//! the exact traffic that reached the bus.
//!
//! Run with: cargo test -p panel --test scenarios
//! Step traffic: RUST_LOG=trace cargo test -p panel --features tracing --test scenarios -- --nocapture

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use panel::opcode::{S_DCS_BUF, S_DCS_LENGTH, S_DCS_READ2, S_DELAY, S_HACTIVE, S_IF_4_LANES};
use panel::{run_program, BitPacker, ErrorCode, ExecContext, I2cBus, MipiBus, PanelError, Program, SpiBus};
use panel_specs::VideoTiming;
use platform::mocks::{DsiReply, Event, Journal, MockDelay, MockDsi, MockI2c, MockSpi};
use platform::{I2cConfig, SpiConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 1920×1200 mode; HACTIVE = 0x0780.
const MODE: VideoTiming = VideoTiming::from_porches(154_000, [1920, 48, 32, 80], [1200, 3, 6, 26], 60);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ctx(lanes: u8) -> ExecContext<'static> {
    ExecContext { timing: &MODE, lanes }
}

async fn run_mipi(bytes: &[u8], lanes: u8, dsi: MockDsi, journal: &Journal) -> Result<(), PanelError> {
    init_logging();
    let mut bus = MipiBus::new(dsi);
    let mut packer = BitPacker::new();
    let mut delay = MockDelay::new(journal);
    run_program(&mut bus, &mut packer, &mut delay, Program::new(bytes), &ctx(lanes)).await
}

fn dcs(bytes: &[u8]) -> Event {
    Event::DcsWrite(bytes.to_vec())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn minimal_init_over_dcs() {
    let journal = Journal::new();
    let program = [0x02, 0x11, 0x00, S_DELAY, 120, 0x01, 0x29];

    run_mipi(&program, 4, MockDsi::new(&journal), &journal).await.unwrap();

    assert_eq!(
        journal.events(),
        [
            Event::LowPowerMode(true),
            dcs(&[0x11, 0x00]),
            Event::DelayMs(120),
            dcs(&[0x29]),
        ]
    );
}

#[tokio::test]
async fn nine_bit_spi_init_is_one_transfer() {
    init_logging();
    // 0 10110000 | 0 10110001 1 00000000 | 11111
    let expectations = [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(vec![0x58, 0x2C, 0x60, 0x1F]),
        SpiTransaction::transaction_end(),
    ];
    let mut spi = SpiMock::new(&expectations);
    let journal = Journal::new();
    let mut bus = SpiBus::new(spi.clone(), SpiConfig::nine_bit(1_000_000));
    let mut packer = BitPacker::new();
    let mut delay = MockDelay::new(&journal);

    let program = [0x01, 0xB0, 0x02, 0xB1, 0x00];
    run_program(&mut bus, &mut packer, &mut delay, Program::new(&program), &ctx(4))
        .await
        .unwrap();

    assert!(packer.is_empty());
    spi.done();
}

#[tokio::test]
async fn read_and_match_succeeds() {
    let journal = Journal::new();
    let mut dsi = MockDsi::new(&journal);
    dsi.push_reply(DsiReply::ok(&[0x85, 0x22]));

    let program = [S_DCS_READ2, 0x04, 0x85, 0x22];
    run_mipi(&program, 4, dsi, &journal).await.unwrap();

    assert_eq!(journal.traffic()[1], Event::DcsRead { cmd: 0x04, len: 2 });
}

#[tokio::test]
async fn read_mismatch_continues_then_fails() {
    let journal = Journal::new();
    let mut dsi = MockDsi::new(&journal);
    dsi.push_reply(DsiReply::ok(&[0x85, 0x23]));

    let program = [S_DCS_READ2, 0x04, 0x85, 0x22, 0x01, 0x29];
    let err = run_mipi(&program, 4, dsi, &journal).await.unwrap_err();

    assert_eq!(err, PanelError::Mismatch);
    assert_eq!(err.code(), ErrorCode::Mismatch);
    // The step after the mismatched read still ran.
    assert_eq!(journal.traffic().last(), Some(&dcs(&[0x29])));
}

#[tokio::test]
async fn lane_filter_skips_one_step() {
    let program = [S_IF_4_LANES, 0x02, 0xAA, 0x01, 0x02, 0xBB, 0x02];

    let journal = Journal::new();
    run_mipi(&program, 2, MockDsi::new(&journal), &journal).await.unwrap();
    assert_eq!(journal.traffic(), [Event::LowPowerMode(true), dcs(&[0xBB, 0x02])]);

    let journal = Journal::new();
    run_mipi(&program, 4, MockDsi::new(&journal), &journal).await.unwrap();
    assert_eq!(
        journal.traffic(),
        [Event::LowPowerMode(true), dcs(&[0xAA, 0x01]), dcs(&[0xBB, 0x02])]
    );
}

#[tokio::test]
async fn hactive_substitution_is_little_endian() {
    let journal = Journal::new();
    let program = [S_HACTIVE, 0, 16, 0, S_DCS_BUF, 2];

    run_mipi(&program, 4, MockDsi::new(&journal), &journal).await.unwrap();

    assert_eq!(journal.traffic()[1], dcs(&[0x80, 0x07]));
}

#[tokio::test]
async fn nine_bit_overflow_emits_nothing_past_last_flush() {
    init_logging();
    let journal = Journal::new();
    let mut bus = SpiBus::new(MockSpi::new(&journal), SpiConfig::nine_bit(1_000_000));
    let mut packer = BitPacker::new();
    let mut delay = MockDelay::new(&journal);

    // One short command, then 60 bytes (540 bits) in a single step.
    let mut program = vec![0x01, 0xAA, S_DCS_LENGTH, 60];
    program.extend(core::iter::repeat(0x5A).take(60));
    program.extend([0x01, 0x29]);

    let err = run_program(&mut bus, &mut packer, &mut delay, Program::new(&program), &ctx(4))
        .await
        .unwrap_err();

    assert_eq!(err, PanelError::Overflow);
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    // Only the pending command went out: 0 10101010 + 1-padding.
    assert_eq!(journal.events(), [Event::SpiWrite(vec![0x55, 0x7F])]);
    assert!(packer.is_empty());
}

// ---------------------------------------------------------------------------
// Bus conventions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn i2c_program_swaps_register_pair() {
    init_logging();
    let journal = Journal::new();
    let mut bus = I2cBus::new(MockI2c::new(&journal), I2cConfig::new(0x2c));
    let mut packer = BitPacker::new();
    let mut delay = MockDelay::new(&journal);

    // "register 0x0d, value 0x01", then a three-byte burst and a single byte.
    let program = [0x02, 0x0d, 0x01, 0x03, 0x10, 0x20, 0x30, 0x01, 0x42];
    run_program(&mut bus, &mut packer, &mut delay, Program::new(&program), &ctx(4))
        .await
        .unwrap();

    let writes: Vec<_> = journal
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::I2cWrite { address, data } => Some((address, data)),
            _ => None,
        })
        .collect();
    let expected: [(u8, Vec<u8>); 3] = [
        (0x2c, vec![0x01, 0x0d]),
        (0x2c, vec![0x20, 0x10, 0x30]),
        (0x2c, vec![0x42]),
    ];
    assert_eq!(writes, expected);
}

#[tokio::test]
async fn spi_delay_flushes_before_sleeping() {
    init_logging();
    let journal = Journal::new();
    let mut bus = SpiBus::new(MockSpi::new(&journal), SpiConfig::nine_bit(1_000_000));
    let mut packer = BitPacker::new();
    let mut delay = MockDelay::new(&journal);

    let program = [0x01, 0x11, S_DELAY, 5, 0x01, 0x29];
    run_program(&mut bus, &mut packer, &mut delay, Program::new(&program), &ctx(4))
        .await
        .unwrap();

    let events = journal.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Event::SpiWrite(_)));
    assert_eq!(events[1], Event::DelayMs(5));
    assert!(matches!(events[2], Event::SpiWrite(_)));
}

#[tokio::test]
async fn mipi_read_accepts_bytes_after_second_protocol_error() {
    use platform::dsi::ErrorKind;

    let journal = Journal::new();
    let mut dsi = MockDsi::new(&journal);
    dsi.push_reply(DsiReply::with_error(&[0x00], ErrorKind::Protocol));
    dsi.push_reply(DsiReply::with_error(&[0x9c], ErrorKind::Protocol));

    let program = [0x40, 0x0a, 0x9c];
    run_mipi(&program, 4, dsi, &journal).await.unwrap();

    let reads = journal
        .events()
        .iter()
        .filter(|e| matches!(e, Event::DcsRead { .. }))
        .count();
    assert_eq!(reads, 2);
}
