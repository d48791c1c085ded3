//! Mock implementations for testing
//!
//! Every mock appends to a shared [`Journal`], so a test can assert the
//! interleaving of traffic across buses, GPIOs, the regulator, the backlight
//! and delays, not just the traffic on one device.
//!
//! Exact per-bus transaction checks are better served by `embedded-hal-mock`;
//! these mocks exist for cross-device ordering and for DSI, which
//! `embedded-hal-mock` does not cover.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital;
use embedded_hal::i2c;
use embedded_hal::spi;

use crate::dsi::{self, ErrorKind};
use crate::power::{Backlight, Regulator};

/// One observable action on a mocked collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// DSI DCS write
    DcsWrite(Vec<u8>),
    /// DSI generic write
    GenericWrite(Vec<u8>),
    /// DSI DCS read of `len` bytes
    DcsRead {
        /// DCS command byte
        cmd: u8,
        /// Bytes requested
        len: usize,
    },
    /// DSI generic read of `len` bytes
    GenericRead {
        /// Request parameters
        params: Vec<u8>,
        /// Bytes requested
        len: usize,
    },
    /// DSI maximum return packet size
    MaxReturnPacketSize(u16),
    /// DSI low-power command mode switch
    LowPowerMode(bool),
    /// I2C write
    I2cWrite {
        /// 7-bit address
        address: u8,
        /// Bytes on the wire
        data: Vec<u8>,
    },
    /// I2C write followed by a repeated-start read
    I2cWriteRead {
        /// 7-bit address
        address: u8,
        /// Bytes written
        write: Vec<u8>,
        /// Bytes read back
        read_len: usize,
    },
    /// SPI write (incoming bytes discarded)
    SpiWrite(Vec<u8>),
    /// SPI full-duplex transfer
    SpiTransfer(Vec<u8>),
    /// Millisecond delay
    DelayMs(u32),
    /// Sub-millisecond delay, in nanoseconds
    DelayNs(u64),
    /// Regulator on (`true`) or off (`false`)
    Regulator(bool),
    /// Backlight blank (`true`) or unblank (`false`)
    Backlight(bool),
    /// GPIO level change
    Pin {
        /// Pin name given at construction
        name: &'static str,
        /// New level
        high: bool,
    },
}

/// Shared, append-only record of [`Event`]s.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Events excluding delays, for tests that only care about traffic order
    pub fn traffic(&self) -> Vec<Event> {
        self.0
            .borrow()
            .iter()
            .filter(|e| !matches!(e, Event::DelayMs(_) | Event::DelayNs(_)))
            .cloned()
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Error reported by the I2C and SPI mocks when a failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

impl i2c::Error for MockBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl spi::Error for MockBusError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// Scripted reply to one DSI read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsiReply {
    /// Bytes copied into the caller's buffer (truncated or zero-extended)
    pub data: Vec<u8>,
    /// Error reported after the bytes were delivered
    pub error: Option<ErrorKind>,
}

impl DsiReply {
    /// A clean reply
    pub fn ok(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            error: None,
        }
    }

    /// A reply whose bytes arrive together with an error report
    pub fn with_error(data: &[u8], error: ErrorKind) -> Self {
        Self {
            data: data.to_vec(),
            error: Some(error),
        }
    }
}

fn fill(buf: &mut [u8], data: &[u8]) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b = data.get(i).copied().unwrap_or(0);
    }
}

/// Mock DSI peripheral
pub struct MockDsi {
    journal: Journal,
    replies: VecDeque<DsiReply>,
    write_errors: VecDeque<ErrorKind>,
    low_power: bool,
}

impl MockDsi {
    /// Create a DSI mock recording into `journal`
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            replies: VecDeque::new(),
            write_errors: VecDeque::new(),
            low_power: false,
        }
    }

    /// Queue the reply for the next read; unscripted reads return zeros
    pub fn push_reply(&mut self, reply: DsiReply) {
        self.replies.push_back(reply);
    }

    /// Make the next write fail with `kind`
    pub fn fail_next_write(&mut self, kind: ErrorKind) {
        self.write_errors.push_back(kind);
    }

    /// Whether low-power command mode is selected
    pub fn low_power(&self) -> bool {
        self.low_power
    }

    fn write_result(&mut self) -> Result<(), ErrorKind> {
        match self.write_errors.pop_front() {
            Some(kind) => Err(kind),
            None => Ok(()),
        }
    }

    fn reply(&mut self, buf: &mut [u8]) -> Result<(), ErrorKind> {
        match self.replies.pop_front() {
            Some(reply) => {
                fill(buf, &reply.data);
                reply.error.map_or(Ok(()), Err)
            }
            None => {
                fill(buf, &[]);
                Ok(())
            }
        }
    }
}

impl dsi::ErrorType for MockDsi {
    type Error = ErrorKind;
}

impl dsi::DsiDevice for MockDsi {
    async fn dcs_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.journal.push(Event::DcsWrite(data.to_vec()));
        self.write_result()
    }

    async fn generic_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.journal.push(Event::GenericWrite(data.to_vec()));
        self.write_result()
    }

    async fn dcs_read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.journal.push(Event::DcsRead {
            cmd,
            len: buf.len(),
        });
        self.reply(buf)
    }

    async fn generic_read(&mut self, params: &[u8], buf: &mut [u8]) -> Result<(), Self::Error> {
        self.journal.push(Event::GenericRead {
            params: params.to_vec(),
            len: buf.len(),
        });
        self.reply(buf)
    }

    async fn set_maximum_return_packet_size(&mut self, size: u16) -> Result<(), Self::Error> {
        self.journal.push(Event::MaxReturnPacketSize(size));
        Ok(())
    }

    fn set_low_power_mode(&mut self, enabled: bool) {
        self.low_power = enabled;
        self.journal.push(Event::LowPowerMode(enabled));
    }
}

/// Mock I2C master
pub struct MockI2c {
    journal: Journal,
    replies: VecDeque<Vec<u8>>,
    failures: usize,
}

impl MockI2c {
    /// Create an I2C mock recording into `journal`
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            replies: VecDeque::new(),
            failures: 0,
        }
    }

    /// Queue the bytes returned by the next read phase
    pub fn push_reply(&mut self, data: &[u8]) {
        self.replies.push_back(data.to_vec());
    }

    /// Fail the next `count` transactions (they are still recorded)
    pub fn fail_next(&mut self, count: usize) {
        self.failures = count;
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = MockBusError;
}

impl embedded_hal_async::i2c::I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut written: Option<Vec<u8>> = None;
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(data) => {
                    written = Some(data.to_vec());
                }
                i2c::Operation::Read(buf) => {
                    let reply = self.replies.pop_front().unwrap_or_default();
                    fill(buf, &reply);
                    self.journal.push(Event::I2cWriteRead {
                        address,
                        write: written.take().unwrap_or_default(),
                        read_len: buf.len(),
                    });
                }
            }
        }
        if let Some(data) = written {
            self.journal.push(Event::I2cWrite { address, data });
        }
        if self.failures > 0 {
            self.failures = self.failures.saturating_sub(1);
            return Err(MockBusError);
        }
        Ok(())
    }
}

/// Mock SPI device (chip select handled per transaction)
pub struct MockSpi {
    journal: Journal,
    replies: VecDeque<Vec<u8>>,
    failures: usize,
}

impl MockSpi {
    /// Create an SPI mock recording into `journal`
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            replies: VecDeque::new(),
            failures: 0,
        }
    }

    /// Queue the bytes clocked in during the next full-duplex transfer
    pub fn push_reply(&mut self, data: &[u8]) {
        self.replies.push_back(data.to_vec());
    }

    /// Fail the next `count` transactions (they are still recorded)
    pub fn fail_next(&mut self, count: usize) {
        self.failures = count;
    }
}

impl spi::ErrorType for MockSpi {
    type Error = MockBusError;
}

impl embedded_hal_async::spi::SpiDevice for MockSpi {
    async fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            match op {
                spi::Operation::Write(data) => {
                    self.journal.push(Event::SpiWrite(data.to_vec()));
                }
                spi::Operation::Transfer(read, write) => {
                    self.journal.push(Event::SpiTransfer(write.to_vec()));
                    let reply = self.replies.pop_front().unwrap_or_default();
                    fill(read, &reply);
                }
                spi::Operation::TransferInPlace(buf) => {
                    self.journal.push(Event::SpiTransfer(buf.to_vec()));
                    let reply = self.replies.pop_front().unwrap_or_default();
                    fill(buf, &reply);
                }
                spi::Operation::Read(buf) => {
                    let reply = self.replies.pop_front().unwrap_or_default();
                    fill(buf, &reply);
                }
                spi::Operation::DelayNs(ns) => {
                    self.journal.push(Event::DelayNs(u64::from(*ns)));
                }
            }
        }
        if self.failures > 0 {
            self.failures = self.failures.saturating_sub(1);
            return Err(MockBusError);
        }
        Ok(())
    }
}

/// Mock delay that records instead of sleeping
#[derive(Clone)]
pub struct MockDelay {
    journal: Journal,
}

impl MockDelay {
    /// Create a delay mock recording into `journal`
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.journal.push(Event::DelayNs(u64::from(ns)));
    }

    async fn delay_us(&mut self, us: u32) {
        self.journal.push(Event::DelayNs(u64::from(us).saturating_mul(1_000)));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.journal.push(Event::DelayMs(ms));
    }
}

/// Mock GPIO output
pub struct MockPin {
    name: &'static str,
    journal: Journal,
}

impl MockPin {
    /// Create a named pin mock recording into `journal`
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
        }
    }
}

impl digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.journal.push(Event::Pin {
            name: self.name,
            high: false,
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.journal.push(Event::Pin {
            name: self.name,
            high: true,
        });
        Ok(())
    }
}

/// Mock supply regulator
pub struct MockRegulator {
    journal: Journal,
    fail_enable: bool,
    enabled: bool,
}

impl MockRegulator {
    /// Create a regulator mock recording into `journal`
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_enable: false,
            enabled: false,
        }
    }

    /// Make every `enable` fail
    pub fn fail_enable(&mut self) {
        self.fail_enable = true;
    }

    /// Current supply state
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Regulator for MockRegulator {
    type Error = MockBusError;

    async fn enable(&mut self) -> Result<(), Self::Error> {
        if self.fail_enable {
            return Err(MockBusError);
        }
        self.enabled = true;
        self.journal.push(Event::Regulator(true));
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), Self::Error> {
        self.enabled = false;
        self.journal.push(Event::Regulator(false));
        Ok(())
    }
}

/// Mock backlight
pub struct MockBacklight {
    journal: Journal,
    blanked: bool,
}

impl MockBacklight {
    /// Create a backlight mock recording into `journal`; starts blanked
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            blanked: true,
        }
    }

    /// Whether the backlight is currently blanked
    pub fn is_blanked(&self) -> bool {
        self.blanked
    }
}

impl Backlight for MockBacklight {
    type Error = core::convert::Infallible;

    fn set_blank(&mut self, blank: bool) -> Result<(), Self::Error> {
        self.blanked = blank;
        self.journal.push(Event::Backlight(blank));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dsi::DsiDevice;
    use embedded_hal_async::delay::DelayNs;
    use embedded_hal_async::i2c::I2c;
    use embedded_hal_async::spi::SpiDevice;

    #[tokio::test]
    async fn test_mock_dsi_scripted_reads() {
        let journal = Journal::new();
        let mut dsi = MockDsi::new(&journal);
        dsi.push_reply(DsiReply::ok(&[0x85, 0x22]));
        dsi.push_reply(DsiReply::with_error(&[0x01], ErrorKind::Protocol));

        let mut buf = [0u8; 2];
        dsi.dcs_read(0x04, &mut buf).await.unwrap();
        assert_eq!(buf, [0x85, 0x22]);

        let err = dsi.dcs_read(0x04, &mut buf).await.unwrap_err();
        assert_eq!(err, ErrorKind::Protocol);
        // Bytes are delivered even when an error is reported.
        assert_eq!(buf, [0x01, 0x00]);

        assert_eq!(
            journal.events(),
            [
                Event::DcsRead { cmd: 0x04, len: 2 },
                Event::DcsRead { cmd: 0x04, len: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_i2c_records_and_fails() {
        let journal = Journal::new();
        let mut i2c = MockI2c::new(&journal);
        i2c.fail_next(1);
        assert!(i2c.write(0x2C, &[0x01, 0x02]).await.is_err());
        assert!(i2c.write(0x2C, &[0x01, 0x02]).await.is_ok());

        i2c.push_reply(&[0x55]);
        let mut rx = [0u8; 1];
        i2c.write_read(0x2C, &[0x10], &mut rx).await.unwrap();
        assert_eq!(rx, [0x55]);

        assert_eq!(journal.events().len(), 3);
        assert_eq!(
            journal.events()[2],
            Event::I2cWriteRead {
                address: 0x2C,
                write: vec![0x10],
                read_len: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_mock_spi_transfer_reply() {
        let journal = Journal::new();
        let mut spi = MockSpi::new(&journal);
        spi.push_reply(&[0xFF, 0x12]);
        let mut rx = [0u8; 2];
        spi.transfer(&mut rx, &[0x0A, 0xFF]).await.unwrap();
        assert_eq!(rx, [0xFF, 0x12]);
        assert_eq!(journal.events(), [Event::SpiTransfer(vec![0x0A, 0xFF])]);
    }

    #[tokio::test]
    async fn test_journal_traffic_skips_delays() {
        let journal = Journal::new();
        let mut delay = MockDelay::new(&journal);
        let mut spi = MockSpi::new(&journal);
        delay.delay_ms(5).await;
        spi.write(&[0x01]).await.unwrap();
        assert_eq!(journal.events().len(), 2);
        assert_eq!(journal.traffic(), [Event::SpiWrite(vec![0x01])]);
    }
}
