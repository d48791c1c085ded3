//! Side-band bus adapters
//!
//! The interpreter talks to every bus through [`CommandBus`]. Per-bus wire
//! conventions stay inside the implementations:
//!
//! - [`I2cBus`]: the first two payload bytes are swapped (programs are
//!   written as "register, value"), a failed transfer is retried once after
//!   10 ms.
//! - [`MipiBus`]: DCS vs generic packets by the step's generic flag, one
//!   retry on a protocol error report during reads.
//! - [`SpiBus`]: byte-framed writes go out immediately, 9-bit framed writes
//!   accumulate in the [`BitPacker`] until a flush.
//!
//! The packer and the delay provider are passed into every call rather than
//! owned by the adapters, so one packer serves whichever bus runs.

use embedded_hal::i2c::Error as _;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::SpiDevice;
use platform::dsi::{self, DsiDevice, Error as _};
use platform::{I2cConfig, NoDevice, SpiConfig};

use crate::bitpack::{BitPacker, NINE_BIT_WIDTH, SCRATCH_BITS, SCRATCH_LEN};
use crate::error::{BusError, BusKind, PanelError};

/// Pause before the single I²C retry.
pub const I2C_RETRY_DELAY_MS: u32 = 10;

/// One side-band bus as seen by the interpreter
pub trait CommandBus {
    /// Which bus this is.
    fn kind(&self) -> BusKind;

    /// Called once before the first step of every program.
    fn begin_program(&mut self) {}

    /// Send `payload`. `generic` selects MIPI generic packets and is
    /// ignored elsewhere.
    async fn write<D: DelayNs>(
        &mut self,
        packer: &mut BitPacker,
        delay: &mut D,
        payload: &[u8],
        generic: bool,
    ) -> Result<(), PanelError>;

    /// Send `cmd` and fill `out` from the reply.
    async fn read<D: DelayNs>(
        &mut self,
        packer: &mut BitPacker,
        delay: &mut D,
        cmd: &[u8],
        out: &mut [u8],
        generic: bool,
    ) -> Result<(), PanelError>;

    /// Bound the size of read replies. Only meaningful on MIPI.
    async fn set_max_return_packet_size(&mut self, _size: u8) -> Result<(), PanelError> {
        Ok(())
    }

    /// Put everything still held in `packer` on the wire.
    async fn flush(&mut self, _packer: &mut BitPacker) -> Result<(), PanelError> {
        Ok(())
    }
}

// ── I²C ─────────────────────────────────────────────────────────────────────

/// I²C adapter for bridge ICs and other register-mapped controllers
#[derive(Debug)]
pub struct I2cBus<I2C> {
    i2c: I2C,
    config: I2cConfig,
}

impl<I2C: I2c> I2cBus<I2C> {
    /// Wrap an I²C master talking to the device in `config`.
    pub fn new(i2c: I2C, config: I2cConfig) -> Self {
        Self { i2c, config }
    }

    /// Configured device.
    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// Give the I²C master back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Copy `payload` into `buf` with bytes 0 and 1 exchanged.
///
/// Returns the wire bytes, or [`PanelError::Overflow`] if the payload does not
/// fit the scratch buffer.
pub fn swap_register_order<'b>(payload: &[u8], buf: &'b mut [u8; SCRATCH_LEN]) -> Result<&'b [u8], PanelError> {
    let wire = buf.get_mut(..payload.len()).ok_or(PanelError::Overflow)?;
    wire.copy_from_slice(payload);
    if wire.len() >= 2 {
        wire.swap(0, 1);
    }
    Ok(wire)
}

impl<I2C: I2c> CommandBus for I2cBus<I2C> {
    fn kind(&self) -> BusKind {
        BusKind::I2c
    }

    async fn write<D: DelayNs>(
        &mut self,
        _packer: &mut BitPacker,
        delay: &mut D,
        payload: &[u8],
        _generic: bool,
    ) -> Result<(), PanelError> {
        let mut buf = [0u8; SCRATCH_LEN];
        let wire = swap_register_order(payload, &mut buf)?;
        let address = self.config.address;
        trace!("i2c write @0x{:x}: {:?}", address, wire);
        if let Err(err) = self.i2c.write(address, wire).await {
            warn!("i2c write @0x{:x} failed ({:?}), retrying", address, err.kind());
            delay.delay_ms(I2C_RETRY_DELAY_MS).await;
            self.i2c.write(address, wire).await.map_err(|e| BusError::i2c(&e))?;
        }
        Ok(())
    }

    async fn read<D: DelayNs>(
        &mut self,
        _packer: &mut BitPacker,
        delay: &mut D,
        cmd: &[u8],
        out: &mut [u8],
        _generic: bool,
    ) -> Result<(), PanelError> {
        if out.len() > SCRATCH_LEN {
            return Err(PanelError::Overflow);
        }
        let mut buf = [0u8; SCRATCH_LEN];
        let wire = swap_register_order(cmd, &mut buf)?;
        let address = self.config.address;
        if let Err(err) = self.i2c.write_read(address, wire, out).await {
            warn!("i2c read @0x{:x} failed ({:?}), retrying", address, err.kind());
            delay.delay_ms(I2C_RETRY_DELAY_MS).await;
            self.i2c
                .write_read(address, wire, out)
                .await
                .map_err(|e| BusError::i2c(&e))?;
        }
        trace!("i2c read @0x{:x}: {:?} -> {:?}", address, wire, out);
        Ok(())
    }
}

// ── MIPI-DSI ────────────────────────────────────────────────────────────────

/// MIPI-DSI command channel adapter
#[derive(Debug)]
pub struct MipiBus<DSI> {
    dsi: DSI,
}

impl<DSI: DsiDevice> MipiBus<DSI> {
    /// Wrap a DSI peripheral.
    pub fn new(dsi: DSI) -> Self {
        Self { dsi }
    }

    /// Give the DSI peripheral back.
    pub fn release(self) -> DSI {
        self.dsi
    }

    async fn read_once(&mut self, cmd: &[u8], out: &mut [u8], generic: bool) -> Result<(), DSI::Error> {
        if generic {
            self.dsi.generic_read(cmd.get(..2).unwrap_or(cmd), out).await
        } else {
            let command = cmd.first().copied().unwrap_or_default();
            self.dsi.dcs_read(command, out).await
        }
    }
}

impl<DSI: DsiDevice> CommandBus for MipiBus<DSI> {
    fn kind(&self) -> BusKind {
        BusKind::Mipi
    }

    fn begin_program(&mut self) {
        self.dsi.set_low_power_mode(true);
    }

    async fn write<D: DelayNs>(
        &mut self,
        _packer: &mut BitPacker,
        _delay: &mut D,
        payload: &[u8],
        generic: bool,
    ) -> Result<(), PanelError> {
        trace!("dsi {} write: {:?}", if generic { "generic" } else { "dcs" }, payload);
        let result = if generic {
            self.dsi.generic_write(payload).await
        } else {
            self.dsi.dcs_write(payload).await
        };
        result.map_err(|e| BusError::dsi(&e).into())
    }

    async fn read<D: DelayNs>(
        &mut self,
        _packer: &mut BitPacker,
        _delay: &mut D,
        cmd: &[u8],
        out: &mut [u8],
        generic: bool,
    ) -> Result<(), PanelError> {
        match self.read_once(cmd, out, generic).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == dsi::ErrorKind::Protocol => {
                // A report left pending before the turnaround; read again.
                debug!("dsi read {:?}: protocol error report, retrying", cmd);
                match self.read_once(cmd, out, generic).await {
                    Err(err) if err.kind() != dsi::ErrorKind::Protocol => Err(BusError::dsi(&err).into()),
                    _ => Ok(()),
                }
            }
            Err(err) => Err(BusError::dsi(&err).into()),
        }
    }

    async fn set_max_return_packet_size(&mut self, size: u8) -> Result<(), PanelError> {
        trace!("dsi max return packet size {}", size);
        self.dsi
            .set_maximum_return_packet_size(u16::from(size))
            .await
            .map_err(|e| BusError::dsi(&e).into())
    }
}

// ── SPI ─────────────────────────────────────────────────────────────────────

/// SPI adapter, byte or 9-bit framed
#[derive(Debug)]
pub struct SpiBus<SPI> {
    spi: SPI,
    config: SpiConfig,
}

impl<SPI: SpiDevice> SpiBus<SPI> {
    /// Wrap an SPI device. The device owns chip-select and clock setup;
    /// `config.max_frequency` is reported, not applied.
    pub fn new(spi: SPI, config: SpiConfig) -> Self {
        Self { spi, config }
    }

    /// Configured framing and clock.
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Give the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }

    async fn transfer(&mut self, packer: &mut BitPacker, start: usize, out: &mut [u8]) -> Result<(), PanelError> {
        let (tx, rx) = packer.duplex();
        trace!("spi transfer: {:?}", tx);
        let result = self
            .spi
            .transfer(rx, tx)
            .await
            .map_err(|e| PanelError::from(BusError::spi(&e)))
            .and_then(|()| packer.extract(start, out));
        packer.reset();
        result
    }
}

impl<SPI: SpiDevice> CommandBus for SpiBus<SPI> {
    fn kind(&self) -> BusKind {
        BusKind::Spi
    }

    async fn write<D: DelayNs>(
        &mut self,
        packer: &mut BitPacker,
        _delay: &mut D,
        payload: &[u8],
        _generic: bool,
    ) -> Result<(), PanelError> {
        if !self.config.nine_bit {
            if payload.len() > SCRATCH_LEN {
                return Err(PanelError::Overflow);
            }
            packer.reset();
            packer.store_bytes(payload)?;
            return self.flush(packer).await;
        }
        let bits = payload.len().saturating_mul(NINE_BIT_WIDTH);
        if !packer.has_room(bits) {
            self.flush(packer).await?;
            if bits > SCRATCH_BITS {
                error!("spi: {} bytes do not fit one 9-bit frame", payload.len());
                return Err(PanelError::Overflow);
            }
        }
        packer.store_9bit(payload)
    }

    async fn read<D: DelayNs>(
        &mut self,
        packer: &mut BitPacker,
        _delay: &mut D,
        cmd: &[u8],
        out: &mut [u8],
        _generic: bool,
    ) -> Result<(), PanelError> {
        if self.config.nine_bit {
            self.flush(packer).await?;
            packer.store_9bit(cmd)?;
        } else {
            packer.reset();
            packer.store_bytes(cmd)?;
        }
        let start = packer.cursor();
        if let Err(err) = packer.store_high(out.len().saturating_mul(8)) {
            packer.reset();
            return Err(err);
        }
        self.transfer(packer, start, out).await
    }

    async fn flush(&mut self, packer: &mut BitPacker) -> Result<(), PanelError> {
        if packer.is_empty() {
            return Ok(());
        }
        let frame = packer.frame();
        trace!("spi write: {:?}", frame);
        let result = self.spi.write(frame).await.map_err(|e| BusError::spi(&e));
        packer.reset();
        Ok(result?)
    }
}

// ── Adapter sets ────────────────────────────────────────────────────────────

/// Raw side-band devices handed over by the host
///
/// Start from [`Adapters::none`] and add what the panel is wired to:
///
/// ```
/// use panel::Adapters;
/// use platform::NoDevice;
///
/// let adapters = Adapters::none().with_dsi(NoDevice);
/// assert!(adapters.dsi.is_some());
/// assert!(adapters.i2c.is_none());
/// ```
#[derive(Debug)]
pub struct Adapters<DSI, I2C, SPI> {
    /// DSI peripheral
    pub dsi: Option<DSI>,
    /// I²C master
    pub i2c: Option<I2C>,
    /// SPI device
    pub spi: Option<SPI>,
}

impl Adapters<NoDevice, NoDevice, NoDevice> {
    /// No side-band bus at all.
    pub const fn none() -> Self {
        Self {
            dsi: None,
            i2c: None,
            spi: None,
        }
    }
}

impl<DSI, I2C, SPI> Adapters<DSI, I2C, SPI> {
    /// Attach a DSI peripheral.
    pub fn with_dsi<T>(self, dsi: T) -> Adapters<T, I2C, SPI> {
        Adapters {
            dsi: Some(dsi),
            i2c: self.i2c,
            spi: self.spi,
        }
    }

    /// Attach an I²C master.
    pub fn with_i2c<T>(self, i2c: T) -> Adapters<DSI, T, SPI> {
        Adapters {
            dsi: self.dsi,
            i2c: Some(i2c),
            spi: self.spi,
        }
    }

    /// Attach an SPI device.
    pub fn with_spi<T>(self, spi: T) -> Adapters<DSI, I2C, T> {
        Adapters {
            dsi: self.dsi,
            i2c: self.i2c,
            spi: Some(spi),
        }
    }
}

/// The buses a panel runs programs on
///
/// A bus that is `None` is skipped: its programs never run.
#[derive(Debug)]
pub struct Buses<DSI, I2C, SPI> {
    /// Runs first
    pub i2c: Option<I2cBus<I2C>>,
    /// Runs second
    pub mipi: Option<MipiBus<DSI>>,
    /// Runs last
    pub spi: Option<SpiBus<SPI>>,
}

impl<DSI: DsiDevice, I2C: I2c, SPI: SpiDevice> Buses<DSI, I2C, SPI> {
    /// Wrap the adapters.
    ///
    /// An I²C or SPI adapter needs its configuration; if one is missing the
    /// adapters are handed back untouched. A configuration without its
    /// adapter is ignored here (the bus stays `None`).
    pub fn new(
        adapters: Adapters<DSI, I2C, SPI>,
        i2c: Option<I2cConfig>,
        spi: Option<SpiConfig>,
    ) -> Result<Self, Adapters<DSI, I2C, SPI>> {
        if (adapters.i2c.is_some() && i2c.is_none()) || (adapters.spi.is_some() && spi.is_none()) {
            return Err(adapters);
        }
        if let (Some(_), Some(cfg)) = (&adapters.i2c, i2c) {
            debug!("i2c bus @0x{:x}, max {} Hz", cfg.address, cfg.max_frequency);
        }
        if let (Some(_), Some(cfg)) = (&adapters.spi, spi) {
            debug!("spi bus, {}-bit words, max {} Hz", if cfg.nine_bit { 9 } else { 8 }, cfg.max_frequency);
        }
        Ok(Self {
            i2c: adapters.i2c.zip(i2c).map(|(dev, cfg)| I2cBus::new(dev, cfg)),
            mipi: adapters.dsi.map(MipiBus::new),
            spi: adapters.spi.zip(spi).map(|(dev, cfg)| SpiBus::new(dev, cfg)),
        })
    }

    /// Give the raw devices back.
    pub fn release(self) -> Adapters<DSI, I2C, SPI> {
        Adapters {
            dsi: self.mipi.map(MipiBus::release),
            i2c: self.i2c.map(I2cBus::release),
            spi: self.spi.map(SpiBus::release),
        }
    }
}
