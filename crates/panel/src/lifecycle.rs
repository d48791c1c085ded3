//! Panel lifecycle
//!
//! [`Panel`] owns everything bound to one panel and drives it through the
//! ordered power transitions. The host calls them in this order:
//!
//! | Transition | GPIOs / supply | Programs | Wait |
//! |---|---|---|---|
//! | [`power_up`](Panel::power_up) | power-enable ↑ | | `power_up` |
//! | [`prepare`](Panel::prepare) | supply on, prepare-enable ↑, reset ↓ | init | `prepare` (before init) |
//! | [`enable`](Panel::enable) | | enable | `enable`, then backlight on |
//! | [`disable`](Panel::disable) | backlight off | disable | `disable` (before disable) |
//! | [`unprepare`](Panel::unprepare) | reset ↑, prepare-enable ↓, supply off | | `unprepare` (first) |
//! | [`power_down`](Panel::power_down) | power-enable ↓ | | `power_down` (first) |
//!
//! GPIO levels are logical: "reset ↑" means reset asserted. Active-low
//! wiring is the pin implementation's business.
//!
//! `prepare` and `enable` roll back what they changed when they fail;
//! `disable` and `unprepare` log failures and still complete, so a panel is
//! never left half-on.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::SpiDevice;
use panel_specs::{DisplayTiming, PanelDesc, VideoTiming};
use platform::{Backlight, DsiDevice, NoDevice, Regulator};

use crate::bitpack::BitPacker;
use crate::bus::{Adapters, Buses};
use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::interpreter::{run_triple, ExecContext};
use crate::modes::{self, DisplayInfo, ModeInfo};
use crate::program::ProgramTriple;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The three optional control GPIOs
#[derive(Debug)]
pub struct ControlPins<P> {
    /// Switches the panel's logic supply
    pub power_enable: Option<P>,
    /// Held high while the panel is prepared
    pub prepare_enable: Option<P>,
    /// Panel reset (high = in reset)
    pub reset: Option<P>,
}

impl ControlPins<NoDevice> {
    /// No control GPIOs.
    pub const fn none() -> Self {
        Self {
            power_enable: None,
            prepare_enable: None,
            reset: None,
        }
    }
}

impl<P: OutputPin> ControlPins<P> {
    fn drive(pin: Option<&mut P>, high: bool) -> Result<(), PanelError> {
        match pin {
            Some(pin) => pin.set_state(PinState::from(high)).map_err(|_| PanelError::Gpio),
            None => Ok(()),
        }
    }

    fn set_power_enable(&mut self, high: bool) -> Result<(), PanelError> {
        Self::drive(self.power_enable.as_mut(), high)
    }

    fn set_prepare_enable(&mut self, high: bool) -> Result<(), PanelError> {
        Self::drive(self.prepare_enable.as_mut(), high)
    }

    fn set_reset(&mut self, high: bool) -> Result<(), PanelError> {
        Self::drive(self.reset.as_mut(), high)
    }

    /// Reset asserted, prepare-enable released. Failures are logged only.
    fn hold_in_reset(&mut self) {
        if self.set_reset(true).is_err() {
            warn!("could not assert reset");
        }
        if self.set_prepare_enable(false).is_err() {
            warn!("could not release prepare-enable");
        }
    }
}

/// Everything the host hands over at bind, and gets back at release
#[derive(Debug)]
pub struct PanelResources<DSI, I2C, SPI, P, REG, BL, D> {
    /// Side-band bus devices
    pub adapters: Adapters<DSI, I2C, SPI>,
    /// Control GPIOs
    pub pins: ControlPins<P>,
    /// Panel supply; use [`NoDevice`] for an always-on supply
    pub supply: REG,
    /// Backlight, if the panel has one
    pub backlight: Option<BL>,
    /// Sleep provider for lifecycle and program delays
    pub delay: D,
}

/// Bind refused; the resources are handed back untouched
pub struct BindError<DSI, I2C, SPI, P, REG, BL, D> {
    /// Why
    pub error: PanelError,
    /// What was passed in
    pub resources: PanelResources<DSI, I2C, SPI, P, REG, BL, D>,
}

impl<DSI, I2C, SPI, P, REG, BL, D> core::fmt::Debug for BindError<DSI, I2C, SPI, P, REG, BL, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BindError").field("error", &self.error).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Init,
    Enable,
    Disable,
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// One bound panel.
///
/// Generic over:
/// - `DSI`, `I2C`, `SPI`: side-band bus devices ([`DsiDevice`], async
///   [`I2c`], async [`SpiDevice`]); [`NoDevice`] for absent ones.
/// - `P`: control GPIOs ([`OutputPin`]).
/// - `REG`: supply ([`Regulator`]).
/// - `BL`: backlight ([`Backlight`]).
/// - `D`: async [`DelayNs`].
pub struct Panel<'a, DSI, I2C, SPI, P, REG, BL, D> {
    buses: Buses<DSI, I2C, SPI>,
    pins: ControlPins<P>,
    supply: REG,
    backlight: Option<BL>,
    delay: D,
    config: PanelConfig<'a>,
    timing: VideoTiming,
    packer: BitPacker,
    prepared: bool,
    enabled: bool,
}

impl<'a, DSI, I2C, SPI, P, REG, BL, D> Panel<'a, DSI, I2C, SPI, P, REG, BL, D>
where
    DSI: DsiDevice,
    I2C: I2c,
    SPI: SpiDevice,
    P: OutputPin,
    REG: Regulator,
    BL: Backlight,
    D: DelayNs,
{
    /// Bind a panel to its resources.
    ///
    /// Fails with [`PanelError::Defer`] when the configuration names an I²C
    /// or SPI device that was not supplied, or requires a backlight that is
    /// not there. An I²C or SPI device without its configuration, or a
    /// configuration that does not validate, is
    /// [`PanelError::InvalidConfig`] (or the program's structural error).
    ///
    /// On success the panel is held in reset, unprepared and powered down.
    pub fn bind(
        config: PanelConfig<'a>,
        resources: PanelResources<DSI, I2C, SPI, P, REG, BL, D>,
    ) -> Result<Self, BindError<DSI, I2C, SPI, P, REG, BL, D>> {
        let refuse = |error, resources| Err(BindError { error, resources });

        if let Err(error) = config.validate() {
            return refuse(error, resources);
        }
        let Some(timing) = config.active_timing() else {
            return refuse(PanelError::InvalidConfig, resources);
        };
        let adapters = &resources.adapters;
        if (config.i2c.is_some() && adapters.i2c.is_none())
            || (config.spi.is_some() && adapters.spi.is_none())
        {
            info!("{}: side-band adapter not available yet", config.desc.name);
            return refuse(PanelError::Defer, resources);
        }
        if config.require_backlight && resources.backlight.is_none() {
            info!("{}: backlight not available yet", config.desc.name);
            return refuse(PanelError::Defer, resources);
        }
        if config.programs.uses_mipi() && adapters.dsi.is_none() {
            warn!("{}: MIPI programs present but no DSI device, they will not run", config.desc.name);
        }

        let PanelResources {
            adapters,
            mut pins,
            supply,
            backlight,
            delay,
        } = resources;

        let buses = match Buses::new(adapters, config.i2c, config.spi) {
            Ok(buses) => buses,
            Err(adapters) => {
                warn!("{}: side-band adapter supplied without its configuration", config.desc.name);
                return refuse(
                    PanelError::InvalidConfig,
                    PanelResources {
                        adapters,
                        pins,
                        supply,
                        backlight,
                        delay,
                    },
                );
            }
        };

        let initial = pins
            .set_reset(true)
            .and_then(|()| pins.set_prepare_enable(false))
            .and_then(|()| pins.set_power_enable(false));
        if let Err(error) = initial {
            return refuse(
                error,
                PanelResources {
                    adapters: buses.release(),
                    pins,
                    supply,
                    backlight,
                    delay,
                },
            );
        }

        info!(
            "{}: bound, {}x{}@{}, {} lanes",
            config.desc.name,
            timing.hdisplay,
            timing.vdisplay,
            timing.vrefresh,
            config.dsi.lanes
        );
        Ok(Self {
            buses,
            pins,
            supply,
            backlight,
            delay,
            config,
            timing,
            packer: BitPacker::new(),
            prepared: false,
            enabled: false,
        })
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Assert power-enable and wait for the panel logic to come up.
    pub async fn power_up(&mut self) -> Result<(), PanelError> {
        self.pins.set_power_enable(true)?;
        self.settle(self.config.desc.delays.power_up).await;
        Ok(())
    }

    /// Switch the supply on, release reset and run the init programs.
    ///
    /// On failure the panel is put back into reset and the supply is
    /// switched off again. No-op when already prepared.
    pub async fn prepare(&mut self) -> Result<(), PanelError> {
        if self.prepared {
            return Ok(());
        }
        if self.supply.enable().await.is_err() {
            error!("{}: supply enable failed", self.config.desc.name);
            return Err(PanelError::Regulator);
        }

        let result = match self
            .pins
            .set_prepare_enable(true)
            .and_then(|()| self.pins.set_reset(false))
        {
            Ok(()) => {
                self.settle(self.config.desc.delays.prepare).await;
                self.run_phase(Phase::Init).await
            }
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.pins.hold_in_reset();
            if self.supply.disable().await.is_err() {
                warn!("{}: supply disable failed", self.config.desc.name);
            }
            return Err(err);
        }

        self.prepared = true;
        info!("{}: prepared", self.config.desc.name);
        Ok(())
    }

    /// Run the enable programs and unblank the backlight.
    ///
    /// On failure the panel is put back into reset. No-op when already
    /// enabled.
    pub async fn enable(&mut self) -> Result<(), PanelError> {
        if self.enabled {
            return Ok(());
        }
        if let Err(err) = self.run_phase(Phase::Enable).await {
            self.pins.hold_in_reset();
            return Err(err);
        }
        self.settle(self.config.desc.delays.enable).await;

        if let Some(backlight) = self.backlight.as_mut() {
            if backlight.set_blank(false).is_err() {
                error!("{}: backlight unblank failed", self.config.desc.name);
                self.pins.hold_in_reset();
                return Err(PanelError::Backlight);
            }
        }

        self.enabled = true;
        info!("{}: enabled", self.config.desc.name);
        Ok(())
    }

    /// Blank the backlight and run the disable programs.
    ///
    /// Always completes; failures are logged. No-op when not enabled.
    pub async fn disable(&mut self) -> Result<(), PanelError> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(backlight) = self.backlight.as_mut() {
            if backlight.set_blank(true).is_err() {
                warn!("{}: backlight blank failed", self.config.desc.name);
            }
        }
        self.settle(self.config.desc.delays.disable).await;
        if let Err(err) = self.run_phase(Phase::Disable).await {
            warn!("{}: disable programs failed: {:?}", self.config.desc.name, err);
        }

        self.enabled = false;
        info!("{}: disabled", self.config.desc.name);
        Ok(())
    }

    /// Put the panel into reset and switch the supply off.
    ///
    /// Always completes; failures are logged. No-op when not prepared.
    pub async fn unprepare(&mut self) -> Result<(), PanelError> {
        if !self.prepared {
            return Ok(());
        }
        self.settle(self.config.desc.delays.unprepare).await;
        self.pins.hold_in_reset();
        if self.supply.disable().await.is_err() {
            warn!("{}: supply disable failed", self.config.desc.name);
        }

        self.prepared = false;
        info!("{}: unprepared", self.config.desc.name);
        Ok(())
    }

    /// Wait for the panel to power itself down, then release power-enable.
    pub async fn power_down(&mut self) -> Result<(), PanelError> {
        self.settle(self.config.desc.delays.power_down).await;
        self.pins.set_power_enable(false)
    }

    /// [`disable`](Self::disable) then [`unprepare`](Self::unprepare).
    pub async fn shutdown(&mut self) {
        // Neither step reports failure.
        let _ = self.disable().await;
        let _ = self.unprepare().await;
    }

    /// Shut the panel down and hand every resource back.
    pub async fn release(mut self) -> PanelResources<DSI, I2C, SPI, P, REG, BL, D> {
        self.shutdown().await;
        info!("{}: released", self.config.desc.name);
        PanelResources {
            adapters: self.buses.release(),
            pins: self.pins,
            supply: self.supply,
            backlight: self.backlight,
            delay: self.delay,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn settle(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms).await;
        }
    }

    async fn run_phase(&mut self, phase: Phase) -> Result<(), PanelError> {
        let programs: ProgramTriple<'a> = match phase {
            Phase::Init => self.config.programs.init,
            Phase::Enable => self.config.programs.enable,
            Phase::Disable => self.config.programs.disable,
        };
        if programs.is_empty() {
            return Ok(());
        }
        debug!("{}: running {:?} programs", self.config.desc.name, phase);
        let ctx = ExecContext {
            timing: &self.timing,
            lanes: self.config.dsi.lanes,
        };
        run_triple(&mut self.buses, &mut self.packer, &mut self.delay, &programs, &ctx).await
    }
}

impl<DSI, I2C, SPI, P, REG, BL, D> core::fmt::Debug for Panel<'_, DSI, I2C, SPI, P, REG, BL, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Panel")
            .field("name", &self.config.desc.name)
            .field("prepared", &self.prepared)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<DSI, I2C, SPI, P, REG, BL, D> Panel<'_, DSI, I2C, SPI, P, REG, BL, D> {
    /// Fixed panel description.
    pub fn desc(&self) -> &PanelDesc {
        &self.config.desc
    }

    /// Configuration the panel was bound with.
    pub fn config(&self) -> &PanelConfig<'_> {
        &self.config
    }

    /// Mode the programs substitute timing fields from.
    pub fn timing(&self) -> &VideoTiming {
        &self.timing
    }

    /// Supply on and init programs run.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Enable programs run and backlight on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Modes to advertise to the display host.
    pub fn modes(&self) -> impl Iterator<Item = ModeInfo> + '_ {
        modes::modes(&self.config.desc)
    }

    /// Copy the datasheet timing ranges into `out`; returns how many exist.
    pub fn timings(&self, out: &mut [DisplayTiming]) -> usize {
        modes::timings(&self.config.desc, out)
    }

    /// Static display properties.
    pub fn display_info(&self) -> DisplayInfo {
        modes::display_info(&self.config.desc)
    }

    /// Side-band buses, for host code that shares a device with the panel.
    pub fn buses_mut(&mut self) -> &mut Buses<DSI, I2C, SPI> {
        &mut self.buses
    }
}
