//! Per-panel configuration
//!
//! Everything the host supplies at bind time apart from the devices
//! themselves: the panel description, the active mode, DSI link parameters,
//! side-band bus settings and the command programs.
//!
//! ```
//! use panel::{PanelConfig, Program, ProgramSet, ProgramTriple};
//! use panel_specs::panels::PANASONIC_VVX10F004B00;
//!
//! static INIT: [u8; 5] = [0x01, 0x11, 0x3c, 120, 0x00];
//!
//! let config = PanelConfig::from_dsi_desc(&PANASONIC_VVX10F004B00).with_programs(ProgramSet {
//!     init: ProgramTriple::mipi(Program::new(&INIT)),
//!     ..ProgramSet::EMPTY
//! });
//! assert!(config.validate().is_ok());
//! assert_eq!(config.active_timing().unwrap().hdisplay, 1920);
//! ```

use panel_specs::{DsiPanelDesc, PanelDesc, VideoTiming};
use platform::{DsiConfig, I2cConfig, SpiConfig};

use crate::error::PanelError;
use crate::program::ProgramSet;

/// Host-supplied configuration of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig<'a> {
    /// Fixed properties of the panel
    pub desc: PanelDesc,
    /// Mode to drive; `None` uses the description's default mode
    pub timing: Option<VideoTiming>,
    /// DSI link parameters (lane count is read by lane filters)
    pub dsi: DsiConfig,
    /// I²C side-band device, if the panel has one
    pub i2c: Option<I2cConfig>,
    /// SPI side-band device, if the panel has one
    pub spi: Option<SpiConfig>,
    /// Command programs
    pub programs: ProgramSet<'a>,
    /// Refuse to bind until a backlight is available
    pub require_backlight: bool,
}

impl<'a> PanelConfig<'a> {
    /// Panel without side-band buses or programs on a 4-lane link.
    pub const fn new(desc: PanelDesc) -> Self {
        Self {
            desc,
            timing: None,
            dsi: DsiConfig::new(4),
            i2c: None,
            spi: None,
            programs: ProgramSet::EMPTY,
            require_backlight: false,
        }
    }

    /// DSI panel from the catalog, with its link parameters.
    pub const fn from_dsi_desc(desc: &DsiPanelDesc) -> Self {
        Self::new(desc.desc).with_dsi(desc.link)
    }

    /// Drive `timing` instead of the default mode.
    #[must_use]
    pub const fn with_timing(mut self, timing: VideoTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Use these DSI link parameters.
    #[must_use]
    pub const fn with_dsi(mut self, dsi: DsiConfig) -> Self {
        self.dsi = dsi;
        self
    }

    /// Add an I²C side-band device.
    #[must_use]
    pub const fn with_i2c(mut self, i2c: I2cConfig) -> Self {
        self.i2c = Some(i2c);
        self
    }

    /// Add an SPI side-band device.
    #[must_use]
    pub const fn with_spi(mut self, spi: SpiConfig) -> Self {
        self.spi = Some(spi);
        self
    }

    /// Use these command programs.
    #[must_use]
    pub const fn with_programs(mut self, programs: ProgramSet<'a>) -> Self {
        self.programs = programs;
        self
    }

    /// Refuse to bind without a backlight.
    #[must_use]
    pub const fn with_required_backlight(mut self) -> Self {
        self.require_backlight = true;
        self
    }

    /// The mode programs substitute timing fields from.
    pub fn active_timing(&self) -> Option<VideoTiming> {
        self.timing.or_else(|| self.desc.default_mode())
    }

    /// Check everything that does not depend on which devices are present.
    ///
    /// Rejects a lane count outside 1..=4, an I²C address wider than 7 bits,
    /// a panel without any mode to drive, and malformed programs.
    pub fn validate(&self) -> Result<(), PanelError> {
        if !self.dsi.lanes_valid() {
            return Err(PanelError::InvalidConfig);
        }
        if self.i2c.is_some_and(|i2c| !i2c.address_valid()) {
            return Err(PanelError::InvalidConfig);
        }
        if self.active_timing().is_none() {
            return Err(PanelError::InvalidConfig);
        }
        self.programs.validate()
    }
}
