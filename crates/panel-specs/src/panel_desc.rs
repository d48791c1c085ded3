//! Panel description types
//!
//! Everything about a panel that is fixed by its datasheet: supported modes,
//! colour depth, active-area size, the media bus format it expects and the
//! settle times between lifecycle steps.

use embedded_graphics::geometry::Size;
use platform::DsiConfig;

use crate::timing::{DisplayTiming, Polarity, VideoTiming};

/// Settle times in milliseconds, waited out by the lifecycle driver
///
/// A zero delay is skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PanelDelays {
    /// After asserting the power-enable GPIO
    pub power_up: u32,
    /// Before the init program: time for the panel to accept commands
    pub prepare: u32,
    /// After the enable program: time until the first valid frame shows
    pub enable: u32,
    /// After blanking the backlight, before the disable program
    pub disable: u32,
    /// Before cutting the supply: time for the panel to power itself down
    pub unprepare: u32,
    /// Before deasserting the power-enable GPIO
    pub power_down: u32,
}

impl PanelDelays {
    /// No delays.
    pub const NONE: Self = Self {
        power_up: 0,
        prepare: 0,
        enable: 0,
        disable: 0,
        unprepare: 0,
        power_down: 0,
    };
}

/// Media bus format between the display host and the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(non_camel_case_types)]
pub enum BusFormat {
    /// 24-bit parallel RGB
    Rgb888_1x24,
    /// 18-bit parallel RGB
    Rgb666_1x18,
    /// 16-bit parallel RGB
    Rgb565_1x16,
    /// 18-bit RGB over 3 LVDS pairs, SPWG mapping
    Rgb666_1x7x3Spwg,
    /// 24-bit RGB over 4 LVDS pairs, SPWG mapping
    Rgb888_1x7x4Spwg,
    /// 24-bit RGB over 4 LVDS pairs, JEIDA mapping
    Rgb888_1x7x4Jeida,
}

impl BusFormat {
    /// Media bus format code as used by Linux V4L2/DRM (`MEDIA_BUS_FMT_*`).
    pub const fn code(self) -> u32 {
        match self {
            Self::Rgb666_1x18 => 0x1009,
            Self::Rgb888_1x24 => 0x100a,
            Self::Rgb666_1x7x3Spwg => 0x1010,
            Self::Rgb888_1x7x4Spwg => 0x1011,
            Self::Rgb888_1x7x4Jeida => 0x1012,
            Self::Rgb565_1x16 => 0x1017,
        }
    }

    /// Bits per colour component.
    pub const fn bpc(self) -> u8 {
        match self {
            Self::Rgb888_1x24 | Self::Rgb888_1x7x4Spwg | Self::Rgb888_1x7x4Jeida => 8,
            Self::Rgb666_1x18 | Self::Rgb666_1x7x3Spwg => 6,
            Self::Rgb565_1x16 => 5,
        }
    }
}

/// Pixel clock edge on which the panel samples data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ClockEdge {
    /// Not specified
    #[default]
    Unspecified,
    /// Rising edge
    Posedge,
    /// Falling edge
    Negedge,
}

/// Bus signalling requirements reported to the display host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusFlags {
    /// Data-enable polarity
    pub de: Polarity,
    /// Pixel data sampling edge
    pub pixdata: ClockEdge,
}

impl BusFlags {
    /// No requirements.
    pub const NONE: Self = Self {
        de: Polarity::Unspecified,
        pixdata: ClockEdge::Unspecified,
    };

    /// Data-enable active high, data sampled on the falling edge.
    pub const DE_HIGH_NEGEDGE: Self = Self {
        de: Polarity::ActiveHigh,
        pixdata: ClockEdge::Negedge,
    };

    /// Data-enable active high, data sampled on the rising edge.
    pub const DE_HIGH_POSEDGE: Self = Self {
        de: Polarity::ActiveHigh,
        pixdata: ClockEdge::Posedge,
    };
}

/// Complete description of a fixed-mode panel
///
/// Modes come from two lists: `timings` (datasheet ranges, advertised as
/// their typical mode) followed by `modes` (exact modes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PanelDesc {
    /// Human-readable name (e.g. "AUO B101EAN01")
    pub name: &'static str,
    /// Device-tree style `vendor,model` identifier
    pub compatible: &'static str,
    /// Exact modes
    pub modes: &'static [VideoTiming],
    /// Datasheet timing ranges
    pub timings: &'static [DisplayTiming],
    /// Bits per colour component (0 = unknown)
    pub bpc: u8,
    /// Width of the active area in millimetres
    pub width_mm: u32,
    /// Height of the active area in millimetres
    pub height_mm: u32,
    /// Lifecycle settle times
    pub delays: PanelDelays,
    /// Media bus format, if the panel constrains it
    pub bus_format: Option<BusFormat>,
    /// Bus signalling requirements
    pub bus_flags: BusFlags,
}

impl PanelDesc {
    /// Number of modes the panel advertises.
    pub const fn mode_count(&self) -> usize {
        self.timings.len().saturating_add(self.modes.len())
    }

    /// Physical size of the active area in millimetres.
    pub const fn size_mm(&self) -> Size {
        Size::new(self.width_mm, self.height_mm)
    }

    /// The mode a host should drive by default: the first timing range's
    /// typical mode, else the first exact mode.
    pub fn default_mode(&self) -> Option<VideoTiming> {
        self.timings
            .first()
            .map(DisplayTiming::typical_mode)
            .or_else(|| self.modes.first().copied())
    }
}

/// A panel attached over MIPI-DSI, with the link parameters it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DsiPanelDesc {
    /// Panel description
    pub desc: PanelDesc,
    /// DSI link parameters
    pub link: DsiConfig,
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    const MODE: VideoTiming = VideoTiming::from_porches(33_260, [800, 40, 128, 88], [480, 10, 2, 33], 60);

    const DESC: PanelDesc = PanelDesc {
        name: "Test panel",
        compatible: "test,panel",
        modes: &[MODE],
        timings: &[],
        bpc: 6,
        width_mm: 152,
        height_mm: 91,
        delays: PanelDelays::NONE,
        bus_format: Some(BusFormat::Rgb666_1x18),
        bus_flags: BusFlags::DE_HIGH_NEGEDGE,
    };

    #[test]
    fn test_mode_count_and_default() {
        assert_eq!(DESC.mode_count(), 1);
        assert_eq!(DESC.default_mode(), Some(MODE));
    }

    #[test]
    fn test_size_mm() {
        assert_eq!(DESC.size_mm(), Size::new(152, 91));
    }

    #[test]
    fn test_bus_format_codes() {
        assert_eq!(BusFormat::Rgb888_1x24.code(), 0x100a);
        assert_eq!(BusFormat::Rgb666_1x18.code(), 0x1009);
        assert_eq!(BusFormat::Rgb666_1x18.bpc(), 6);
        assert_eq!(BusFormat::Rgb888_1x7x4Jeida.bpc(), 8);
    }

    #[test]
    fn test_empty_desc_has_no_default() {
        let desc = PanelDesc {
            modes: &[],
            ..DESC
        };
        assert_eq!(desc.mode_count(), 0);
        assert!(desc.default_mode().is_none());
    }
}
