//! Panasonic panel specifications

use platform::{DsiConfig, PixelFormat, VideoModeFlags};

use crate::{BusFlags, DsiPanelDesc, PanelDelays, PanelDesc, VideoTiming};

/// Panasonic VVX10F004B00 (10.1", 1920×1200, 4-lane MIPI-DSI)
pub const PANASONIC_VVX10F004B00: DsiPanelDesc = DsiPanelDesc {
    desc: PanelDesc {
        name: "Panasonic VVX10F004B00",
        compatible: "panasonic,vvx10f004b00",
        modes: &[VideoTiming::from_porches(
            157_200,
            [1920, 154, 16, 32],
            [1200, 17, 2, 16],
            60,
        )],
        timings: &[],
        bpc: 8,
        width_mm: 217,
        height_mm: 136,
        delays: PanelDelays::NONE,
        bus_format: None,
        bus_flags: BusFlags::NONE,
    },
    link: DsiConfig {
        lanes: 4,
        format: PixelFormat::Rgb888,
        mode_flags: VideoModeFlags {
            video: true,
            sync_pulse: true,
            clock_non_continuous: true,
            ..VideoModeFlags::NONE
        },
        min_hs_clock_multiple: 0,
        mipi_dsi_multiple: 0,
    },
};

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_vvx10f004b00_link() {
        assert!(PANASONIC_VVX10F004B00.link.lanes_valid());
        assert!(PANASONIC_VVX10F004B00.link.mode_flags.sync_pulse);
        assert_eq!(PANASONIC_VVX10F004B00.desc.modes[0].htotal, 2122);
    }
}
