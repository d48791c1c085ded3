//! BOE panel specifications

use crate::{BusFlags, PanelDelays, PanelDesc, VideoTiming};

/// BOE NV101WXMN51 (10.1", 1280×800)
///
/// Two modes sharing one geometry: 60 Hz and a 48 Hz low-power rate.
pub const BOE_NV101WXMN51: PanelDesc = PanelDesc {
    name: "BOE NV101WXMN51",
    compatible: "boe,nv101wxmn51",
    modes: &[
        VideoTiming::from_porches(71_900, [1280, 48, 32, 80], [800, 3, 5, 24], 60),
        VideoTiming::from_porches(57_500, [1280, 48, 32, 80], [800, 3, 5, 24], 48),
    ],
    timings: &[],
    bpc: 8,
    width_mm: 217,
    height_mm: 136,
    delays: PanelDelays {
        prepare: 210,
        enable: 50,
        unprepare: 160,
        ..PanelDelays::NONE
    },
    bus_format: None,
    bus_flags: BusFlags::NONE,
};

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_nv101wxmn51_modes() {
        assert_eq!(BOE_NV101WXMN51.mode_count(), 2);
        assert_eq!(BOE_NV101WXMN51.modes[1].vrefresh, 48);
        assert_eq!(BOE_NV101WXMN51.delays.prepare, 210);
    }
}
