//! Emerging Display Technologies panel specifications

use crate::{BusFlags, BusFormat, PanelDelays, PanelDesc, Polarity, VideoTiming};

/// EDT ETM0700G0DH6 (7", 800×480, 18-bit RGB)
pub const EDT_ETM0700G0DH6: PanelDesc = PanelDesc {
    name: "EDT ETM0700G0DH6",
    compatible: "edt,etm0700g0dh6",
    modes: &[
        VideoTiming::from_porches(33_260, [800, 40, 128, 88], [480, 10, 2, 33], 60)
            .with_sync(Polarity::ActiveLow, Polarity::ActiveLow),
    ],
    timings: &[],
    bpc: 6,
    width_mm: 152,
    height_mm: 91,
    delays: PanelDelays::NONE,
    bus_format: Some(BusFormat::Rgb666_1x18),
    bus_flags: BusFlags::DE_HIGH_NEGEDGE,
};
