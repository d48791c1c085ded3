//! AU Optronics panel specifications

use crate::{
    BusFlags, BusFormat, DisplayFlags, DisplayTiming, PanelDelays, PanelDesc, Polarity,
    TimingEntry, VideoTiming,
};

/// AUO B101AW03 (10.1", 1024×600)
pub const AUO_B101AW03: PanelDesc = PanelDesc {
    name: "AUO B101AW03",
    compatible: "auo,b101aw03",
    modes: &[VideoTiming::from_porches(
        51_450,
        [1024, 156, 8, 156],
        [600, 16, 6, 16],
        60,
    )],
    timings: &[],
    bpc: 6,
    width_mm: 223,
    height_mm: 125,
    delays: PanelDelays::NONE,
    bus_format: None,
    bus_flags: BusFlags::NONE,
};

/// AUO B101EAN01 (10.1", 1280×800)
pub const AUO_B101EAN01: PanelDesc = PanelDesc {
    name: "AUO B101EAN01",
    compatible: "auo,b101ean01",
    modes: &[VideoTiming::from_porches(
        72_500,
        [1280, 119, 32, 21],
        [800, 4, 20, 8],
        60,
    )],
    timings: &[],
    bpc: 6,
    width_mm: 217,
    height_mm: 136,
    delays: PanelDelays::NONE,
    bus_format: None,
    bus_flags: BusFlags::NONE,
};

/// AUO B101XTN01 (10.1", 1366×768)
///
/// No back porch on either axis.
pub const AUO_B101XTN01: PanelDesc = PanelDesc {
    name: "AUO B101XTN01",
    compatible: "auo,b101xtn01",
    modes: &[
        VideoTiming::from_porches(72_000, [1366, 20, 70, 0], [768, 14, 42, 0], 60)
            .with_sync(Polarity::ActiveLow, Polarity::ActiveLow),
    ],
    timings: &[],
    bpc: 6,
    width_mm: 223,
    height_mm: 125,
    delays: PanelDelays::NONE,
    bus_format: None,
    bus_flags: BusFlags::NONE,
};

/// AUO G133HAN01 (13.3", 1920×1080, dual-link LVDS)
///
/// Described by datasheet ranges; the advertised mode is the typical one.
pub const AUO_G133HAN01: PanelDesc = PanelDesc {
    name: "AUO G133HAN01",
    compatible: "auo,g133han01",
    modes: &[],
    timings: &[DisplayTiming {
        pixelclock: TimingEntry::new(134_000_000, 141_200_000, 149_000_000),
        hactive: TimingEntry::fixed(1920),
        hfront_porch: TimingEntry::new(39, 58, 77),
        hback_porch: TimingEntry::new(59, 88, 117),
        hsync_len: TimingEntry::new(28, 42, 56),
        vactive: TimingEntry::fixed(1080),
        vfront_porch: TimingEntry::new(3, 8, 11),
        vback_porch: TimingEntry::new(5, 14, 19),
        vsync_len: TimingEntry::new(4, 14, 19),
        flags: DisplayFlags::NONE,
    }],
    bpc: 8,
    width_mm: 293,
    height_mm: 165,
    delays: PanelDelays {
        prepare: 200,
        enable: 50,
        disable: 50,
        unprepare: 1000,
        ..PanelDelays::NONE
    },
    bus_format: Some(BusFormat::Rgb888_1x7x4Jeida),
    bus_flags: BusFlags::NONE,
};
