//! HannStar panel specifications

use crate::{
    BusFlags, BusFormat, DisplayFlags, DisplayTiming, PanelDelays, PanelDesc, Polarity,
    TimingEntry,
};

/// HannStar HSD070PWW1 (7", 1280×800, single-link LVDS)
///
/// The datasheet's minimum horizontal blanking (54 clocks) is not reliable;
/// the sync length range starts at 58 so the minimum blanking is 60.
pub const HANNSTAR_HSD070PWW1: PanelDesc = PanelDesc {
    name: "HannStar HSD070PWW1",
    compatible: "hannstar,hsd070pww1",
    modes: &[],
    timings: &[DisplayTiming {
        pixelclock: TimingEntry::new(64_300_000, 71_100_000, 82_000_000),
        hactive: TimingEntry::fixed(1280),
        hfront_porch: TimingEntry::new(1, 1, 10),
        hback_porch: TimingEntry::new(1, 1, 10),
        hsync_len: TimingEntry::new(58, 158, 661),
        vactive: TimingEntry::fixed(800),
        vfront_porch: TimingEntry::new(1, 1, 10),
        vback_porch: TimingEntry::new(1, 1, 10),
        vsync_len: TimingEntry::new(1, 21, 203),
        flags: DisplayFlags {
            de: Polarity::ActiveHigh,
            ..DisplayFlags::NONE
        },
    }],
    bpc: 6,
    width_mm: 151,
    height_mm: 94,
    delays: PanelDelays::NONE,
    bus_format: Some(BusFormat::Rgb666_1x7x3Spwg),
    bus_flags: BusFlags::NONE,
};
