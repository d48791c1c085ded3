//! Ampire panel specifications

use crate::{BusFlags, BusFormat, PanelDelays, PanelDesc, Polarity, VideoTiming};

/// Ampire AM-480272H3TMQW-T01H (4.3", 480×272, 24-bit RGB)
pub const AMPIRE_AM_480272H3TMQW_T01H: PanelDesc = PanelDesc {
    name: "Ampire AM-480272H3TMQW-T01H",
    compatible: "ampire,am-480272h3tmqw-t01h",
    modes: &[
        VideoTiming::from_porches(9_000, [480, 2, 41, 2], [272, 2, 10, 2], 60)
            .with_sync(Polarity::ActiveHigh, Polarity::ActiveHigh),
    ],
    timings: &[],
    bpc: 8,
    width_mm: 105,
    height_mm: 67,
    delays: PanelDelays::NONE,
    bus_format: Some(BusFormat::Rgb888_1x24),
    bus_flags: BusFlags::NONE,
};

/// Ampire AM800480R3TMQWA1H (7", 800×480, 18-bit RGB)
///
/// No front or back porch: the whole blanking interval is sync.
pub const AMPIRE_AM800480R3TMQWA1H: PanelDesc = PanelDesc {
    name: "Ampire AM800480R3TMQWA1H",
    compatible: "ampire,am800480r3tmqwa1h",
    modes: &[
        VideoTiming::from_porches(33_333, [800, 0, 255, 0], [480, 2, 45, 0], 60)
            .with_sync(Polarity::ActiveHigh, Polarity::ActiveHigh),
    ],
    timings: &[],
    bpc: 6,
    width_mm: 152,
    height_mm: 91,
    delays: PanelDelays::NONE,
    bus_format: Some(BusFormat::Rgb666_1x18),
    bus_flags: BusFlags::NONE,
};
