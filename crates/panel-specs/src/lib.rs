//! Fixed-Mode Panel Specifications
//!
//! Video timings and physical descriptions of display panels that do not
//! report their own capabilities: the mode list advertised to the display
//! host, colour depth, active-area size, bus format and the settle delays
//! the lifecycle driver waits out between power transitions.
//!
//! # Features
//!
//! - **no_std compatible** - Works on embedded systems
//! - **Panel catalog** - Pre-configured descriptions of common LVDS/RGB and DSI panels
//! - **Serde support** - Optional serialization for host tooling
//! - **defmt support** - `defmt::Format` on every type for firmware logging
//! - **Derived timing fields** - Porches and sync widths as programmed into bridge ICs
//!
//! # Example
//!
//! ```
//! use panel_specs::panels::AUO_B101EAN01;
//! use panel_specs::TimingField;
//!
//! let desc = AUO_B101EAN01;
//! let mode = desc.modes[0];
//! println!("Panel: {}", desc.name);
//! println!("Resolution: {}×{}@{}", mode.hdisplay, mode.vdisplay, mode.vrefresh);
//! assert_eq!(mode.field(TimingField::HFrontPorch), 119);
//! ```
//!
//! # Custom Panels
//!
//! ```
//! use panel_specs::{BusFlags, BusFormat, PanelDelays, PanelDesc, Polarity, VideoTiming};
//!
//! const MY_MODE: VideoTiming = VideoTiming::from_porches(9_000, [480, 2, 41, 2], [272, 2, 10, 2], 60)
//!     .with_sync(Polarity::ActiveHigh, Polarity::ActiveHigh);
//!
//! const MY_PANEL: PanelDesc = PanelDesc {
//!     name: "Custom 4.3\" RGB",
//!     compatible: "acme,rgb43",
//!     modes: &[MY_MODE],
//!     timings: &[],
//!     bpc: 8,
//!     width_mm: 105,
//!     height_mm: 67,
//!     delays: PanelDelays::NONE,
//!     bus_format: Some(BusFormat::Rgb888_1x24),
//!     bus_flags: BusFlags::NONE,
//! };
//! assert_eq!(MY_PANEL.mode_count(), 1);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod panel_desc;
pub mod panels;
mod timing;

pub use panel_desc::{BusFlags, BusFormat, ClockEdge, DsiPanelDesc, PanelDelays, PanelDesc};
pub use timing::{DisplayFlags, DisplayTiming, Polarity, TimingEntry, TimingField, VideoTiming};
