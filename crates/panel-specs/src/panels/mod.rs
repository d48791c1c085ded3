//! Pre-configured panel descriptions
//!
//! Common fixed-mode panels, grouped by vendor, and lookup by the
//! device-tree `compatible` string a host would match on.

pub mod ampire;
pub mod auo;
pub mod boe;
pub mod edt;
pub mod hannstar;
pub mod panasonic;

pub use ampire::*;
pub use auo::*;
pub use boe::*;
pub use edt::*;
pub use hannstar::*;
pub use panasonic::*;

use crate::{DsiPanelDesc, PanelDesc};

/// Every panel driven over a parallel RGB or LVDS link.
pub static CATALOG: &[&PanelDesc] = &[
    &AMPIRE_AM_480272H3TMQW_T01H,
    &AMPIRE_AM800480R3TMQWA1H,
    &AUO_B101AW03,
    &AUO_B101EAN01,
    &AUO_B101XTN01,
    &AUO_G133HAN01,
    &BOE_NV101WXMN51,
    &EDT_ETM0700G0DH6,
    &HANNSTAR_HSD070PWW1,
];

/// Every panel driven over MIPI-DSI.
pub static DSI_CATALOG: &[&DsiPanelDesc] = &[&PANASONIC_VVX10F004B00];

/// Look up a parallel/LVDS panel by `compatible` string.
pub fn find(compatible: &str) -> Option<&'static PanelDesc> {
    CATALOG.iter().copied().find(|d| d.compatible == compatible)
}

/// Look up a DSI panel by `compatible` string.
pub fn find_dsi(compatible: &str) -> Option<&'static DsiPanelDesc> {
    DSI_CATALOG
        .iter()
        .copied()
        .find(|d| d.desc.compatible == compatible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let desc = find("auo,b101ean01");
        assert!(desc.is_some_and(|d| d.name == "AUO B101EAN01"));
        assert!(find("acme,unknown").is_none());
        assert!(find_dsi("panasonic,vvx10f004b00").is_some());
        assert!(find_dsi("auo,b101ean01").is_none());
    }

    #[test]
    fn test_compatibles_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in CATALOG.iter().skip(i.saturating_add(1)) {
                assert_ne!(a.compatible, b.compatible);
            }
        }
    }

    #[test]
    fn test_all_panels_consistent() {
        for desc in CATALOG.iter().copied().chain(DSI_CATALOG.iter().map(|d| &d.desc)) {
            assert!(desc.mode_count() > 0, "{} has no modes", desc.name);
            for mode in desc.modes {
                assert!(mode.is_consistent(), "{} has an inconsistent mode", desc.name);
            }
            for timing in desc.timings {
                assert!(timing.typical_mode().is_consistent());
            }
            if let Some(format) = desc.bus_format {
                assert_eq!(format.bpc(), desc.bpc, "{} bpc/bus format mismatch", desc.name);
            }
        }
    }
}
