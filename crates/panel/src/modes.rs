//! Mode advertisement
//!
//! What the display host learns about a panel: the fixed list of modes
//! (datasheet ranges first, as their typical mode, then exact modes) and the
//! static display properties.

use embedded_graphics::geometry::Size;
use panel_specs::{BusFlags, BusFormat, DisplayTiming, PanelDesc, VideoTiming};

/// One advertised mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeInfo {
    /// The mode
    pub timing: VideoTiming,
    /// Whether the host should pick this mode by default
    pub preferred: bool,
}

/// Static display properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayInfo {
    /// Bits per colour component (0 = unknown)
    pub bpc: u8,
    /// Active area in millimetres
    pub size_mm: Size,
    /// Media bus format, if constrained
    pub bus_format: Option<BusFormat>,
    /// Bus signalling requirements
    pub bus_flags: BusFlags,
}

/// Every mode `desc` advertises, in order.
///
/// A mode is marked preferred when it is the only entry of its list.
pub fn modes(desc: &PanelDesc) -> impl Iterator<Item = ModeInfo> + '_ {
    let single_timing = desc.timings.len() == 1;
    let single_mode = desc.modes.len() == 1;
    let ranges = desc.timings.iter().map(move |t| ModeInfo {
        timing: t.typical_mode(),
        preferred: single_timing,
    });
    let exact = desc.modes.iter().map(move |m| ModeInfo {
        timing: *m,
        preferred: single_mode,
    });
    ranges.chain(exact)
}

/// Copy the datasheet timing ranges into `out`.
///
/// Returns how many ranges the panel has, which may exceed `out.len()`.
pub fn timings(desc: &PanelDesc, out: &mut [DisplayTiming]) -> usize {
    for (dst, src) in out.iter_mut().zip(desc.timings) {
        *dst = *src;
    }
    desc.timings.len()
}

/// Static properties of `desc`.
pub fn display_info(desc: &PanelDesc) -> DisplayInfo {
    DisplayInfo {
        bpc: desc.bpc,
        size_mm: desc.size_mm(),
        bus_format: desc.bus_format,
        bus_flags: desc.bus_flags,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use panel_specs::panels::{AUO_B101EAN01, AUO_G133HAN01, BOE_NV101WXMN51};

    #[cfg(feature = "defmt")]
    #[test]
    fn test_advertised_types_are_loggable() {
        fn assert_format<T: defmt::Format>() {}
        assert_format::<ModeInfo>();
        assert_format::<DisplayInfo>();
    }

    #[test]
    fn test_single_mode_is_preferred() {
        let list: Vec<_> = modes(&AUO_B101EAN01).collect();
        assert_eq!(list.len(), 1);
        assert!(list[0].preferred);
        assert_eq!(list[0].timing, AUO_B101EAN01.modes[0]);
    }

    #[test]
    fn test_multiple_modes_none_preferred() {
        let list: Vec<_> = modes(&BOE_NV101WXMN51).collect();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|m| !m.preferred));
    }

    #[test]
    fn test_ranges_come_first() {
        let desc = PanelDesc {
            modes: AUO_B101EAN01.modes,
            ..AUO_G133HAN01
        };
        let list: Vec<_> = modes(&desc).collect();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].timing, AUO_G133HAN01.timings[0].typical_mode());
        assert_eq!(list[1].timing, AUO_B101EAN01.modes[0]);
        assert!(list[0].preferred && list[1].preferred);
    }

    #[test]
    fn test_timings_reports_total() {
        let mut out = [AUO_G133HAN01.timings[0]; 0];
        assert_eq!(timings(&AUO_G133HAN01, &mut out), 1);
        let mut out = [AUO_G133HAN01.timings[0]; 3];
        assert_eq!(timings(&AUO_G133HAN01, &mut out), 1);
        assert_eq!(timings(&AUO_B101EAN01, &mut out), 0);
    }

    #[test]
    fn test_display_info() {
        let info = display_info(&AUO_G133HAN01);
        assert_eq!(info.bpc, AUO_G133HAN01.bpc);
        assert_eq!(info.size_mm, AUO_G133HAN01.size_mm());
        assert_eq!(info.bus_format, Some(BusFormat::Rgb888_1x7x4Jeida));
    }
}
