//! Video timing types
//!
//! [`VideoTiming`] is one fixed mode in the form the display host programs
//! into its pixel pipeline. [`DisplayTiming`] is the datasheet form: a
//! min/typ/max range per parameter, from which the typical mode is derived.

use embedded_graphics::geometry::Size;

/// Sync or data-enable signal polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Polarity {
    /// Not specified by the datasheet; the host picks
    #[default]
    Unspecified,
    /// Active high
    ActiveHigh,
    /// Active low
    ActiveLow,
}

/// One fixed video mode
///
/// Horizontal values are in pixels, vertical values in lines, both counted
/// from the start of the active area:
///
/// ```text
/// 0 ── active ── display ── front porch ── sync_start ── sync ── sync_end ── back porch ── total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VideoTiming {
    /// Pixel clock in kHz
    pub clock: u32,
    /// Active pixels per line
    pub hdisplay: u32,
    /// Start of horizontal sync
    pub hsync_start: u32,
    /// End of horizontal sync
    pub hsync_end: u32,
    /// Total pixels per line
    pub htotal: u32,
    /// Active lines per frame
    pub vdisplay: u32,
    /// Start of vertical sync
    pub vsync_start: u32,
    /// End of vertical sync
    pub vsync_end: u32,
    /// Total lines per frame
    pub vtotal: u32,
    /// Nominal refresh rate in Hz
    pub vrefresh: u32,
    /// Horizontal sync polarity
    pub hsync: Polarity,
    /// Vertical sync polarity
    pub vsync: Polarity,
}

impl VideoTiming {
    /// Build a mode from datasheet-style spans.
    ///
    /// `h` and `v` are `[active, front_porch, sync_len, back_porch]`.
    pub const fn from_porches(clock: u32, h: [u32; 4], v: [u32; 4], vrefresh: u32) -> Self {
        let [hactive, hfp, hsync, hbp] = h;
        let [vactive, vfp, vsync, vbp] = v;
        let hsync_start = hactive.saturating_add(hfp);
        let hsync_end = hsync_start.saturating_add(hsync);
        let vsync_start = vactive.saturating_add(vfp);
        let vsync_end = vsync_start.saturating_add(vsync);
        Self {
            clock,
            hdisplay: hactive,
            hsync_start,
            hsync_end,
            htotal: hsync_end.saturating_add(hbp),
            vdisplay: vactive,
            vsync_start,
            vsync_end,
            vtotal: vsync_end.saturating_add(vbp),
            vrefresh,
            hsync: Polarity::Unspecified,
            vsync: Polarity::Unspecified,
        }
    }

    /// Same mode with explicit sync polarities.
    pub const fn with_sync(mut self, hsync: Polarity, vsync: Polarity) -> Self {
        self.hsync = hsync;
        self.vsync = vsync;
        self
    }

    /// Derived timing value.
    ///
    /// Inconsistent modes (e.g. `hsync_end < hsync_start`) yield 0 rather
    /// than wrapping.
    pub const fn field(&self, field: TimingField) -> u32 {
        match field {
            TimingField::HSync => self.hsync_end.saturating_sub(self.hsync_start),
            TimingField::HBackPorch => self.htotal.saturating_sub(self.hsync_end),
            TimingField::HActive => self.hdisplay,
            TimingField::HFrontPorch => self.hsync_start.saturating_sub(self.hdisplay),
            TimingField::VSync => self.vsync_end.saturating_sub(self.vsync_start),
            TimingField::VBackPorch => self.vtotal.saturating_sub(self.vsync_end),
            TimingField::VActive => self.vdisplay,
            TimingField::VFrontPorch => self.vsync_start.saturating_sub(self.vdisplay),
        }
    }

    /// Active area in pixels.
    pub const fn active_size(&self) -> Size {
        Size::new(self.hdisplay, self.vdisplay)
    }

    /// Whether the mode is ordered `display <= sync_start <= sync_end <= total`
    /// on both axes.
    pub const fn is_consistent(&self) -> bool {
        self.hdisplay <= self.hsync_start
            && self.hsync_start <= self.hsync_end
            && self.hsync_end <= self.htotal
            && self.vdisplay <= self.vsync_start
            && self.vsync_start <= self.vsync_end
            && self.vsync_end <= self.vtotal
    }
}

/// Timing quantity that can be substituted into panel commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TimingField {
    /// `hsync_end - hsync_start`
    HSync,
    /// `htotal - hsync_end`
    HBackPorch,
    /// `hdisplay`
    HActive,
    /// `hsync_start - hdisplay`
    HFrontPorch,
    /// `vsync_end - vsync_start`
    VSync,
    /// `vtotal - vsync_end`
    VBackPorch,
    /// `vdisplay`
    VActive,
    /// `vsync_start - vdisplay`
    VFrontPorch,
}

impl TimingField {
    /// Every field, horizontal first, in sync/back-porch/active/front-porch order.
    pub const ALL: [Self; 8] = [
        Self::HSync,
        Self::HBackPorch,
        Self::HActive,
        Self::HFrontPorch,
        Self::VSync,
        Self::VBackPorch,
        Self::VActive,
        Self::VFrontPorch,
    ];
}

/// Min/typ/max range of one datasheet parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TimingEntry {
    /// Minimum
    pub min: u32,
    /// Typical
    pub typ: u32,
    /// Maximum
    pub max: u32,
}

impl TimingEntry {
    /// Range `min..=max` with typical value `typ`.
    pub const fn new(min: u32, typ: u32, max: u32) -> Self {
        Self { min, typ, max }
    }

    /// A parameter with no tolerance.
    pub const fn fixed(value: u32) -> Self {
        Self::new(value, value, value)
    }

    /// Whether `value` is within the range.
    pub const fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Signal properties that accompany a [`DisplayTiming`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisplayFlags {
    /// Horizontal sync polarity
    pub hsync: Polarity,
    /// Vertical sync polarity
    pub vsync: Polarity,
    /// Data-enable polarity
    pub de: Polarity,
}

impl DisplayFlags {
    /// Nothing specified.
    pub const NONE: Self = Self {
        hsync: Polarity::Unspecified,
        vsync: Polarity::Unspecified,
        de: Polarity::Unspecified,
    };
}

/// Datasheet timing ranges of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisplayTiming {
    /// Pixel clock in Hz
    pub pixelclock: TimingEntry,
    /// Active pixels per line
    pub hactive: TimingEntry,
    /// Horizontal front porch
    pub hfront_porch: TimingEntry,
    /// Horizontal back porch
    pub hback_porch: TimingEntry,
    /// Horizontal sync length
    pub hsync_len: TimingEntry,
    /// Active lines per frame
    pub vactive: TimingEntry,
    /// Vertical front porch
    pub vfront_porch: TimingEntry,
    /// Vertical back porch
    pub vback_porch: TimingEntry,
    /// Vertical sync length
    pub vsync_len: TimingEntry,
    /// Signal polarities
    pub flags: DisplayFlags,
}

impl DisplayTiming {
    /// The mode built from every parameter's typical value.
    ///
    /// The refresh rate is computed from the pixel clock and the totals,
    /// rounded to the nearest Hz.
    pub fn typical_mode(&self) -> VideoTiming {
        let mut mode = VideoTiming::from_porches(
            self.pixelclock.typ.checked_div(1000).unwrap_or(0),
            [
                self.hactive.typ,
                self.hfront_porch.typ,
                self.hsync_len.typ,
                self.hback_porch.typ,
            ],
            [
                self.vactive.typ,
                self.vfront_porch.typ,
                self.vsync_len.typ,
                self.vback_porch.typ,
            ],
            0,
        );
        let frame = u64::from(mode.htotal).saturating_mul(u64::from(mode.vtotal));
        let half = frame.checked_div(2).unwrap_or(0);
        let refresh = u64::from(self.pixelclock.typ)
            .saturating_add(half)
            .checked_div(frame)
            .unwrap_or(0);
        mode.vrefresh = u32::try_from(refresh).unwrap_or(u32::MAX);
        mode.hsync = self.flags.hsync;
        mode.vsync = self.flags.vsync;
        mode
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    const MODE: VideoTiming = VideoTiming::from_porches(9000, [480, 2, 41, 2], [272, 2, 10, 2], 60);

    #[test]
    fn test_from_porches() {
        assert_eq!(MODE.hsync_start, 482);
        assert_eq!(MODE.hsync_end, 523);
        assert_eq!(MODE.htotal, 525);
        assert_eq!(MODE.vsync_start, 274);
        assert_eq!(MODE.vsync_end, 284);
        assert_eq!(MODE.vtotal, 286);
        assert!(MODE.is_consistent());
    }

    #[test]
    fn test_derived_fields() {
        assert_eq!(MODE.field(TimingField::HSync), 41);
        assert_eq!(MODE.field(TimingField::HBackPorch), 2);
        assert_eq!(MODE.field(TimingField::HActive), 480);
        assert_eq!(MODE.field(TimingField::HFrontPorch), 2);
        assert_eq!(MODE.field(TimingField::VSync), 10);
        assert_eq!(MODE.field(TimingField::VBackPorch), 2);
        assert_eq!(MODE.field(TimingField::VActive), 272);
        assert_eq!(MODE.field(TimingField::VFrontPorch), 2);
    }

    #[test]
    fn test_inconsistent_mode_saturates() {
        let mut mode = MODE;
        mode.hsync_start = 400;
        assert!(!mode.is_consistent());
        assert_eq!(mode.field(TimingField::HFrontPorch), 0);
    }

    #[test]
    fn test_active_size() {
        assert_eq!(MODE.active_size(), Size::new(480, 272));
    }

    #[test]
    fn test_typical_mode() {
        let timing = DisplayTiming {
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
        };
        let mode = timing.typical_mode();
        assert_eq!(mode.clock, 141_200);
        assert_eq!(mode.hdisplay, 1920);
        assert_eq!(mode.htotal, 1920 + 58 + 42 + 88);
        assert_eq!(mode.vtotal, 1080 + 8 + 14 + 14);
        // 141.2 MHz / (2108 × 1116) ≈ 60.02 Hz
        assert_eq!(mode.vrefresh, 60);
    }

    #[test]
    fn test_timing_entry_range() {
        let entry = TimingEntry::new(1, 1, 10);
        assert!(entry.contains(1));
        assert!(entry.contains(10));
        assert!(!entry.contains(11));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&MODE).unwrap();
        let back: VideoTiming = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MODE);
    }
}
