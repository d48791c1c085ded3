//! MIPI-DSI abstraction layer
//!
//! Mirrors the shape of the `embedded-hal` bus traits: an [`ErrorType`] with
//! an error that reports a portable [`ErrorKind`], and a [`DsiDevice`] trait
//! exposing the side-band command operations a panel needs.
//!
//! Only the command path is modelled here. Video streaming belongs to the
//! display host and never goes through this trait.

/// DSI error.
pub trait Error: core::fmt::Debug {
    /// Convert the error to a generic DSI error kind.
    fn kind(&self) -> ErrorKind;
}

impl Error for core::convert::Infallible {
    fn kind(&self) -> ErrorKind {
        match *self {}
    }
}

/// Portable DSI error kinds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ErrorKind {
    /// The peripheral reported a protocol error in the acknowledge/error
    /// report that follows a bus turnaround.
    ///
    /// Panels commonly report a stale error that was pending before the
    /// turnaround; a single re-read usually clears it.
    Protocol,
    /// The transfer did not complete in time.
    Timeout,
    /// A different error occurred.
    Other,
}

impl Error for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Protocol => write!(f, "DSI protocol error report"),
            Self::Timeout => write!(f, "DSI transfer timeout"),
            Self::Other => write!(f, "DSI transfer error"),
        }
    }
}

/// DSI error type trait.
pub trait ErrorType {
    /// Error type
    type Error: Error;
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

/// Command-mode access to a MIPI-DSI peripheral.
pub trait DsiDevice: ErrorType {
    /// Send a DCS command; `data[0]` is the command byte.
    async fn dcs_write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Send a generic (manufacturer) write packet.
    async fn generic_write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Issue DCS read `cmd` and fill `buf` from the response (with BTA).
    async fn dcs_read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Issue a generic read with request parameters `params` and fill `buf`.
    async fn generic_read(&mut self, params: &[u8], buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Bound the size of the peripheral's read responses.
    async fn set_maximum_return_packet_size(&mut self, size: u16) -> Result<(), Self::Error>;

    /// Select low-power (escape mode) transmission for command packets.
    fn set_low_power_mode(&mut self, enabled: bool);
}

impl<T: DsiDevice + ?Sized> DsiDevice for &mut T {
    async fn dcs_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::dcs_write(self, data).await
    }

    async fn generic_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::generic_write(self, data).await
    }

    async fn dcs_read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::dcs_read(self, cmd, buf).await
    }

    async fn generic_read(&mut self, params: &[u8], buf: &mut [u8]) -> Result<(), Self::Error> {
        T::generic_read(self, params, buf).await
    }

    async fn set_maximum_return_packet_size(&mut self, size: u16) -> Result<(), Self::Error> {
        T::set_maximum_return_packet_size(self, size).await
    }

    fn set_low_power_mode(&mut self, enabled: bool) {
        T::set_low_power_mode(self, enabled);
    }
}

/// Pixel format on the DSI video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 24 bits per pixel
    #[default]
    Rgb888,
    /// 18 bits per pixel, loosely packed
    Rgb666,
    /// 18 bits per pixel, packed
    Rgb666Packed,
    /// 16 bits per pixel
    Rgb565,
}

impl PixelFormat {
    /// Bits per pixel on the wire.
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Rgb888 => 24,
            Self::Rgb666 => 24,
            Self::Rgb666Packed => 18,
            Self::Rgb565 => 16,
        }
    }
}

/// Link mode flags the host applies when it attaches the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct VideoModeFlags {
    /// Video mode (as opposed to command mode) transmission
    pub video: bool,
    /// Burst video mode
    pub burst: bool,
    /// Send sync pulses rather than sync events
    pub sync_pulse: bool,
    /// Send horizontal sync end packets
    pub hse: bool,
    /// Clock lane may stop between transmissions
    pub clock_non_continuous: bool,
    /// Skip the end-of-transmission packet
    pub skip_eot: bool,
    /// Do not send horizontal front porch blanking packets
    pub hfp_disable: bool,
    /// Do not send horizontal back porch blanking packets
    pub hbp_disable: bool,
    /// Do not send horizontal sync active blanking packets
    pub hsa_disable: bool,
}

impl VideoModeFlags {
    /// No flags set.
    pub const NONE: Self = Self {
        video: false,
        burst: false,
        sync_pulse: false,
        hse: false,
        clock_non_continuous: false,
        skip_eot: false,
        hfp_disable: false,
        hbp_disable: false,
        hsa_disable: false,
    };

    /// Plain video mode.
    pub const VIDEO: Self = Self {
        video: true,
        ..Self::NONE
    };
}

/// DSI link parameters of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DsiConfig {
    /// Number of data lanes (1..=4)
    pub lanes: u8,
    /// Pixel format
    pub format: PixelFormat,
    /// Video mode blanking flags
    pub mode_flags: VideoModeFlags,
    /// Minimum HS clock as a multiple of the pixel clock (0 = host default)
    pub min_hs_clock_multiple: u32,
    /// DSI clock must be a multiple of this value (0 = no constraint)
    pub mipi_dsi_multiple: u32,
}

impl DsiConfig {
    /// Link with `lanes` data lanes and RGB888 pixels, command mode.
    pub const fn new(lanes: u8) -> Self {
        Self {
            lanes,
            format: PixelFormat::Rgb888,
            mode_flags: VideoModeFlags::NONE,
            min_hs_clock_multiple: 0,
            mipi_dsi_multiple: 0,
        }
    }

    /// Whether the lane count is within 1..=4.
    pub const fn lanes_valid(&self) -> bool {
        matches!(self.lanes, 1..=4)
    }
}

impl Default for DsiConfig {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_is_its_own_error() {
        assert_eq!(ErrorKind::Protocol.kind(), ErrorKind::Protocol);
        assert_eq!(ErrorKind::Other.kind(), ErrorKind::Other);
    }

    #[test]
    fn lane_count_validation() {
        assert!(!DsiConfig::new(0).lanes_valid());
        for lanes in 1..=4 {
            assert!(DsiConfig::new(lanes).lanes_valid());
        }
        assert!(!DsiConfig::new(5).lanes_valid());
    }

    #[test]
    fn mode_flag_presets() {
        assert_eq!(VideoModeFlags::default(), VideoModeFlags::NONE);
        assert!(VideoModeFlags::VIDEO.video);
        assert!(!VideoModeFlags::VIDEO.burst);
    }

    #[test]
    fn pixel_format_widths() {
        assert_eq!(PixelFormat::Rgb888.bits_per_pixel(), 24);
        assert_eq!(PixelFormat::Rgb666Packed.bits_per_pixel(), 18);
        assert_eq!(PixelFormat::Rgb565.bits_per_pixel(), 16);
    }
}
