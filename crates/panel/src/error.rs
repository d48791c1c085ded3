//! Error types

use embedded_hal::{i2c, spi};
use platform::dsi;

/// Which side-band bus a program or transfer targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusKind {
    /// I²C (bridge ICs, touch controllers)
    I2c,
    /// MIPI-DSI command channel
    Mipi,
    /// SPI, byte or 9-bit framed
    Spi,
}

impl core::fmt::Display for BusKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c => write!(f, "i2c"),
            Self::Mipi => write!(f, "mipi"),
            Self::Spi => write!(f, "spi"),
        }
    }
}

/// Adapter-reported error kind, per bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusErrorKind {
    /// I²C master error
    I2c(i2c::ErrorKind),
    /// SPI device error
    Spi(spi::ErrorKind),
    /// DSI host error
    Dsi(dsi::ErrorKind),
}

/// A transfer failed on a side-band bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusError {
    /// Bus that failed
    pub bus: BusKind,
    /// What the adapter reported
    pub kind: BusErrorKind,
}

impl BusError {
    pub(crate) fn i2c<E: i2c::Error>(err: &E) -> Self {
        Self {
            bus: BusKind::I2c,
            kind: BusErrorKind::I2c(err.kind()),
        }
    }

    pub(crate) fn spi<E: spi::Error>(err: &E) -> Self {
        Self {
            bus: BusKind::Spi,
            kind: BusErrorKind::Spi(err.kind()),
        }
    }

    pub(crate) fn dsi<E: dsi::Error>(err: &E) -> Self {
        Self {
            bus: BusKind::Mipi,
            kind: BusErrorKind::Dsi(err.kind()),
        }
    }
}

/// Errors returned by the panel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// A step's body runs past the end of its program.
    Truncated {
        /// Byte offset of the step's opcode
        offset: usize,
    },
    /// Opcode byte outside the instruction set.
    UnknownOpcode {
        /// Byte offset of the opcode
        offset: usize,
        /// The opcode byte as stored
        op: u8,
    },
    /// Payload does not fit the 64-byte transmit scratch.
    Overflow,
    /// Byte-aligned store attempted on a bit-packed buffer.
    Misaligned,
    /// Bus transfer failed.
    Bus(BusError),
    /// A read-and-compare step observed unexpected data.
    Mismatch,
    /// A required collaborator is not available yet; retry the bind later.
    Defer,
    /// Control GPIO could not be driven.
    Gpio,
    /// Supply regulator refused to switch.
    Regulator,
    /// Backlight refused to blank or unblank.
    Backlight,
    /// Configuration is invalid (lane count, address, missing mode).
    InvalidConfig,
}

/// Host-facing error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// Program malformed or overflowed the scratch buffer; bad configuration
    InvalidArgument,
    /// Adapter-originated failure
    BusError,
    /// Read-and-compare saw unexpected data
    Mismatch,
    /// Required adapter not yet available (bind only)
    Defer,
}

impl PanelError {
    /// Error class reported to the host.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Truncated { .. }
            | Self::UnknownOpcode { .. }
            | Self::Overflow
            | Self::Misaligned
            | Self::InvalidConfig => ErrorCode::InvalidArgument,
            Self::Bus(_) | Self::Gpio | Self::Regulator | Self::Backlight => ErrorCode::BusError,
            Self::Mismatch => ErrorCode::Mismatch,
            Self::Defer => ErrorCode::Defer,
        }
    }
}

impl From<BusError> for PanelError {
    fn from(err: BusError) -> Self {
        Self::Bus(err)
    }
}

impl core::fmt::Display for PanelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { offset } => write!(f, "Program truncated in step at byte {offset}"),
            Self::UnknownOpcode { offset, op } => {
                write!(f, "Unknown opcode 0x{op:02x} at byte {offset}")
            }
            Self::Overflow => write!(f, "Command exceeds the transmit scratch buffer"),
            Self::Misaligned => write!(f, "Byte store on a bit-packed buffer"),
            Self::Bus(err) => write!(f, "{} transfer failed: {:?}", err.bus, err.kind),
            Self::Mismatch => write!(f, "Read-back did not match"),
            Self::Defer => write!(f, "Required adapter not available yet"),
            Self::Gpio => write!(f, "GPIO error"),
            Self::Regulator => write!(f, "Regulator error"),
            Self::Backlight => write!(f, "Backlight error"),
            Self::InvalidConfig => write!(f, "Invalid panel configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PanelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PanelError::Truncated { offset: 3 }.code(), ErrorCode::InvalidArgument);
        assert_eq!(PanelError::Overflow.code(), ErrorCode::InvalidArgument);
        assert_eq!(PanelError::Mismatch.code(), ErrorCode::Mismatch);
        assert_eq!(PanelError::Defer.code(), ErrorCode::Defer);
        let bus = BusError {
            bus: BusKind::Mipi,
            kind: BusErrorKind::Dsi(dsi::ErrorKind::Timeout),
        };
        assert_eq!(PanelError::from(bus).code(), ErrorCode::BusError);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PanelError::UnknownOpcode { offset: 4, op: 0x7f }.to_string(),
            "Unknown opcode 0x7f at byte 4"
        );
        let bus = BusError {
            bus: BusKind::I2c,
            kind: BusErrorKind::I2c(i2c::ErrorKind::Other),
        };
        assert_eq!(PanelError::Bus(bus).to_string(), "i2c transfer failed: I2c(Other)");
    }
}
