//! Side-band bus configuration
//!
//! The buses themselves are the `embedded-hal` traits; these structs carry
//! the per-panel parameters a host supplies at bind time.

/// I2C side-band configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// 7-bit device address
    pub address: u8,
    /// Maximum clock frequency in Hz (0 = adapter default)
    pub max_frequency: u32,
}

impl I2cConfig {
    /// Device at `address` with the adapter's default clock.
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            max_frequency: 0,
        }
    }

    /// Whether `address` fits in 7 bits.
    pub const fn address_valid(&self) -> bool {
        self.address <= 0x7F
    }
}

/// SPI side-band configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Maximum clock frequency in Hz
    pub max_frequency: u32,
    /// 9-bit framing: every byte is preceded by a D/C bit on the wire
    pub nine_bit: bool,
}

impl SpiConfig {
    /// Byte-framed SPI at `max_frequency`.
    pub const fn new(max_frequency: u32) -> Self {
        Self {
            max_frequency,
            nine_bit: false,
        }
    }

    /// 9-bit framed SPI at `max_frequency`.
    pub const fn nine_bit(max_frequency: u32) -> Self {
        Self {
            max_frequency,
            nine_bit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i2c_address_range() {
        assert!(I2cConfig::new(0x2C).address_valid());
        assert!(I2cConfig::new(0x7F).address_valid());
        assert!(!I2cConfig::new(0x80).address_valid());
    }

    #[test]
    fn spi_framing_constructors() {
        assert!(!SpiConfig::new(1_000_000).nine_bit);
        assert!(SpiConfig::nine_bit(1_000_000).nine_bit);
    }
}
