//! Placeholder for collaborators a panel does not have
//!
//! Optional collaborators are held as `Option<T>`. When a panel has none of a
//! kind, `T` still has to name a type; [`NoDevice`] is that type. Every
//! operation on it succeeds without doing anything, so it also works as an
//! always-on regulator for panels whose supply is not switchable.

use core::convert::Infallible;

use embedded_hal::digital;
use embedded_hal::i2c;
use embedded_hal::spi;

use crate::dsi;
use crate::power::{Backlight, Regulator};

/// A collaborator that is not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoDevice;

impl dsi::ErrorType for NoDevice {
    type Error = Infallible;
}

impl dsi::DsiDevice for NoDevice {
    async fn dcs_write(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn generic_write(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn dcs_read(&mut self, _cmd: u8, _buf: &mut [u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn generic_read(&mut self, _params: &[u8], _buf: &mut [u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn set_maximum_return_packet_size(&mut self, _size: u16) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_low_power_mode(&mut self, _enabled: bool) {}
}

impl i2c::ErrorType for NoDevice {
    type Error = Infallible;
}

impl embedded_hal_async::i2c::I2c for NoDevice {
    async fn transaction(
        &mut self,
        _address: u8,
        _operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl spi::ErrorType for NoDevice {
    type Error = Infallible;
}

impl embedded_hal_async::spi::SpiDevice for NoDevice {
    async fn transaction(
        &mut self,
        _operations: &mut [spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl digital::ErrorType for NoDevice {
    type Error = Infallible;
}

impl digital::OutputPin for NoDevice {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Regulator for NoDevice {
    type Error = Infallible;

    async fn enable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Backlight for NoDevice {
    type Error = Infallible;

    fn set_blank(&mut self, _blank: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsi::DsiDevice;
    use digital::OutputPin;

    #[tokio::test]
    async fn every_operation_succeeds() {
        let mut dev = NoDevice;
        let mut buf = [0xAAu8; 2];
        assert!(dev.dcs_write(&[0x11]).await.is_ok());
        assert!(dev.dcs_read(0x0A, &mut buf).await.is_ok());
        // Nothing is read back.
        assert_eq!(buf, [0xAA, 0xAA]);
        assert!(embedded_hal_async::i2c::I2c::write(&mut dev, 0x2C, &[1, 2]).await.is_ok());
        assert!(embedded_hal_async::spi::SpiDevice::write(&mut dev, &[1, 2]).await.is_ok());
        assert!(dev.set_high().is_ok());
        assert!(Regulator::enable(&mut dev).await.is_ok());
        assert!(dev.set_blank(true).is_ok());
    }
}
