//! Panel power and backlight abstraction

/// Panel supply regulator.
///
/// Reference counting, if any, is the implementation's business; the panel
/// driver pairs every `enable` with exactly one `disable`.
pub trait Regulator {
    /// Error type
    type Error: core::fmt::Debug;

    /// Switch the supply on and wait for it to settle.
    async fn enable(&mut self) -> Result<(), Self::Error>;

    /// Switch the supply off.
    async fn disable(&mut self) -> Result<(), Self::Error>;
}

/// Panel backlight, driven only as blank/unblank by the panel driver.
///
/// Brightness control stays with whoever owns the backlight device.
pub trait Backlight {
    /// Error type
    type Error: core::fmt::Debug;

    /// Blank (`true`) or unblank (`false`) the backlight.
    fn set_blank(&mut self, blank: bool) -> Result<(), Self::Error>;
}

impl<T: Regulator + ?Sized> Regulator for &mut T {
    type Error = T::Error;

    async fn enable(&mut self) -> Result<(), Self::Error> {
        T::enable(self).await
    }

    async fn disable(&mut self) -> Result<(), Self::Error> {
        T::disable(self).await
    }
}

impl<T: Backlight + ?Sized> Backlight for &mut T {
    type Error = T::Error;

    fn set_blank(&mut self, blank: bool) -> Result<(), Self::Error> {
        T::set_blank(self, blank)
    }
}
