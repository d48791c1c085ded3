//! Hardware Abstraction Layer (HAL) for the simple-panel driver
//!
//! This crate provides the trait-based collaborators the panel command
//! interpreter drives, so that the driver can be developed and tested
//! without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Display host (pixel pipeline, mode setting)
//!         ↓
//! Panel driver (panel crate - command programs, lifecycle)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Bus controllers (DSI host, I²C master, SPI master, GPIO, regulators)
//! ```
//!
//! # What lives where
//!
//! - I²C, SPI, GPIO and delays are the `embedded-hal` 1.0 traits
//!   ([`embedded_hal_async::i2c::I2c`], [`embedded_hal_async::spi::SpiDevice`],
//!   [`embedded_hal::digital::OutputPin`], [`embedded_hal_async::delay::DelayNs`]).
//! - MIPI-DSI has no `embedded-hal` trait; [`dsi::DsiDevice`] fills the gap
//!   in the same style (`ErrorType` + `Error::kind()`).
//! - [`Regulator`] and [`Backlight`] cover the panel supply and backlight.
//! - [`NoDevice`] stands in for any collaborator a panel does not have.
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls and the recording [`mocks`]
//! - `defmt`: `defmt::Format` derives on all platform types
//!
//! # Example
//!
//! ```no_run
//! use platform::dsi::DsiDevice;
//!
//! async fn sleep_out<D: DsiDevice>(dsi: &mut D) -> Result<(), D::Error> {
//!     dsi.dcs_write(&[0x11]).await
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::doc_markdown)] // register names and bus names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // single-threaded per panel, Send bounds not needed

pub mod absent;
pub mod dsi;
pub mod peripheral;
pub mod power;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use absent::NoDevice;
pub use dsi::{DsiConfig, DsiDevice, PixelFormat, VideoModeFlags};
pub use peripheral::{I2cConfig, SpiConfig};
pub use power::{Backlight, Regulator};
