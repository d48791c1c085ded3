//! Fixed-mode display panel driver
//!
//! Drives panels that cannot describe themselves: it advertises their fixed
//! modes to the display host and walks them through the power lifecycle,
//! running vendor command programs over whichever side-band bus the panel
//! is configured through (MIPI-DSI, I²C, SPI).
//!
//! # Architecture
//!
//! ```text
//! Display host (mode setting, lifecycle calls)
//!         ↓
//! Panel (lifecycle: GPIOs, supply, backlight, delays)
//!         ↓
//! Interpreter (one program per bus: I²C → MIPI → SPI)
//!         ↓
//! CommandBus (I²C register swap / DSI packets / SPI 9-bit packing)
//!         ↓
//! platform traits (embedded-hal 1.0 + DsiDevice)
//! ```
//!
//! # Programs
//!
//! A program is a byte string of steps, each an opcode byte and its body
//! (see [`opcode`] for the table). Programs are plain `&[u8]`, so they can
//! live in flash, come from a configuration blob, or be assembled with
//! [`ProgramBuilder`].
//!
//! # Example
//!
//! ```no_run
//! use panel::{Adapters, ControlPins, Panel, PanelConfig, PanelResources, Program, ProgramSet, ProgramTriple};
//! use panel_specs::panels::PANASONIC_VVX10F004B00;
//! use platform::{DsiDevice, NoDevice};
//! use embedded_hal_async::delay::DelayNs;
//!
//! // Sleep out, wait 120 ms, display on.
//! static INIT: [u8; 4] = [0x01, 0x11, 0x3c, 120];
//! static ENABLE: [u8; 2] = [0x01, 0x29];
//!
//! async fn bring_up<DSI: DsiDevice, D: DelayNs>(dsi: DSI, delay: D) -> Result<(), panel::PanelError> {
//!     let config = PanelConfig::from_dsi_desc(&PANASONIC_VVX10F004B00).with_programs(ProgramSet {
//!         init: ProgramTriple::mipi(Program::new(&INIT)),
//!         enable: ProgramTriple::mipi(Program::new(&ENABLE)),
//!         ..ProgramSet::EMPTY
//!     });
//!     let resources = PanelResources {
//!         adapters: Adapters::none().with_dsi(dsi),
//!         pins: ControlPins::none(),
//!         supply: NoDevice,
//!         backlight: None::<NoDevice>,
//!         delay,
//!     };
//!     let mut panel = Panel::bind(config, resources).map_err(|e| e.error)?;
//!     panel.power_up().await?;
//!     panel.prepare().await?;
//!     panel.enable().await
//! }
//! ```
//!
//! # Features
//!
//! - `std`: `std::error::Error` for [`PanelError`]
//! - `defmt`: firmware logging and `defmt::Format` derives
//! - `tracing`: host logging

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
#![allow(clippy::doc_markdown)] // opcode and bus names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::type_complexity)] // resource bundles carry seven type parameters
#![allow(async_fn_in_trait)] // single-threaded per panel, Send bounds not needed

// Must come first: the logging macros are used by every module below.
#[macro_use]
mod fmt;

pub mod bitpack;
pub mod bus;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lifecycle;
pub mod modes;
pub mod opcode;
pub mod program;

pub use bitpack::BitPacker;
pub use bus::{Adapters, Buses, CommandBus, I2cBus, MipiBus, SpiBus};
pub use config::PanelConfig;
pub use error::{BusError, BusErrorKind, BusKind, ErrorCode, PanelError};
pub use interpreter::{run_program, run_triple, ExecContext};
pub use lifecycle::{BindError, ControlPins, Panel, PanelResources};
pub use modes::{DisplayInfo, ModeInfo};
pub use opcode::Op;
pub use program::{Program, ProgramBuilder, ProgramSet, ProgramTriple, Step};
