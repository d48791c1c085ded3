//! Command program interpreter
//!
//! [`run_program`] walks one program against one bus:
//!
//! ```text
//! opcode ─► lane filter? ── set skip ─────────────────────┐
//!    │                                                    │
//!    └─► skip set? ── yes: drop the step, clear skip ─────┤
//!             │                                           │
//!             └─ no ─► write / delay / MRPS / read /      │
//!                      substitute                         │
//!                              │                          │
//!                              └──────────── next step ◄──┘
//! ```
//!
//! A read whose reply differs from the expected value does not stop the
//! program; the mismatch is remembered and reported once the last step has
//! run. Structural and bus errors stop the program at once.
//!
//! [`run_triple`] runs the three programs of one lifecycle phase in bus
//! order I²C → MIPI → SPI.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::SpiDevice;
use panel_specs::VideoTiming;
use platform::DsiDevice;

use crate::bitpack::BitPacker;
use crate::bus::{Buses, CommandBus};
use crate::error::PanelError;
use crate::program::{Program, ProgramTriple, Step};

/// Size of the scratch command buffer filled by substitution steps.
pub const CMD_BUF_LEN: usize = 32;

/// Bits addressable by substitution steps.
pub const CMD_BUF_BITS: usize = CMD_BUF_LEN * 8;

/// Longest read-and-compare reply.
pub const MAX_READ_LEN: usize = 8;

/// Inputs a program may read but never change
#[derive(Debug, Clone, Copy)]
pub struct ExecContext<'t> {
    /// Mode substitution steps read their values from
    pub timing: &'t VideoTiming,
    /// Active DSI data lanes, matched by lane filters
    pub lanes: u8,
}

/// Write the low `dest_len` bits of `value` into `buf`, starting at bit
/// `dest_start` (bit 0 is the LSB of byte 0).
///
/// Bits outside the written range keep their value. Bits that would land at
/// or beyond [`CMD_BUF_BITS`] are dropped.
// shift < 8 and width <= 8 - shift, so every mask fits one byte.
#[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
pub fn substitute(buf: &mut [u8; CMD_BUF_LEN], dest_start: u8, dest_len: u8, value: u32) {
    let mut bit = usize::from(dest_start);
    let mut remaining = u32::from(dest_len);
    let mut value = value;
    while remaining > 0 {
        let Some(byte) = buf.get_mut(bit / 8) else {
            break;
        };
        let shift = (bit % 8) as u32;
        let width = 8u32.saturating_sub(shift).min(remaining);
        let mask = (0xFFu32 >> 8u32.saturating_sub(width)) << shift;
        let bits = (value << shift) & mask;
        *byte = (*byte & !(mask as u8)) | (bits as u8);

        value = value.checked_shr(width).unwrap_or(0);
        remaining = remaining.saturating_sub(width);
        bit = bit.saturating_add(width as usize);
    }
}

/// Reply bytes as a little-endian integer.
fn le_value(bytes: &[u8]) -> u64 {
    let mut padded = [0u8; MAX_READ_LEN];
    for (dst, src) in padded.iter_mut().zip(bytes) {
        *dst = *src;
    }
    u64::from_le_bytes(padded)
}

/// Run `program` on `bus`.
///
/// Returns [`PanelError::Mismatch`] if any read-and-compare step saw
/// unexpected data and everything else succeeded.
pub async fn run_program<B: CommandBus, D: DelayNs>(
    bus: &mut B,
    packer: &mut BitPacker,
    delay: &mut D,
    program: Program<'_>,
    ctx: &ExecContext<'_>,
) -> Result<(), PanelError> {
    if program.is_empty() {
        return Ok(());
    }
    debug!("{:?} program: {} bytes", bus.kind(), program.len());

    packer.reset();
    bus.begin_program();
    match execute(bus, packer, delay, program, ctx).await {
        Ok(mismatch) => {
            bus.flush(packer).await?;
            if mismatch {
                warn!("{:?} program: read-back mismatch", bus.kind());
                Err(PanelError::Mismatch)
            } else {
                Ok(())
            }
        }
        Err(err) => {
            error!("{:?} program failed: {:?}", bus.kind(), err);
            packer.reset();
            Err(err)
        }
    }
}

/// Step loop. Returns whether a read mismatched.
async fn execute<B: CommandBus, D: DelayNs>(
    bus: &mut B,
    packer: &mut BitPacker,
    delay: &mut D,
    program: Program<'_>,
    ctx: &ExecContext<'_>,
) -> Result<bool, PanelError> {
    let mut cmd_buf = [0u8; CMD_BUF_LEN];
    let mut skip = false;
    let mut mismatch = false;

    for item in program.steps() {
        let (offset, step) = item?;

        if let Step::LaneFilter(lanes) = step {
            if lanes != ctx.lanes {
                skip = true;
            }
            continue;
        }
        if core::mem::take(&mut skip) {
            trace!("step @{}: skipped ({} lanes active)", offset, ctx.lanes);
            continue;
        }

        match step {
            Step::Write { generic, payload } => {
                if !payload.is_empty() {
                    bus.write(packer, delay, payload, generic).await?;
                }
            }
            Step::WriteScratch { generic, len } => {
                let len = usize::from(len).min(CMD_BUF_LEN);
                let payload = cmd_buf.get(..len).unwrap_or_default();
                if !payload.is_empty() {
                    bus.write(packer, delay, payload, generic).await?;
                }
            }
            Step::Delay(ms) => {
                bus.flush(packer).await?;
                trace!("step @{}: delay {} ms", offset, ms);
                delay.delay_ms(u32::from(ms)).await;
            }
            Step::MaxReturnPacketSize(size) => bus.set_max_return_packet_size(size).await?,
            Step::Read {
                generic,
                cmd,
                expected,
            } => {
                let mut data = [0u8; MAX_READ_LEN];
                let reply = data.get_mut(..expected.len()).ok_or(PanelError::Overflow)?;
                bus.read(packer, delay, cmd, reply, generic).await?;
                let (got, want) = (le_value(reply), le_value(expected));
                if got == want {
                    debug!("step @{}: read {:?} = 0x{:x}", offset, cmd, got);
                } else {
                    warn!("step @{}: read {:?} = 0x{:x}, expected 0x{:x}", offset, cmd, got, want);
                    mismatch = true;
                }
            }
            Step::Const {
                dest_start,
                dest_len,
                value,
            } => substitute(&mut cmd_buf, dest_start, dest_len, value),
            Step::Timing {
                field,
                dest_start,
                dest_len,
                src_start,
            } => {
                let value = ctx.timing.field(field).checked_shr(u32::from(src_start)).unwrap_or(0);
                trace!("step @{}: {:?} >> {} = {}", offset, field, src_start, value);
                substitute(&mut cmd_buf, dest_start, dest_len, value);
            }
            Step::LaneFilter(_) => {}
        }
    }
    Ok(mismatch)
}

/// Run the programs of one lifecycle phase.
///
/// Bus order is I²C, MIPI, SPI; a bus without an adapter is skipped. The
/// first error stops the phase.
pub async fn run_triple<DSI, I2C, SPI, D>(
    buses: &mut Buses<DSI, I2C, SPI>,
    packer: &mut BitPacker,
    delay: &mut D,
    programs: &ProgramTriple<'_>,
    ctx: &ExecContext<'_>,
) -> Result<(), PanelError>
where
    DSI: DsiDevice,
    I2C: I2c,
    SPI: SpiDevice,
    D: DelayNs,
{
    if let Some(bus) = buses.i2c.as_mut() {
        run_program(bus, packer, delay, programs.i2c, ctx).await?;
    }
    if let Some(bus) = buses.mipi.as_mut() {
        run_program(bus, packer, delay, programs.mipi, ctx).await?;
    }
    if let Some(bus) = buses.spi.as_mut() {
        run_program(bus, packer, delay, programs.spi, ctx).await?;
    }
    Ok(())
}
