//! Command programs
//!
//! A [`Program`] is an immutable byte stream of steps (see [`crate::opcode`]
//! for the encoding). [`Program::steps`] decodes it lazily into [`Step`]s
//! that borrow their payloads from the stream, so programs can live in flash
//! as plain `&'static [u8]`.
//!
//! Each panel carries three programs per side-band bus, grouped as a
//! [`ProgramTriple`], and three triples per lifecycle, grouped as a
//! [`ProgramSet`].

use heapless::Vec;
use panel_specs::TimingField;

use crate::error::PanelError;
use crate::opcode::{self, Op};

/// One decoded step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step<'a> {
    /// Send `payload` (inline or explicit-length write).
    Write {
        /// MIPI generic packet
        generic: bool,
        /// Bytes to send
        payload: &'a [u8],
    },
    /// Send the first `len` bytes of the scratch command buffer.
    WriteScratch {
        /// MIPI generic packet
        generic: bool,
        /// Requested length, clamped to the buffer at execution
        len: u8,
    },
    /// Sleep for the given number of milliseconds.
    Delay(u8),
    /// Set the MIPI maximum return packet size.
    MaxReturnPacketSize(u8),
    /// Read `expected.len()` bytes with command `cmd` and compare.
    Read {
        /// MIPI generic read
        generic: bool,
        /// Command bytes (1 for DCS, 2 for generic)
        cmd: &'a [u8],
        /// Expected reply, little-endian
        expected: &'a [u8],
    },
    /// Skip the next step unless this many lanes are active.
    LaneFilter(u8),
    /// Write `value` into the scratch buffer.
    Const {
        /// First destination bit
        dest_start: u8,
        /// Number of bits written
        dest_len: u8,
        /// Immediate value
        value: u32,
    },
    /// Write a derived timing field into the scratch buffer.
    Timing {
        /// Source field
        field: TimingField,
        /// First destination bit
        dest_start: u8,
        /// Number of bits written
        dest_len: u8,
        /// Bits dropped from the bottom of the field first
        src_start: u8,
    },
}

/// A command program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Program<'a> {
    bytes: &'a [u8],
}

impl<'a> Program<'a> {
    /// The empty program.
    pub const EMPTY: Program<'static> = Program { bytes: &[] };

    /// Wrap a byte stream. Nothing is checked until [`Program::validate`]
    /// or execution.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Whether the program has no steps.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The raw byte stream.
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decode the program step by step.
    ///
    /// Yields `(offset, step)` pairs where `offset` is the byte position of
    /// the opcode. The first structural error is yielded once, after which
    /// the iterator is exhausted.
    pub fn steps(&self) -> Steps<'a> {
        Steps {
            bytes: self.bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Check that the whole program decodes.
    pub fn validate(&self) -> Result<(), PanelError> {
        self.steps().try_for_each(|step| step.map(|_| ()))
    }

    /// Number of steps, or the first structural error.
    pub fn step_count(&self) -> Result<usize, PanelError> {
        self.steps()
            .try_fold(0usize, |count, step| step.map(|_| count.saturating_add(1)))
    }
}

impl<'a> From<&'a [u8]> for Program<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

/// Iterator over the steps of a [`Program`]
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Steps<'a> {
    fn slice_at(&self, start: usize, len: usize) -> Option<&'a [u8]> {
        let end = start.checked_add(len)?;
        self.bytes.get(start..end)
    }

    fn decode(&mut self) -> Result<(Step<'a>, usize), PanelError> {
        let offset = self.offset;
        let truncated = PanelError::Truncated { offset };
        let op_byte = *self.bytes.get(offset).ok_or(truncated)?;
        let op = Op::decode(op_byte).ok_or(PanelError::UnknownOpcode { offset, op: op_byte })?;
        let body = offset.saturating_add(1);

        let one = |steps: &Self| -> Result<u8, PanelError> {
            steps.slice_at(body, 1).and_then(<[u8]>::first).copied().ok_or(truncated)
        };

        let (step, body_len) = match op {
            Op::Inline { generic, len } => {
                let payload = self.slice_at(body, usize::from(len)).ok_or(truncated)?;
                (Step::Write { generic, payload }, usize::from(len))
            }
            Op::DcsLength { generic } => {
                let len = usize::from(one(self)?);
                let payload = self
                    .slice_at(body.saturating_add(1), len)
                    .ok_or(truncated)?;
                (Step::Write { generic, payload }, len.saturating_add(1))
            }
            Op::DcsBuf { generic } => (Step::WriteScratch { generic, len: one(self)? }, 1),
            Op::Delay => (Step::Delay(one(self)?), 1),
            Op::MaxReturnPacketSize => (Step::MaxReturnPacketSize(one(self)?), 1),
            Op::Read { generic, len } => {
                let cmd_len = if generic { 2 } else { 1 };
                let cmd = self.slice_at(body, cmd_len).ok_or(truncated)?;
                let expected = self
                    .slice_at(body.saturating_add(cmd_len), usize::from(len))
                    .ok_or(truncated)?;
                let step = Step::Read {
                    generic,
                    cmd,
                    expected,
                };
                (step, cmd_len.saturating_add(usize::from(len)))
            }
            Op::LaneFilter(lanes) => (Step::LaneFilter(lanes), 0),
            Op::Const => match self.slice_at(body, 6).ok_or(truncated)? {
                &[dest_start, dest_len, b0, b1, b2, b3] => (
                    Step::Const {
                        dest_start,
                        dest_len,
                        value: u32::from_le_bytes([b0, b1, b2, b3]),
                    },
                    6,
                ),
                _ => return Err(truncated),
            },
            Op::Timing(field) => match self.slice_at(body, 3).ok_or(truncated)? {
                &[dest_start, dest_len, src_start] => (
                    Step::Timing {
                        field,
                        dest_start,
                        dest_len,
                        src_start,
                    },
                    3,
                ),
                _ => return Err(truncated),
            },
        };
        Ok((step, body.saturating_add(body_len)))
    }
}

impl<'a> Iterator for Steps<'a> {
    type Item = Result<(usize, Step<'a>), PanelError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        match self.decode() {
            Ok((step, next)) => {
                self.offset = next;
                Some(Ok((offset, step)))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl core::iter::FusedIterator for Steps<'_> {}

/// The programs of one lifecycle phase, one per side-band bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramTriple<'a> {
    /// Runs first, over I²C
    pub i2c: Program<'a>,
    /// Runs second, over the DSI command channel
    pub mipi: Program<'a>,
    /// Runs last, over SPI
    pub spi: Program<'a>,
}

impl<'a> ProgramTriple<'a> {
    /// No programs on any bus.
    pub const EMPTY: ProgramTriple<'static> = ProgramTriple {
        i2c: Program::EMPTY,
        mipi: Program::EMPTY,
        spi: Program::EMPTY,
    };

    /// Only a DSI program.
    pub const fn mipi(program: Program<'a>) -> Self {
        Self {
            i2c: Program::new(&[]),
            mipi: program,
            spi: Program::new(&[]),
        }
    }

    /// Only an I²C program.
    pub const fn i2c(program: Program<'a>) -> Self {
        Self {
            i2c: program,
            mipi: Program::new(&[]),
            spi: Program::new(&[]),
        }
    }

    /// Only an SPI program.
    pub const fn spi(program: Program<'a>) -> Self {
        Self {
            i2c: Program::new(&[]),
            mipi: Program::new(&[]),
            spi: program,
        }
    }

    /// Check all three programs.
    pub fn validate(&self) -> Result<(), PanelError> {
        self.i2c.validate()?;
        self.mipi.validate()?;
        self.spi.validate()
    }

    /// Whether no bus has anything to run.
    pub const fn is_empty(&self) -> bool {
        self.i2c.is_empty() && self.mipi.is_empty() && self.spi.is_empty()
    }
}

/// Programs run by the lifecycle driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramSet<'a> {
    /// Run during prepare, after the panel is powered and out of reset
    pub init: ProgramTriple<'a>,
    /// Run during enable, before the backlight comes on
    pub enable: ProgramTriple<'a>,
    /// Run during disable, after the backlight is off
    pub disable: ProgramTriple<'a>,
}

impl ProgramSet<'_> {
    /// No programs at all.
    pub const EMPTY: ProgramSet<'static> = ProgramSet {
        init: ProgramTriple::EMPTY,
        enable: ProgramTriple::EMPTY,
        disable: ProgramTriple::EMPTY,
    };

    /// Check every program.
    pub fn validate(&self) -> Result<(), PanelError> {
        self.init.validate()?;
        self.enable.validate()?;
        self.disable.validate()
    }

    /// Whether any phase has an I²C program.
    pub const fn uses_i2c(&self) -> bool {
        !(self.init.i2c.is_empty() && self.enable.i2c.is_empty() && self.disable.i2c.is_empty())
    }

    /// Whether any phase has a DSI program.
    pub const fn uses_mipi(&self) -> bool {
        !(self.init.mipi.is_empty()
            && self.enable.mipi.is_empty()
            && self.disable.mipi.is_empty())
    }

    /// Whether any phase has an SPI program.
    pub const fn uses_spi(&self) -> bool {
        !(self.init.spi.is_empty() && self.enable.spi.is_empty() && self.disable.spi.is_empty())
    }
}

/// Assembles a program into a fixed-capacity buffer
///
/// Methods chain; a step that does not fit (or cannot be encoded) marks the
/// builder as overflowed and [`ProgramBuilder::build`] reports
/// [`PanelError::Overflow`].
///
/// ```
/// use panel::program::ProgramBuilder;
///
/// let mut b = ProgramBuilder::<32>::new();
/// b.dcs(&[0x11]).delay(120).dcs(&[0x29]);
/// let program = b.build().unwrap();
/// assert_eq!(program.as_bytes(), &[0x01, 0x11, 0x3c, 120, 0x01, 0x29]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder<const N: usize> {
    bytes: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> ProgramBuilder<N> {
    /// An empty builder.
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            overflowed: false,
        }
    }

    fn op(&mut self, op: Op, body: &[&[u8]]) -> &mut Self {
        let Some(byte) = op.encode() else {
            self.overflowed = true;
            return self;
        };
        if self.bytes.push(byte).is_err() {
            self.overflowed = true;
        }
        for part in body {
            if self.bytes.extend_from_slice(part).is_err() {
                self.overflowed = true;
            }
        }
        self
    }

    fn write(&mut self, generic: bool, payload: &[u8]) -> &mut Self {
        match u8::try_from(payload.len()) {
            Ok(len) if len <= opcode::MAX_INLINE => self.op(Op::Inline { generic, len }, &[payload]),
            Ok(len) => self.op(Op::DcsLength { generic }, &[&[len], payload]),
            Err(_) => {
                self.overflowed = true;
                self
            }
        }
    }

    /// DCS write (inline or explicit length, whichever fits).
    pub fn dcs(&mut self, payload: &[u8]) -> &mut Self {
        self.write(false, payload)
    }

    /// Generic write (inline or explicit length, whichever fits).
    pub fn generic(&mut self, payload: &[u8]) -> &mut Self {
        self.write(true, payload)
    }

    /// DCS write of the first `len` scratch buffer bytes.
    pub fn dcs_buf(&mut self, len: u8) -> &mut Self {
        self.op(Op::DcsBuf { generic: false }, &[&[len]])
    }

    /// Generic write of the first `len` scratch buffer bytes.
    pub fn generic_buf(&mut self, len: u8) -> &mut Self {
        self.op(Op::DcsBuf { generic: true }, &[&[len]])
    }

    /// Sleep `ms` milliseconds.
    pub fn delay(&mut self, ms: u8) -> &mut Self {
        self.op(Op::Delay, &[&[ms]])
    }

    /// Set the maximum return packet size.
    pub fn mrps(&mut self, size: u8) -> &mut Self {
        self.op(Op::MaxReturnPacketSize, &[&[size]])
    }

    /// DCS read of `cmd`, expecting `expected` (1..=8 bytes).
    pub fn dcs_read(&mut self, cmd: u8, expected: &[u8]) -> &mut Self {
        self.read(false, &[cmd], expected)
    }

    /// Generic read with request `params`, expecting `expected` (1..=8 bytes).
    pub fn generic_read(&mut self, params: [u8; 2], expected: &[u8]) -> &mut Self {
        self.read(true, &params, expected)
    }

    fn read(&mut self, generic: bool, cmd: &[u8], expected: &[u8]) -> &mut Self {
        let len = u8::try_from(expected.len()).unwrap_or(0);
        self.op(Op::Read { generic, len }, &[cmd, expected])
    }

    /// Guard the next step on `lanes` active DSI lanes (1..=4).
    pub fn if_lanes(&mut self, lanes: u8) -> &mut Self {
        self.op(Op::LaneFilter(lanes), &[])
    }

    /// Write `dest_len` bits of `value` at scratch bit `dest_start`.
    pub fn constant(&mut self, dest_start: u8, dest_len: u8, value: u32) -> &mut Self {
        self.op(Op::Const, &[&[dest_start, dest_len], &value.to_le_bytes()])
    }

    /// Write `dest_len` bits of `field >> src_start` at scratch bit `dest_start`.
    pub fn timing(&mut self, field: TimingField, dest_start: u8, dest_len: u8, src_start: u8) -> &mut Self {
        self.op(Op::Timing(field), &[&[dest_start, dest_len, src_start]])
    }

    /// The assembled program, borrowing the builder.
    pub fn build(&self) -> Result<Program<'_>, PanelError> {
        if self.overflowed {
            return Err(PanelError::Overflow);
        }
        let program = Program::new(&self.bytes);
        program.validate()?;
        Ok(program)
    }

    /// Bytes assembled so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::opcode::*;

    fn collect(bytes: &[u8]) -> std::vec::Vec<Result<(usize, Step<'_>), PanelError>> {
        Program::new(bytes).steps().collect()
    }

    #[test]
    fn test_minimal_init_decodes() {
        let bytes = [0x02, 0x11, 0x00, S_DELAY, 120, 0x01, 0x29];
        let expected: [Result<(usize, Step<'_>), PanelError>; 3] = [
            Ok((0, Step::Write { generic: false, payload: &[0x11, 0x00] })),
            Ok((3, Step::Delay(120))),
            Ok((5, Step::Write { generic: false, payload: &[0x29] })),
        ];
        assert_eq!(collect(&bytes), expected);
    }

    #[test]
    fn test_control_bodies() {
        #[rustfmt::skip]
        let bytes = [
            S_DCS_LENGTH | GENERIC, 3, 0xB0, 0x01, 0x02,
            S_DCS_BUF, 4,
            S_MRPS, 2,
            0xc1, 0xDA, 0x01, 0x85, 0x22,
            S_IF_2_LANES,
            S_CONST, 8, 16, 0x78, 0x56, 0x34, 0x12,
            S_VFP, 0, 8, 1,
        ];
        let steps: std::vec::Vec<_> = collect(&bytes).into_iter().map(|s| s.unwrap().1).collect();
        assert_eq!(
            steps,
            [
                Step::Write { generic: true, payload: &[0xB0, 0x01, 0x02] },
                Step::WriteScratch { generic: false, len: 4 },
                Step::MaxReturnPacketSize(2),
                Step::Read { generic: true, cmd: &[0xDA, 0x01], expected: &[0x85, 0x22] },
                Step::LaneFilter(2),
                Step::Const { dest_start: 8, dest_len: 16, value: 0x1234_5678 },
                Step::Timing {
                    field: TimingField::VFrontPorch,
                    dest_start: 0,
                    dest_len: 8,
                    src_start: 1,
                },
            ]
        );
    }

    #[test]
    fn test_truncated_reports_step_offset() {
        // Second step wants 3 payload bytes, only 2 remain.
        let bytes = [0x01, 0x29, 0x03, 0xAA, 0xBB];
        let steps = collect(&bytes);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1], Err(PanelError::Truncated { offset: 2 }));

        assert_eq!(
            Program::new(&[S_DELAY]).validate(),
            Err(PanelError::Truncated { offset: 0 })
        );
        assert_eq!(
            Program::new(&[S_DCS_READ2, 0x04, 0x85]).validate(),
            Err(PanelError::Truncated { offset: 0 })
        );
        assert_eq!(
            Program::new(&[S_CONST, 0, 8, 1, 2, 3]).validate(),
            Err(PanelError::Truncated { offset: 0 })
        );
    }

    #[test]
    fn test_steps_compose_with_iterator_adapters() {
        let bytes = [0x02, 0x11, 0x00, S_DCS_READ1, 0x0a, 0x9c, 0x01, 0x29];
        let first_two: std::vec::Vec<_> = Program::new(&bytes).steps().take(2).map(|s| s.unwrap().1).collect();
        assert_eq!(
            first_two,
            [
                Step::Write { generic: false, payload: &[0x11, 0x00] },
                Step::Read { generic: false, cmd: &[0x0a], expected: &[0x9c] },
            ]
        );
        let last = Program::new(&bytes).steps().skip(2).next();
        assert_eq!(last, Some(Ok((6, Step::Write { generic: false, payload: &[0x29] }))));
    }

    #[test]
    fn test_unknown_opcode_stops_iteration() {
        let bytes = [0x01, 0x29, 0x60, 0x01, 0x29];
        let steps = collect(&bytes);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1], Err(PanelError::UnknownOpcode { offset: 2, op: 0x60 }));
    }

    #[test]
    fn test_empty_program() {
        assert!(Program::EMPTY.is_empty());
        assert_eq!(Program::EMPTY.steps().count(), 0);
        assert_eq!(Program::EMPTY.validate(), Ok(()));
        // A zero-length write is a valid one-byte step.
        assert_eq!(Program::new(&[0x00]).step_count(), Ok(1));
    }

    #[test]
    fn test_builder_switches_to_explicit_length() {
        let long = [0x5Au8; 0x40];
        let mut b = ProgramBuilder::<80>::new();
        b.generic(&long);
        let program = b.build().unwrap();
        assert_eq!(program.as_bytes()[..2], [S_DCS_LENGTH | GENERIC, 0x40]);
        assert_eq!(program.len(), 0x42);
        assert_eq!(program.step_count(), Ok(1));
    }

    #[test]
    fn test_builder_matches_hand_encoding() {
        let mut b = ProgramBuilder::<64>::new();
        b.if_lanes(4)
            .dcs(&[0xAA, 0x01])
            .dcs_read(0x04, &[0x85, 0x22])
            .timing(TimingField::HActive, 0, 16, 0)
            .dcs_buf(2)
            .constant(16, 8, 0xFF)
            .mrps(4);
        #[rustfmt::skip]
        let expected = [
            S_IF_4_LANES,
            0x02, 0xAA, 0x01,
            S_DCS_READ2, 0x04, 0x85, 0x22,
            S_HACTIVE, 0, 16, 0,
            S_DCS_BUF, 2,
            S_CONST, 16, 8, 0xFF, 0, 0, 0,
            S_MRPS, 4,
        ];
        assert_eq!(b.as_bytes(), &expected);
        assert!(b.build().is_ok());
    }

    #[test]
    fn test_builder_overflow() {
        let mut b = ProgramBuilder::<4>::new();
        b.dcs(&[1, 2, 3, 4]);
        assert_eq!(b.build(), Err(PanelError::Overflow));

        let mut b = ProgramBuilder::<16>::new();
        b.dcs_read(0x0A, &[0; 9]);
        assert_eq!(b.build(), Err(PanelError::Overflow));

        let mut b = ProgramBuilder::<16>::new();
        b.if_lanes(0);
        assert_eq!(b.build(), Err(PanelError::Overflow));
    }

    #[test]
    fn test_program_set_bus_usage() {
        static INIT: [u8; 2] = [0x01, 0x11];
        let set = ProgramSet {
            init: ProgramTriple::i2c(Program::new(&INIT)),
            ..ProgramSet::EMPTY
        };
        assert!(set.uses_i2c());
        assert!(!set.uses_mipi());
        assert!(!set.uses_spi());
        assert_eq!(set.validate(), Ok(()));
    }
}
