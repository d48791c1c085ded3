//! Opcode byte values and decoding
//!
//! Every step of a program starts with one opcode byte. Bit 7 is the
//! "generic" flag (MIPI generic vs DCS packets); the low 7 bits select the
//! operation:
//!
//! | Value | Operation | Body |
//! |---|---|---|
//! | `0x00..=0x3b` | inline write | that many payload bytes |
//! | `0x3c` | delay | 1 byte, milliseconds |
//! | `0x3d` | max return packet size | 1 byte |
//! | `0x3e` | long write | length byte + payload |
//! | `0x3f` | scratch write | length byte |
//! | `0x40..=0x47` | read 1..8 bytes and compare | cmd (1 DCS / 2 generic) + expected |
//! | `0x48..=0x4b` | lane filter 1..4 | none |
//! | `0x4c` | constant substitution | dest_start, dest_len, 4 LE value bytes |
//! | `0x4d..=0x54` | timing substitution | dest_start, dest_len, src_start |
//!
//! Lane filters are matched on the raw byte, so a lane filter with the
//! generic flag set is not an opcode.

// Offsets are only computed inside the matching range arms.
#![allow(clippy::arithmetic_side_effects)]

use panel_specs::TimingField;

/// Generic flag.
pub const GENERIC: u8 = 0x80;

/// Largest inline payload length.
pub const MAX_INLINE: u8 = 0x3b;

/// Delay in milliseconds.
pub const S_DELAY: u8 = 0x3c;
/// Maximum return packet size.
pub const S_MRPS: u8 = 0x3d;
/// Explicit-length write.
pub const S_DCS_LENGTH: u8 = 0x3e;
/// Write from the scratch command buffer.
pub const S_DCS_BUF: u8 = 0x3f;
/// Read one byte and compare.
pub const S_DCS_READ1: u8 = 0x40;
/// Read two bytes and compare.
pub const S_DCS_READ2: u8 = 0x41;
/// Read three bytes and compare.
pub const S_DCS_READ3: u8 = 0x42;
/// Read four bytes and compare.
pub const S_DCS_READ4: u8 = 0x43;
/// Read five bytes and compare.
pub const S_DCS_READ5: u8 = 0x44;
/// Read six bytes and compare.
pub const S_DCS_READ6: u8 = 0x45;
/// Read seven bytes and compare.
pub const S_DCS_READ7: u8 = 0x46;
/// Read eight bytes and compare.
pub const S_DCS_READ8: u8 = 0x47;
/// Skip the next step unless one lane is active.
pub const S_IF_1_LANE: u8 = 0x48;
/// Skip the next step unless two lanes are active.
pub const S_IF_2_LANES: u8 = 0x49;
/// Skip the next step unless three lanes are active.
pub const S_IF_3_LANES: u8 = 0x4a;
/// Skip the next step unless four lanes are active.
pub const S_IF_4_LANES: u8 = 0x4b;
/// Substitute a constant.
pub const S_CONST: u8 = 0x4c;
/// Substitute horizontal sync length.
pub const S_HSYNC: u8 = 0x4d;
/// Substitute horizontal back porch.
pub const S_HBP: u8 = 0x4e;
/// Substitute horizontal active pixels.
pub const S_HACTIVE: u8 = 0x4f;
/// Substitute horizontal front porch.
pub const S_HFP: u8 = 0x50;
/// Substitute vertical sync length.
pub const S_VSYNC: u8 = 0x51;
/// Substitute vertical back porch.
pub const S_VBP: u8 = 0x52;
/// Substitute vertical active lines.
pub const S_VACTIVE: u8 = 0x53;
/// Substitute vertical front porch.
pub const S_VFP: u8 = 0x54;

/// A decoded opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Op {
    /// Payload of `len` bytes follows the opcode.
    Inline {
        /// MIPI generic packet
        generic: bool,
        /// Payload length
        len: u8,
    },
    /// A length byte and the payload follow.
    DcsLength {
        /// MIPI generic packet
        generic: bool,
    },
    /// A length byte follows; the payload comes from the scratch buffer.
    DcsBuf {
        /// MIPI generic packet
        generic: bool,
    },
    /// Sleep.
    Delay,
    /// Set the MIPI maximum return packet size.
    MaxReturnPacketSize,
    /// Read `len` bytes and compare.
    Read {
        /// MIPI generic read (two command bytes)
        generic: bool,
        /// Number of bytes read (1..=8)
        len: u8,
    },
    /// Guard the next step on the DSI lane count.
    LaneFilter(u8),
    /// Write an immediate into the scratch buffer.
    Const,
    /// Write a derived timing field into the scratch buffer.
    Timing(TimingField),
}

impl Op {
    /// Decode an opcode byte.
    pub const fn decode(byte: u8) -> Option<Self> {
        // Lane filters compare the whole byte.
        if byte >= S_IF_1_LANE && byte <= S_IF_4_LANES {
            return Some(Self::LaneFilter(byte - S_IF_1_LANE + 1));
        }
        let generic = byte & GENERIC != 0;
        let op = byte & !GENERIC;
        Some(match op {
            0..=MAX_INLINE => Self::Inline { generic, len: op },
            S_DELAY => Self::Delay,
            S_MRPS => Self::MaxReturnPacketSize,
            S_DCS_LENGTH => Self::DcsLength { generic },
            S_DCS_BUF => Self::DcsBuf { generic },
            S_DCS_READ1..=S_DCS_READ8 => Self::Read {
                generic,
                len: op - S_DCS_READ1 + 1,
            },
            S_CONST => Self::Const,
            S_HSYNC => Self::Timing(TimingField::HSync),
            S_HBP => Self::Timing(TimingField::HBackPorch),
            S_HACTIVE => Self::Timing(TimingField::HActive),
            S_HFP => Self::Timing(TimingField::HFrontPorch),
            S_VSYNC => Self::Timing(TimingField::VSync),
            S_VBP => Self::Timing(TimingField::VBackPorch),
            S_VACTIVE => Self::Timing(TimingField::VActive),
            S_VFP => Self::Timing(TimingField::VFrontPorch),
            _ => return None,
        })
    }

    /// Encode back into an opcode byte.
    ///
    /// Returns `None` for values that have no encoding (inline length above
    /// [`MAX_INLINE`], read length outside 1..=8, lane count outside 1..=4).
    pub const fn encode(self) -> Option<u8> {
        const fn flag(generic: bool) -> u8 {
            if generic {
                GENERIC
            } else {
                0
            }
        }
        Some(match self {
            Self::Inline { generic, len } if len <= MAX_INLINE => len | flag(generic),
            Self::DcsLength { generic } => S_DCS_LENGTH | flag(generic),
            Self::DcsBuf { generic } => S_DCS_BUF | flag(generic),
            Self::Delay => S_DELAY,
            Self::MaxReturnPacketSize => S_MRPS,
            Self::Read { generic, len } if len >= 1 && len <= 8 => {
                (S_DCS_READ1 + len - 1) | flag(generic)
            }
            Self::LaneFilter(lanes) if lanes >= 1 && lanes <= 4 => S_IF_1_LANE + lanes - 1,
            Self::Const => S_CONST,
            Self::Timing(field) => match field {
                TimingField::HSync => S_HSYNC,
                TimingField::HBackPorch => S_HBP,
                TimingField::HActive => S_HACTIVE,
                TimingField::HFrontPorch => S_HFP,
                TimingField::VSync => S_VSYNC,
                TimingField::VBackPorch => S_VBP,
                TimingField::VActive => S_VACTIVE,
                TimingField::VFrontPorch => S_VFP,
            },
            _ => return None,
        })
    }

    /// Whether the step writes payload bytes to the bus.
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::Inline { .. } | Self::DcsLength { .. } | Self::DcsBuf { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inline() {
        assert_eq!(Op::decode(0x00), Some(Op::Inline { generic: false, len: 0 }));
        assert_eq!(Op::decode(0x02), Some(Op::Inline { generic: false, len: 2 }));
        assert_eq!(Op::decode(0xbb), Some(Op::Inline { generic: true, len: 0x3b }));
    }

    #[test]
    fn test_decode_control() {
        assert_eq!(Op::decode(S_DELAY), Some(Op::Delay));
        assert_eq!(Op::decode(S_MRPS), Some(Op::MaxReturnPacketSize));
        assert_eq!(Op::decode(S_DCS_BUF | GENERIC), Some(Op::DcsBuf { generic: true }));
        assert_eq!(Op::decode(0x41), Some(Op::Read { generic: false, len: 2 }));
        assert_eq!(Op::decode(0xc7), Some(Op::Read { generic: true, len: 8 }));
        assert_eq!(Op::decode(S_IF_4_LANES), Some(Op::LaneFilter(4)));
        assert_eq!(Op::decode(S_HACTIVE), Some(Op::Timing(TimingField::HActive)));
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(Op::decode(0x55), None);
        assert_eq!(Op::decode(0x7f), None);
        // Lane filters do not accept the generic flag.
        assert_eq!(Op::decode(S_IF_1_LANE | GENERIC), None);
    }

    #[test]
    fn test_every_opcode_reencodes() {
        for byte in 0..=u8::MAX {
            if let Some(op) = Op::decode(byte) {
                let encoded = op.encode().unwrap();
                // The generic flag is dropped on ops that ignore it.
                assert_eq!(Op::decode(encoded), Some(op), "byte 0x{byte:02x}");
            }
        }
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert_eq!(Op::Inline { generic: false, len: 0x3c }.encode(), None);
        assert_eq!(Op::Read { generic: false, len: 0 }.encode(), None);
        assert_eq!(Op::Read { generic: false, len: 9 }.encode(), None);
        assert_eq!(Op::LaneFilter(5).encode(), None);
    }
}
