//! Transmit/receive scratch with a bit cursor
//!
//! SPI panels that use 9-bit framing send a D/C bit in front of every byte,
//! so a command no longer lines up with byte boundaries. [`BitPacker`]
//! accumulates such a stream MSB-first into a 64-byte transmit buffer,
//! hands out the padded frame for one SPI transfer, and pulls bit-aligned
//! read data back out of the receive buffer.
//!
//! ```text
//! store_9bit([0xB0, 0x02]):  0 1011_0000  1 0000_0010
//!                            │            └─ data tag
//!                            └─ command tag
//! ```
//!
//! The packer never touches a bus. Flushing is the SPI adapter's job; the
//! packer only answers whether more bits fit.

// Every store checks `cursor + n <= SCRATCH_BITS` before writing, and
// `extract` checks `start + 8 * len <= SCRATCH_BITS`, so every bit index
// used below is < 512 and every byte index < 64.
#![allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use crate::error::PanelError;

/// Transmit/receive scratch size in bytes.
pub const SCRATCH_LEN: usize = 64;

/// Transmit/receive scratch size in bits.
pub const SCRATCH_BITS: usize = SCRATCH_LEN * 8;

/// Bits one byte occupies in a 9-bit framed stream.
pub const NINE_BIT_WIDTH: usize = 9;

/// Bit-granular transmit buffer plus its receive twin.
#[derive(Debug, Clone)]
pub struct BitPacker {
    tx: [u8; SCRATCH_LEN],
    rx: [u8; SCRATCH_LEN],
    cursor: usize,
}

impl Default for BitPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl BitPacker {
    /// An empty packer.
    pub const fn new() -> Self {
        Self {
            tx: [0; SCRATCH_LEN],
            rx: [0; SCRATCH_LEN],
            cursor: 0,
        }
    }

    /// Number of bits currently held.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether nothing is pending.
    pub const fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Whether `bits` more bits fit without a flush.
    pub const fn has_room(&self, bits: usize) -> bool {
        match self.cursor.checked_add(bits) {
            Some(end) => end <= SCRATCH_BITS,
            None => false,
        }
    }

    /// Drop everything pending.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    fn put_bit(&mut self, bit: bool) {
        let mask = 0x80u8 >> (self.cursor % 8);
        let byte = &mut self.tx[self.cursor / 8];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.cursor += 1;
    }

    fn put_byte(&mut self, value: u8) {
        for shift in (0..8).rev() {
            self.put_bit((value >> shift) & 1 != 0);
        }
    }

    /// Append `bytes` as a byte-aligned run.
    ///
    /// Fails with [`PanelError::Misaligned`] if a 9-bit stream left the
    /// cursor mid-byte, and with [`PanelError::Overflow`] if the run does not
    /// fit.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        if self.cursor % 8 != 0 {
            return Err(PanelError::Misaligned);
        }
        if !self.has_room(bytes.len().saturating_mul(8)) {
            return Err(PanelError::Overflow);
        }
        let start = self.cursor / 8;
        self.tx[start..start + bytes.len()].copy_from_slice(bytes);
        self.cursor += bytes.len() * 8;
        Ok(())
    }

    /// Append `bytes` with 9-bit framing.
    ///
    /// The first byte gets a `0` (command) tag bit, every following byte a
    /// `1` (data) tag bit. Fails with [`PanelError::Overflow`] if the run does
    /// not fit; the caller decides whether a flush makes room.
    pub fn store_9bit(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        if !self.has_room(bytes.len().saturating_mul(NINE_BIT_WIDTH)) {
            return Err(PanelError::Overflow);
        }
        for (i, &byte) in bytes.iter().enumerate() {
            self.put_bit(i != 0);
            self.put_byte(byte);
        }
        Ok(())
    }

    /// Append `bits` idle-high bits (SCLK keeps running while the panel
    /// shifts out its reply).
    pub fn store_high(&mut self, bits: usize) -> Result<(), PanelError> {
        if !self.has_room(bits) {
            return Err(PanelError::Overflow);
        }
        for _ in 0..bits {
            self.put_bit(true);
        }
        Ok(())
    }

    /// Length in bytes of the frame a flush would put on the wire.
    pub const fn frame_len(&self) -> usize {
        self.cursor.div_ceil(8)
    }

    fn pad(&mut self) {
        let end = self.frame_len() * 8;
        let cursor = self.cursor;
        while self.cursor < end {
            self.put_bit(true);
        }
        self.cursor = cursor;
    }

    /// Pending bits as whole bytes, the last one padded with `1` bits.
    pub fn frame(&mut self) -> &[u8] {
        self.pad();
        &self.tx[..self.frame_len()]
    }

    /// Padded transmit frame and an equally long receive window, for a
    /// full-duplex transfer.
    pub fn duplex(&mut self) -> (&[u8], &mut [u8]) {
        self.pad();
        let len = self.frame_len();
        (&self.tx[..len], &mut self.rx[..len])
    }

    /// Copy `dst.len()` bytes out of the receive buffer, starting at bit
    /// `start_bit` (MSB-first).
    pub fn extract(&self, start_bit: usize, dst: &mut [u8]) -> Result<(), PanelError> {
        let end = dst
            .len()
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(start_bit))
            .ok_or(PanelError::Overflow)?;
        if end > SCRATCH_BITS {
            return Err(PanelError::Overflow);
        }
        let mut bit = start_bit;
        for out in dst.iter_mut() {
            let mut value = 0u8;
            for _ in 0..8 {
                let set = self.rx[bit / 8] & (0x80 >> (bit % 8)) != 0;
                value = (value << 1) | u8::from(set);
                bit += 1;
            }
            *out = value;
        }
        Ok(())
    }

    /// Receive buffer, for adapters that fill it directly.
    pub fn rx_mut(&mut self) -> &mut [u8; SCRATCH_LEN] {
        &mut self.rx
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_bytes_aligned() {
        let mut p = BitPacker::new();
        p.store_bytes(&[0x11, 0x29]).unwrap();
        assert_eq!(p.cursor(), 16);
        assert_eq!(p.frame(), &[0x11, 0x29]);
    }

    #[test]
    fn test_store_bytes_rejects_misaligned_cursor() {
        let mut p = BitPacker::new();
        p.store_9bit(&[0x01]).unwrap();
        assert_eq!(p.store_bytes(&[0x02]), Err(PanelError::Misaligned));
    }

    #[test]
    fn test_9bit_tags_first_byte_as_command() {
        let mut p = BitPacker::new();
        // 0 10110000 1 00000010 -> 0101_1000 0100_0000 10(pad 111111)
        p.store_9bit(&[0xB0, 0x02]).unwrap();
        assert_eq!(p.cursor(), 18);
        assert_eq!(p.frame(), &[0x58, 0x40, 0xBF]);
    }

    #[test]
    fn test_9bit_calls_concatenate() {
        let mut p = BitPacker::new();
        p.store_9bit(&[0xB0]).unwrap();
        p.store_9bit(&[0xB1]).unwrap();
        // 0 10110000 0 10110001 -> 0101_1000 0010_1100 01(pad 111111)
        assert_eq!(p.frame(), &[0x58, 0x2C, 0x7F]);
    }

    #[test]
    fn test_frame_padding_does_not_move_cursor() {
        let mut p = BitPacker::new();
        p.store_9bit(&[0x00]).unwrap();
        assert_eq!(p.frame(), &[0x00, 0x7F]);
        assert_eq!(p.cursor(), 9);
        // Later bits overwrite the padding.
        p.store_9bit(&[0x00]).unwrap();
        assert_eq!(p.frame(), &[0x00, 0x00, 0x3F]);
    }

    #[test]
    fn test_store_high() {
        let mut p = BitPacker::new();
        p.store_9bit(&[0x0A]).unwrap();
        p.store_high(16).unwrap();
        assert_eq!(p.cursor(), 25);
        // 0 00001010 1111111111111111 -> 0000_0101 0111_1111 1111_1111 1(pad)
        assert_eq!(p.frame(), &[0x05, 0x7F, 0xFF, 0xFF]);
    }

    #[test]
    fn test_capacity_limits() {
        let mut p = BitPacker::new();
        // 56 framed bytes = 504 bits fit, 57 = 513 bits do not.
        assert!(p.store_9bit(&[0u8; 57]).is_err());
        assert!(p.is_empty());
        p.store_9bit(&[0u8; 56]).unwrap();
        assert!(p.has_room(8));
        assert!(!p.has_room(9));
        assert_eq!(p.store_high(9), Err(PanelError::Overflow));
    }

    #[test]
    fn test_extract_unaligned() {
        let mut p = BitPacker::new();
        // Reply 0x85 0x22 starting at bit 9.
        let rx = p.rx_mut();
        rx[1] = 0x42; // 0 1000010
        rx[2] = 0x91; // 1 0010001
        rx[3] = 0x00; // 0
        let mut out = [0u8; 2];
        p.extract(9, &mut out).unwrap();
        assert_eq!(out, [0x85, 0x22]);
    }

    #[test]
    fn test_extract_bounds() {
        let p = BitPacker::new();
        let mut out = [0u8; 2];
        assert!(p.extract(SCRATCH_BITS - 16, &mut out).is_ok());
        assert_eq!(p.extract(SCRATCH_BITS - 15, &mut out), Err(PanelError::Overflow));
    }

    #[test]
    fn test_duplex_windows_match() {
        let mut p = BitPacker::new();
        p.store_bytes(&[0x0A]).unwrap();
        p.store_high(16).unwrap();
        let (tx, rx) = p.duplex();
        assert_eq!(tx, &[0x0A, 0xFF, 0xFF]);
        assert_eq!(rx.len(), 3);
    }
}
