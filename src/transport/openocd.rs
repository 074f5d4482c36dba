//! OpenOCD command rendering.

use std::fmt;

use super::ShiftOrder;
use crate::scan::ScanVector;

/// Encode a vector as the hex value of an OpenOCD `drscan` field.
///
/// OpenOCD shifts the value LSB first. With [`ShiftOrder::Cell0First`] cell
/// 0 is the LSB; with [`ShiftOrder::Cell0Last`] cell 0 is the MSB. The
/// result always has `ceil(len / 4)` hex digits.
pub fn encode_dr(vector: &ScanVector, order: ShiftOrder) -> String {
    let len = vector.len();
    let mut nibbles = vec![0u8; len.div_ceil(4).max(1)];

    for idx in vector.ones() {
        let pos = match order {
            ShiftOrder::Cell0First => idx,
            ShiftOrder::Cell0Last => len - 1 - idx,
        };
        nibbles[pos / 4] |= 1 << (pos % 4);
    }

    let mut text = String::with_capacity(nibbles.len() + 2);
    text.push_str("0x");
    for nibble in nibbles.iter().rev() {
        text.push(char::from_digit(*nibble as u32, 16).unwrap_or('0').to_ascii_uppercase());
    }
    text
}

/// A command for the OpenOCD telnet interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load an instruction into the TAP's instruction register
    Irscan { tap: String, opcode: String },
    /// Shift a value through the TAP's selected data register
    Drscan { tap: String, bits: usize, value: String },
}

impl Command {
    pub fn irscan(tap: impl Into<String>, opcode_hex: impl Into<String>) -> Self {
        Self::Irscan {
            tap: tap.into(),
            opcode: opcode_hex.into(),
        }
    }

    /// `drscan` loading `vector` into the boundary register.
    pub fn drscan(tap: impl Into<String>, vector: &ScanVector, order: ShiftOrder) -> Self {
        Self::Drscan {
            tap: tap.into(),
            bits: vector.len(),
            value: encode_dr(vector, order),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Irscan { tap, opcode } => write!(f, "irscan {} {}", tap, opcode),
            Self::Drscan { tap, bits, value } => write!(f, "drscan {} {} {}", tap, bits, value),
        }
    }
}
