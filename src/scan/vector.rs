//! Fixed-length scan vectors.

use std::fmt;

use crate::register::Bit;

/// One value for every cell of the boundary register.
///
/// Index `i` is cell number `i`. No reordering is ever applied here; a
/// transport decides which end of the vector is shifted first.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ScanVector {
    bits: Vec<Bit>,
}

impl ScanVector {
    /// Create an all-zero vector of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![Bit::Zero; len],
        }
    }

    /// Parse a string of `0`/`1`, leftmost character = cell 0.
    pub fn from_bit_str(text: &str) -> Option<Self> {
        text.chars()
            .map(|c| match c {
                '0' => Some(Bit::Zero),
                '1' => Some(Bit::One),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|bits| Self { bits })
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value of cell `idx`, or `None` past the end.
    pub fn get(&self, idx: usize) -> Option<Bit> {
        self.bits.get(idx).copied()
    }

    /// Set cell `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    pub fn set(&mut self, idx: usize, bit: Bit) {
        self.bits[idx] = bit;
    }

    /// Bits in cell order.
    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    /// Cell numbers currently set to one.
    pub fn ones(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_one())
            .map(|(i, _)| i)
            .collect()
    }

    /// Cell numbers whose value differs from `other`.
    pub fn differing(&self, other: &ScanVector) -> Vec<usize> {
        let len = self.len().max(other.len());
        (0..len).filter(|&i| self.get(i) != other.get(i)).collect()
    }
}

impl fmt::Display for ScanVector {
    /// Bits as `0`/`1`, cell 0 leftmost.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScanVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanVector[{}; ones={:?}]", self.len(), self.ones())
    }
}
