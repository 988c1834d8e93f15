//! Bit extraction: one counter read per identifier bit.
//!
//! Bit `i` is computed from the read taken while defining bit `i`:
//!
//! ```text
//! read_i = base + i                  (reads are consecutive)
//! bit_i  = ((read_i - i) >> i) & 1   == (base >> i) & 1
//! ```
//!
//! The `- i` offset accounts for the reads already consumed by bits `0..i`;
//! dropping it corrupts every bit above 0.

use core::fmt;

use crate::counter::CounterSource;
use crate::layout::MAX_BIT_WIDTH;

/// Per-bit formula: the value of bit `index` given the read taken for it.
#[inline]
pub const fn bit_at(read: u64, index: u32) -> bool {
    (read.wrapping_sub(index as u64) >> index) & 1 == 1
}

/// Fixed-width vector of flags, bit 0 least significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitVector {
    mask: u64,
    width: u32,
}

impl BitVector {
    /// Take the low `width` bits of `value`.
    pub const fn from_value(value: u64, width: u32) -> Self {
        debug_assert!(width > 0 && width <= MAX_BIT_WIDTH, "width must be in 1..=63");
        Self {
            mask: value & ((1u64 << width) - 1),
            width,
        }
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.mask
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Flag at `index`; indices past the width read as unset.
    #[inline]
    pub const fn bit(&self, index: u32) -> bool {
        index < self.width && (self.mask >> index) & 1 == 1
    }

    /// Flags from most to least significant.
    pub fn iter_msb_first(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width).rev().map(move |i| self.bit(i))
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter_msb_first() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Result of one extraction pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extraction {
    pub bits: BitVector,
    /// Read observed when extraction for bit 0 began.
    pub first_read: u64,
    /// Highest read consumed (the read for bit `W - 1`).
    pub last_read: u64,
}

/// Consume exactly `width` reads from `counter` and build the bit vector.
pub fn extract(counter: &mut impl CounterSource, width: u32) -> Extraction {
    debug_assert!(width > 0 && width <= MAX_BIT_WIDTH, "width must be in 1..=63");

    let mut mask = 0u64;
    let mut first_read = 0;
    let mut last_read = 0;
    for index in 0..width {
        let read = counter.next();
        if index == 0 {
            first_read = read;
        }
        if bit_at(read, index) {
            mask |= 1 << index;
        }
        last_read = read;
    }

    Extraction {
        bits: BitVector::from_value(mask, width),
        first_read,
        last_read,
    }
}
