//! Identifier-space layout: bit width, cutoff, and re-advance bound.
//!
//! Each inclusion consumes `W` counter reads, so the identifier space of
//! `2^W` names is walked in strides of `W`:
//!
//! ```text
//! ┌────────────┬────────────┬────────────┬─────┬──────────────────────┐
//! │ inclusion 0│ inclusion 1│ inclusion 2│ ... │ CUTOFF = 2^W         │
//! │ reads 0..W │ reads W..2W│ reads 2W.. │     │ safe count = 2^W / W │
//! └────────────┴────────────┴────────────┴─────┴──────────────────────┘
//! ```
//!
//! Past the cutoff the low `W` bits wrap, so the overflow controller may
//! re-advance the counter up to `retry_bound` times per inclusion.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of counter bits per identifier.
pub const BIT_WIDTH: u32 = 10;

/// Largest counter value that still maps to a fresh identifier (`2^BIT_WIDTH`).
pub const CUTOFF: u64 = 1 << BIT_WIDTH;

/// Inclusions guaranteed unique without any re-advance (`CUTOFF / BIT_WIDTH`).
pub const MAX_INCLUSIONS: u64 = CUTOFF / BIT_WIDTH as u64;

/// Widest supported bit vector (the mask lives in a `u64`).
pub const MAX_BIT_WIDTH: u32 = 63;

/// Static assertion: the default constants agree with each other.
const _: () = {
    assert!(CUTOFF == 1u64 << BIT_WIDTH, "CUTOFF must equal 2^BIT_WIDTH");
    assert!(BIT_WIDTH <= MAX_BIT_WIDTH, "BIT_WIDTH exceeds MAX_BIT_WIDTH");
};

/// Bit width, cutoff and retry bound of one compilation unit.
///
/// Deserialization goes through the same width check as [`Layout::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLayout")]
pub struct Layout {
    bit_width: u32,
    cutoff: u64,
    retry_bound: u32,
}

/// Unchecked serde form of [`Layout`].
#[derive(Deserialize)]
struct RawLayout {
    bit_width: u32,
    cutoff: u64,
    retry_bound: u32,
}

impl TryFrom<RawLayout> for Layout {
    type Error = Error;

    fn try_from(raw: RawLayout) -> Result<Self> {
        Ok(Self::with_cutoff(raw.bit_width, raw.cutoff)?.retry_bound(raw.retry_bound))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            bit_width: BIT_WIDTH,
            cutoff: CUTOFF,
            retry_bound: BIT_WIDTH,
        }
    }
}

impl Layout {
    /// Layout with `cutoff = 2^bit_width` and `retry_bound = bit_width`.
    pub fn new(bit_width: u32) -> Result<Self> {
        check_width(bit_width)?;
        Ok(Self {
            bit_width,
            cutoff: cutoff_for(bit_width),
            retry_bound: bit_width,
        })
    }

    /// Layout with an explicit cutoff.
    ///
    /// The cutoff is not checked against the width; a mismatch makes the
    /// overflow controller engage too early or too late. Use
    /// [`Layout::validate`] to reject it.
    pub fn with_cutoff(bit_width: u32, cutoff: u64) -> Result<Self> {
        check_width(bit_width)?;
        Ok(Self {
            bit_width,
            cutoff,
            retry_bound: bit_width,
        })
    }

    /// Replace the number of re-advance attempts allowed past the cutoff.
    #[must_use]
    pub const fn retry_bound(mut self, retry_bound: u32) -> Self {
        self.retry_bound = retry_bound;
        self
    }

    #[inline]
    pub const fn bit_width(&self) -> u32 {
        self.bit_width
    }

    #[inline]
    pub const fn cutoff(&self) -> u64 {
        self.cutoff
    }

    #[inline]
    pub const fn retries(&self) -> u32 {
        self.retry_bound
    }

    /// Number of distinct identifiers (`2^bit_width`).
    #[inline]
    pub const fn capacity(&self) -> u64 {
        cutoff_for(self.bit_width)
    }

    /// Inclusions that stay below the cutoff without any re-advance.
    #[inline]
    pub const fn safe_inclusions(&self) -> u64 {
        self.cutoff / self.bit_width as u64
    }

    /// True when `cutoff == 2^bit_width`.
    #[inline]
    pub const fn is_consistent(&self) -> bool {
        self.cutoff == cutoff_for(self.bit_width)
    }

    /// Reject a cutoff that does not match the bit width.
    pub fn validate(&self) -> Result<()> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(Error::ConfigurationMisuse {
                bit_width: self.bit_width,
                cutoff: self.cutoff,
            })
        }
    }

    /// True if `value` lies past the cutoff.
    #[inline]
    pub const fn is_past_cutoff(&self, value: u64) -> bool {
        value > self.cutoff
    }
}

#[inline]
const fn cutoff_for(bit_width: u32) -> u64 {
    1u64 << bit_width
}

pub(crate) fn check_width(bit_width: u32) -> Result<()> {
    if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
        return Err(Error::InvalidBitWidth(bit_width));
    }
    Ok(())
}
