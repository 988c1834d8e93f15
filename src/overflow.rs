//! Overflow controller: what happens once counter reads pass the cutoff.
//!
//! ```text
//!            read > cutoff                 continuation defined
//! Normal ─────────────────▶ OverflowEnter ──────────────────────▶ Terminal
//!                                                                    │
//!                                              later inclusion       ▼
//!                                                            OverflowContinue
//! ```
//!
//! At the crossing the fallback helper switches to its alternate body and
//! the continuation entry points are defined under a once-only guard. Past
//! that point the compilation unit may re-advance the counter a bounded
//! number of times per inclusion to step around identifiers that wrapped.

use serde::{Deserialize, Serialize};

use crate::bits::Extraction;
use crate::counter::CounterSource;
use crate::error::{Error, Result};
use crate::ident::Identifier;
use crate::layout::Layout;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowState {
    /// Every read so far is at or below the cutoff.
    #[default]
    Normal,
    /// This extraction is the first to read past the cutoff.
    OverflowEnter,
    /// Past the cutoff, continuation points already exist.
    OverflowContinue,
    /// Continuation points were just defined.
    Terminal,
}

impl OverflowState {
    /// True for every state past the cutoff.
    #[inline]
    pub const fn is_overflowed(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Implementation body of the inline length helper.
///
/// Both bodies return zero. Switching bodies at the crossing makes a
/// reused identifier observable: two modules with the same name and
/// different helper bodies cannot coexist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackBody {
    #[default]
    Primary,
    Alternate,
}

impl FallbackBody {
    /// Evaluate the body.
    pub fn len(&self) -> usize {
        match self {
            Self::Primary => String::new().len(),
            Self::Alternate => String::from("").len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The body as a Rust expression, for code generation.
    pub const fn source(&self) -> &'static str {
        match self {
            Self::Primary => "::std::string::String::new().len()",
            Self::Alternate => "::std::string::String::from(\"\").len()",
        }
    }
}

/// Accessors defined once, at the crossing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationPoints {
    identifier: Identifier,
    len: usize,
    counter: u64,
    final_counter: u64,
}

impl ContinuationPoints {
    /// Identifier of the inclusion that crossed the cutoff.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Length helper of the crossing inclusion.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counter accessor of the crossing inclusion.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Counter read taken when the points were defined (`counter() + 2`).
    pub fn final_counter(&self) -> u64 {
        self.final_counter
    }
}

/// Once-only slot for the continuation points.
#[derive(Clone, Debug, Default)]
pub struct ContinuationGuard {
    points: Option<ContinuationPoints>,
}

impl ContinuationGuard {
    pub fn define(&mut self, points: ContinuationPoints) -> Result<&ContinuationPoints> {
        if self.points.is_some() {
            return Err(Error::ContinuationRedefined);
        }
        Ok(self.points.insert(points))
    }

    pub fn get(&self) -> Result<&ContinuationPoints> {
        self.points.as_ref().ok_or(Error::ContinuationMissing)
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        self.points.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct OverflowController {
    layout: Layout,
    state: OverflowState,
    fallback: FallbackBody,
    guard: ContinuationGuard,
}

impl OverflowController {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            state: OverflowState::Normal,
            fallback: FallbackBody::Primary,
            guard: ContinuationGuard::default(),
        }
    }

    /// Classify an extraction and advance the state machine.
    pub fn observe(&mut self, extraction: &Extraction) -> OverflowState {
        let crossed = self.layout.is_past_cutoff(extraction.last_read);
        self.state = match self.state {
            OverflowState::Normal if crossed => {
                self.fallback = FallbackBody::Alternate;
                OverflowState::OverflowEnter
            }
            OverflowState::Normal => OverflowState::Normal,
            // A rejected crossing extraction may be retried before the
            // points are defined.
            OverflowState::OverflowEnter => OverflowState::OverflowEnter,
            OverflowState::Terminal | OverflowState::OverflowContinue => {
                OverflowState::OverflowContinue
            }
        };
        self.state
    }

    /// Define the continuation points for the crossing inclusion.
    ///
    /// Takes three reads: the counter accessor, the crossing check, and the
    /// final accessor.
    pub fn define_continuation(
        &mut self,
        counter: &mut impl CounterSource,
        identifier: Identifier,
    ) -> Result<&ContinuationPoints> {
        if self.guard.is_defined() {
            return Err(Error::ContinuationRedefined);
        }

        let accessor = counter.next();
        let check = counter.next();
        debug_assert!(self.layout.is_past_cutoff(check), "continuation below cutoff");
        let final_counter = counter.next();

        self.state = OverflowState::Terminal;
        self.guard.define(ContinuationPoints {
            identifier,
            len: self.fallback.len(),
            counter: accessor,
            final_counter,
        })
    }

    #[inline]
    pub fn state(&self) -> OverflowState {
        self.state
    }

    #[inline]
    pub fn fallback(&self) -> FallbackBody {
        self.fallback
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn continuation(&self) -> Result<&ContinuationPoints> {
        self.guard.get()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.guard.is_defined()
    }
}
