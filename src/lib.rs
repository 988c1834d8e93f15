//! # File-local namespaces (file-local-ns)
//!
//! Mints a fresh, collision-free module name every time it is invoked within
//! one compilation unit, so independently written sources can each declare a
//! private aliasing module without clashing with each other.
//!
//! ## Design
//!
//! An identifier is a fixed prefix followed by `W` flags (default `W = 10`),
//! one counter read per flag:
//!
//! ```text
//! counter ──▶ bit extractor ──▶ identifier assembler ──▶ (shorthand alias)
//!    ▲              │
//!    └── overflow controller (cutoff = 2^W, bounded re-advance)
//! ```
//!
//! ```text
//! File_Local_Namespace_ 0 0 0 0 0 0 1 0 1 0
//!                       ▲ bit 9         ▲ bit 0
//! ```
//!
//! The counter is an explicit [`CounterSource`] owned by a
//! [`CompilationUnit`]; nothing is global.
//!
//! ```
//! use file_local_ns::{CompilationUnit, GeneratorConfig};
//!
//! let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
//! let a = unit.include().unwrap();
//! let b = unit.include().unwrap();
//! assert_ne!(a.identifier, b.identifier);
//! assert_eq!(unit.shorthand().unwrap().target, b.identifier);
//! ```
//!
//! ## Limits
//!
//! `2^W / W` inclusions (102 by default) stay below the cutoff. Past it the
//! low bits wrap; the overflow controller re-advances the counter up to
//! `retry_bound` times per inclusion and reports
//! [`Error::DefinitionConflict`] when that is not enough.

pub mod bits;
pub mod counter;
pub mod error;
pub mod ident;
pub mod layout;
pub mod overflow;
pub mod unit;

pub use bits::{bit_at, extract, BitVector, Extraction};
pub use counter::{CounterSource, MonotonicCounter};
pub use error::{Error, Result};
pub use ident::{
    is_identifier, GeneratorConfig, Identifier, Shorthand, DEFAULT_PREFIX, DEFAULT_SHORTHAND,
};
pub use layout::{Layout, BIT_WIDTH, CUTOFF, MAX_BIT_WIDTH, MAX_INCLUSIONS};
pub use overflow::{
    ContinuationGuard, ContinuationPoints, FallbackBody, OverflowController, OverflowState,
};
pub use unit::{CompilationUnit, Inclusion};
