//! Compilation unit: owns the counter and every identifier issued so far.

use std::collections::HashMap;

use tracing::{debug, info, trace, warn};

use crate::bits::extract;
use crate::counter::{CounterSource, MonotonicCounter};
use crate::error::{Error, Result};
use crate::ident::{GeneratorConfig, Identifier, Shorthand};
use crate::overflow::{ContinuationPoints, FallbackBody, OverflowController, OverflowState};

/// Outcome of one inclusion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inclusion {
    pub identifier: Identifier,
    /// Alias bound to `identifier`, unless suppressed.
    pub shorthand: Option<Shorthand>,
    /// First read of the accepted extraction.
    pub base: u64,
    /// Overflow state observed by the accepted extraction.
    pub state: OverflowState,
    /// Helper body in effect for this inclusion.
    pub fallback: FallbackBody,
    /// Extractions performed, including re-advances.
    pub attempts: u32,
    /// Zero-based position among the unit's inclusions.
    pub ordinal: usize,
}

/// One compilation pass.
///
/// Identifiers are unique within a unit; nothing carries over between units.
#[derive(Clone, Debug)]
pub struct CompilationUnit<C = MonotonicCounter> {
    config: GeneratorConfig,
    counter: C,
    overflow: OverflowController,
    issued: Vec<Identifier>,
    index: HashMap<Identifier, usize>,
    shorthand: Option<Shorthand>,
}

impl CompilationUnit<MonotonicCounter> {
    /// Unit with a counter starting at zero.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::with_counter(config, MonotonicCounter::new())
    }
}

impl Default for CompilationUnit<MonotonicCounter> {
    fn default() -> Self {
        Self::from_parts(GeneratorConfig::default(), MonotonicCounter::new())
    }
}

impl<C: CounterSource> CompilationUnit<C> {
    pub fn with_counter(config: GeneratorConfig, counter: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, counter))
    }

    fn from_parts(config: GeneratorConfig, counter: C) -> Self {
        let overflow = OverflowController::new(config.layout);
        Self {
            config,
            counter,
            overflow,
            issued: Vec::new(),
            index: HashMap::new(),
            shorthand: None,
        }
    }

    /// Turn the shorthand alias off or on. Only allowed before the first inclusion.
    pub fn set_suppress_shorthand(&mut self, suppress: bool) -> Result<()> {
        if suppress == self.config.suppress_shorthand {
            return Ok(());
        }
        if !self.issued.is_empty() {
            return Err(Error::LateConfiguration);
        }
        self.config.suppress_shorthand = suppress;
        if !suppress {
            self.config.validate()?;
        }
        Ok(())
    }

    /// Mint the next identifier.
    ///
    /// Below the cutoff a repeated identifier is a hard conflict. Past it the
    /// counter is re-advanced up to `retry_bound` times before giving up.
    pub fn include(&mut self) -> Result<Inclusion> {
        let layout = self.config.layout;
        let mut attempts = 0u32;

        let (extraction, identifier, state) = loop {
            attempts += 1;
            let extraction = extract(&mut self.counter, layout.bit_width());
            let state = self.overflow.observe(&extraction);
            let identifier = Identifier::assemble(&self.config.prefix, &extraction.bits);

            if !self.index.contains_key(&identifier) {
                break (extraction, identifier, state);
            }

            if !state.is_overflowed() || attempts > layout.retries() {
                return Err(Error::DefinitionConflict {
                    identifier: identifier.to_string(),
                    attempts,
                });
            }
            debug!(
                %identifier,
                first_read = extraction.first_read,
                attempts,
                "identifier already issued, re-advancing counter"
            );
            // Re-entry read: moves the next extraction off the W-read stride.
            self.counter.next();
        };

        let ordinal = self.issued.len();
        self.index.insert(identifier.clone(), ordinal);
        self.issued.push(identifier.clone());

        if state == OverflowState::OverflowEnter {
            let points = self
                .overflow
                .define_continuation(&mut self.counter, identifier.clone())?;
            info!(
                identifier = %points.identifier(),
                counter = points.counter(),
                final_counter = points.final_counter(),
                cutoff = layout.cutoff(),
                "counter crossed the cutoff, continuation points defined"
            );
        }

        if self.issued.len() as u64 == layout.safe_inclusions() + 1 {
            warn!(
                inclusions = self.issued.len(),
                safe = layout.safe_inclusions(),
                "inclusion count exceeds the no-retry safe bound"
            );
        }

        self.shorthand = if self.config.suppress_shorthand {
            None
        } else {
            Some(Shorthand {
                alias: self.config.shorthand.clone(),
                target: identifier.clone(),
            })
        };

        trace!(%identifier, base = extraction.first_read, ?state, attempts, "inclusion");

        Ok(Inclusion {
            identifier,
            shorthand: self.shorthand.clone(),
            base: extraction.first_read,
            state,
            fallback: self.overflow.fallback(),
            attempts,
            ordinal,
        })
    }

    /// Include repeatedly until the continuation points exist.
    ///
    /// Returns immediately if they were already defined. The number of
    /// inclusions needed grows with the cutoff.
    pub fn force_overflow(&mut self) -> Result<&ContinuationPoints> {
        while !self.overflow.is_terminal() {
            self.include()?;
        }
        self.overflow.continuation()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Identifiers in issue order.
    pub fn issued(&self) -> &[Identifier] {
        &self.issued
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position_of(name).is_some()
    }

    /// Ordinal of the inclusion that issued `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.index
            .get(&Identifier::from(name.to_string()))
            .copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Alias bound to the most recent identifier.
    pub fn shorthand(&self) -> Option<&Shorthand> {
        self.shorthand.as_ref()
    }

    pub fn overflow_state(&self) -> OverflowState {
        self.overflow.state()
    }

    pub fn continuation(&self) -> Result<&ContinuationPoints> {
        self.overflow.continuation()
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    fn small(width: u32) -> GeneratorConfig {
        GeneratorConfig {
            prefix: "N_".into(),
            layout: Layout::new(width).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn first_inclusions_are_multiples_of_width() {
        let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
        let a = unit.include().unwrap();
        let b = unit.include().unwrap();
        let c = unit.include().unwrap();

        assert_eq!(a.identifier.as_str(), "File_Local_Namespace_0000000000");
        assert_eq!(b.identifier.as_str(), "File_Local_Namespace_0000001010");
        assert_eq!(c.identifier.as_str(), "File_Local_Namespace_0000010100");
        assert_eq!((a.base, b.base, c.base), (0, 10, 20));
        assert_eq!(c.ordinal, 2);
        assert_eq!(unit.len(), 3);
    }

    #[test]
    fn shorthand_follows_latest_identifier() {
        let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
        unit.include().unwrap();
        let second = unit.include().unwrap();

        let alias = unit.shorthand().unwrap();
        assert_eq!(alias.alias, "FLN");
        assert_eq!(alias.target, second.identifier);
        assert_eq!(second.shorthand.as_ref(), Some(alias));
    }

    #[test]
    fn suppressed_shorthand() {
        let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
        unit.set_suppress_shorthand(true).unwrap();
        let inclusion = unit.include().unwrap();
        assert!(inclusion.shorthand.is_none());
        assert!(unit.shorthand().is_none());
    }

    #[test]
    fn shorthand_flag_is_fixed_after_first_inclusion() {
        let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
        unit.include().unwrap();
        assert_eq!(
            unit.set_suppress_shorthand(true),
            Err(Error::LateConfiguration)
        );
        // Re-stating the current value is harmless.
        assert!(unit.set_suppress_shorthand(false).is_ok());
    }

    #[test]
    fn lookup_by_name() {
        let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
        let first = unit.include().unwrap();
        assert!(unit.contains(first.identifier.as_str()));
        assert_eq!(unit.position_of(first.identifier.as_str()), Some(0));
        assert!(!unit.contains("File_Local_Namespace_1111111111"));
    }

    #[test]
    fn crossing_defines_continuation() {
        let mut unit = CompilationUnit::new(small(4)).unwrap();
        // Bases 0, 4, 8, 12 stay within 16; 16..=19 crosses.
        for _ in 0..3 {
            assert_eq!(unit.include().unwrap().state, OverflowState::Normal);
        }
        let last_normal = unit.include().unwrap();
        assert_eq!(last_normal.state, OverflowState::Normal);
        assert_eq!(last_normal.fallback, FallbackBody::Primary);

        let crossing = unit.include().unwrap();
        assert_eq!(crossing.state, OverflowState::OverflowEnter);
        assert_eq!(crossing.fallback, FallbackBody::Alternate);
        assert_eq!(unit.overflow_state(), OverflowState::Terminal);

        let points = unit.continuation().unwrap();
        assert_eq!(points.identifier(), &crossing.identifier);
        assert_eq!(points.final_counter(), points.counter() + 2);
        assert_eq!(points.len(), 0);
    }

    #[test]
    fn force_overflow_is_idempotent() {
        let mut unit = CompilationUnit::new(small(5)).unwrap();
        let first = unit.force_overflow().unwrap().clone();
        let issued = unit.len();
        let second = unit.force_overflow().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(unit.len(), issued);
    }

    #[test]
    fn re_advance_steps_around_wrapped_identifiers() {
        let mut unit = CompilationUnit::new(small(4)).unwrap();
        unit.force_overflow().unwrap();

        let mut retried = false;
        while let Ok(inclusion) = unit.include() {
            assert_eq!(inclusion.state, OverflowState::OverflowContinue);
            retried |= inclusion.attempts > 1;
        }
        assert!(retried, "expected at least one re-advance");

        let mut seen = std::collections::HashSet::new();
        for id in unit.issued() {
            assert!(seen.insert(id.clone()), "duplicate {}", id);
        }
        // All 16 names get used before the unit gives up.
        assert_eq!(unit.len(), 16);
    }

    #[test]
    fn exhausted_space_is_a_definition_conflict() {
        let mut unit = CompilationUnit::new(small(3)).unwrap();
        let err = loop {
            if let Err(err) = unit.include() {
                break err;
            }
        };
        assert!(matches!(err, Error::DefinitionConflict { .. }));
    }

    #[test]
    fn mismatched_cutoff_conflicts_below_cutoff() {
        let config = GeneratorConfig {
            layout: Layout::with_cutoff(3, 1000).unwrap(),
            ..Default::default()
        };
        let mut unit = CompilationUnit::new(config).unwrap();
        let err = loop {
            if let Err(err) = unit.include() {
                break err;
            }
        };
        assert_eq!(
            err,
            Error::DefinitionConflict {
                identifier: "File_Local_Namespace_000".into(),
                attempts: 1,
            }
        );
        assert_eq!(unit.overflow_state(), OverflowState::Normal);
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        let config = GeneratorConfig {
            prefix: "not valid".into(),
            ..Default::default()
        };
        assert!(CompilationUnit::new(config).is_err());
    }

    #[test]
    fn deserialized_config_drives_a_unit() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{"prefix":"N_","layout":{"bit_width":4,"cutoff":16,"retry_bound":4}}"#,
        )
        .unwrap();
        let mut unit = CompilationUnit::new(config).unwrap();

        assert_eq!(unit.include().unwrap().identifier.as_str(), "N_0000");
        assert_eq!(unit.include().unwrap().identifier.as_str(), "N_0100");
    }
}
