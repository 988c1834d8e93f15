//! Uniqueness and overflow properties of a compilation unit.

use std::collections::HashSet;

use file_local_ns::{
    extract, CompilationUnit, CounterSource, Error, FallbackBody, GeneratorConfig, Layout,
    MonotonicCounter, OverflowState, MAX_INCLUSIONS,
};
use proptest::prelude::*;

fn config(width: u32, retries: u32) -> GeneratorConfig {
    GeneratorConfig {
        layout: Layout::new(width).unwrap().retry_bound(retries),
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every inclusion that stays at or below the cutoff gets a fresh name.
    #[test]
    fn unique_below_cutoff(width in 2u32..=10, start_seed in any::<u64>()) {
        let layout = Layout::new(width).unwrap();
        let start = start_seed % layout.cutoff();
        let mut unit = CompilationUnit::with_counter(
            config(width, width),
            MonotonicCounter::starting_at(start),
        )
        .unwrap();

        let mut seen = HashSet::new();
        while unit.counter().peek() + u64::from(width) - 1 <= layout.cutoff() {
            let inclusion = unit.include().unwrap();
            prop_assert_eq!(inclusion.state, OverflowState::Normal);
            prop_assert_eq!(inclusion.attempts, 1);
            prop_assert!(seen.insert(inclusion.identifier));
        }
    }

    /// Past the cutoff an inclusion either fails or returns a fresh name.
    #[test]
    fn successful_inclusions_never_repeat(width in 2u32..=8, retries in 0u32..=12) {
        let mut unit = CompilationUnit::new(config(width, retries)).unwrap();

        let mut seen = HashSet::new();
        let err = loop {
            match unit.include() {
                Ok(inclusion) => {
                    prop_assert!(seen.insert(inclusion.identifier));
                }
                Err(err) => break err,
            }
        };

        let is_conflict = matches!(err, Error::DefinitionConflict { .. });
        prop_assert!(is_conflict);
        prop_assert!(seen.len() as u64 <= Layout::new(width).unwrap().capacity());
    }

    /// Continuation accessors are consistent for any width.
    #[test]
    fn continuation_final_is_counter_plus_two(width in 2u32..=10) {
        let mut unit = CompilationUnit::new(config(width, width)).unwrap();
        let points = unit.force_overflow().unwrap();
        prop_assert_eq!(points.final_counter(), points.counter() + 2);
        prop_assert_eq!(points.len(), 0);
        prop_assert!(points.counter() > Layout::new(width).unwrap().cutoff());
    }
}

#[test]
fn forced_overflow_with_default_layout() {
    let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
    let points = unit.force_overflow().unwrap().clone();

    assert_eq!(points.len(), 0);
    let (counter_a, counter_b) = (points.counter(), points.counter());
    assert_eq!(counter_a, counter_b);
    let (final_a, final_b) = (points.final_counter(), points.final_counter());
    assert_eq!(final_a, final_b);
    assert_eq!(points.final_counter(), points.counter() + 2);

    // 102 inclusions fit below 1024; the 103rd (reads 1020..=1029) crosses.
    assert_eq!(unit.len() as u64, MAX_INCLUSIONS + 1);
    assert_eq!(points.counter(), 1030);
    assert_eq!(
        points.identifier().as_str(),
        "File_Local_Namespace_1111111100"
    );
    assert_eq!(unit.overflow_state(), OverflowState::Terminal);
}

#[test]
fn crossing_selects_alternate_body() {
    let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
    let mut bodies = Vec::new();
    while unit.continuation().is_err() {
        bodies.push(unit.include().unwrap().fallback);
    }

    let (last, before) = bodies.split_last().unwrap();
    assert_eq!(*last, FallbackBody::Alternate);
    assert!(before.iter().all(|b| *b == FallbackBody::Primary));
    assert_eq!(FallbackBody::Primary.len(), FallbackBody::Alternate.len());
}

#[test]
fn overflow_gives_an_extra_doubling_of_headroom() {
    let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
    while unit.include().is_ok() {}

    assert!(unit.len() as u64 >= 2 * MAX_INCLUSIONS, "only {} inclusions", unit.len());
    let unique: HashSet<_> = unit.issued().iter().collect();
    assert_eq!(unique.len(), unit.len());
}

#[test]
fn continuation_is_missing_before_the_crossing() {
    let mut unit = CompilationUnit::new(GeneratorConfig::default()).unwrap();
    unit.include().unwrap();
    assert_eq!(unit.continuation(), Err(Error::ContinuationMissing));
}

/// Counter that hands out only even values.
struct EvenCounter(u64);

impl CounterSource for EvenCounter {
    fn next(&mut self) -> u64 {
        let value = self.0;
        self.0 += 2;
        value
    }

    fn peek(&self) -> u64 {
        self.0
    }
}

#[test]
fn skipping_counter_changes_the_bits() {
    // Bit i comes from its own read, so the offset only cancels out for
    // consecutive reads.
    let mut even = EvenCounter(2);
    let mut plain = MonotonicCounter::starting_at(2);
    let a = extract(&mut even, 4);
    let b = extract(&mut plain, 4);
    assert_eq!(a.first_read, b.first_read);
    assert_eq!(a.last_read, 8);
    assert_eq!(b.bits.value(), 0b0010);
    assert_eq!(a.bits.value(), 0b0110);
}
