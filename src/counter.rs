//! Counter service: the monotonic value source behind every identifier.

/// A source of strictly increasing values.
///
/// Every call to [`next`](CounterSource::next) returns a value that was never
/// returned before within the same unit. Reads are not idempotent.
pub trait CounterSource {
    /// Read the counter, advancing it.
    fn next(&mut self) -> u64;

    /// The value the next read will return, without advancing.
    fn peek(&self) -> u64;

    /// Discard `n` values.
    fn advance_by(&mut self, n: u64) {
        for _ in 0..n {
            self.next();
        }
    }
}

/// Plain monotonic counter starting at zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonotonicCounter {
    next: u64,
}

impl MonotonicCounter {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Counter whose first read returns `start`.
    pub const fn starting_at(start: u64) -> Self {
        Self { next: start }
    }
}

impl CounterSource for MonotonicCounter {
    #[inline]
    fn next(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }

    #[inline]
    fn peek(&self) -> u64 {
        self.next
    }

    fn advance_by(&mut self, n: u64) {
        self.next += n;
    }
}

impl<C: CounterSource + ?Sized> CounterSource for &mut C {
    fn next(&mut self) -> u64 {
        (**self).next()
    }

    fn peek(&self) -> u64 {
        (**self).peek()
    }

    fn advance_by(&mut self, n: u64) {
        (**self).advance_by(n);
    }
}
