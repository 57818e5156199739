use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of uniformly distributed integers.
///
/// Implementations must be usable from many request tasks at once without
/// the caller taking a lock.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `[0, bound)`. `bound` is never zero.
    fn below(&self, bound: u32) -> u32;
}

/// Draws from the calling thread's own `rand` stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn below(&self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Reproducible stream shared by all callers.
///
/// Concurrent callers serialize on the inner lock, so the sequence is only
/// reproducible when requests arrive in the same order.
pub struct SeededSource {
    rng: Mutex<Xoshiro256PlusPlus>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Xoshiro256PlusPlus::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededSource {
    fn below(&self, bound: u32) -> u32 {
        // A panic while holding the lock cannot leave the rng half-updated.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(0..bound)
    }
}

/// Replays a fixed sequence of values, wrapping around at the end.
///
/// Each value is reduced modulo the requested bound. An empty script always
/// yields zero.
pub struct ScriptedSource {
    values: Vec<u32>,
    cursor: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// A source that returns `value` for every draw.
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn below(&self, bound: u32) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let position = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[position] % bound
    }
}
