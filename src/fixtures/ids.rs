//! Fixture identity allocation.

use rand::Rng;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Mutex;

use crate::config::FixtureIds;

/// Range randomized identities are drawn from. Kept well away from small ids
/// other clients of a shared deployment tend to use.
pub const RANDOM_ID_RANGE: Range<i64> = 1_000_000_000..9_000_000_000_000;

/// Hands out identities for caller-assigned fixtures.
///
/// With [`FixtureIds::Randomized`] no identity is issued twice during the
/// allocator's lifetime, so scenarios never share external state.
#[derive(Debug)]
pub struct IdAllocator {
    strategy: FixtureIds,
    issued: Mutex<HashSet<i64>>,
}

impl IdAllocator {
    /// Creates an allocator for the given strategy.
    pub fn new(strategy: FixtureIds) -> Self {
        Self {
            strategy,
            issued: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the strategy in use.
    pub fn strategy(&self) -> FixtureIds {
        self.strategy
    }

    /// Returns the next identity.
    pub fn next_id(&self) -> i64 {
        let mut issued = self
            .issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let id = match self.strategy {
            FixtureIds::Fixed(id) => id,
            FixtureIds::Randomized => {
                let mut rng = rand::thread_rng();
                loop {
                    let candidate = rng.gen_range(RANDOM_ID_RANGE);
                    if !issued.contains(&candidate) {
                        break candidate;
                    }
                }
            }
        };
        issued.insert(id);
        id
    }

    /// Returns how many distinct identities have been issued.
    pub fn issued_count(&self) -> usize {
        self.issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(FixtureIds::default())
    }
}
