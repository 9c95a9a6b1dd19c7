//! Delay selection
//!
//! Each read event draws one delay uniformly from the configured set. By
//! default picks come from the thread-local generator, which is seeded once
//! and never reseeded between picks. A fixed seed gives a reproducible
//! sequence of picks for tests that need one.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ChannelError;

/// Source of randomness for delay picks
#[derive(Debug)]
enum PickSource {
    /// Ambient thread-local generator
    Ambient,
    /// Deterministic generator from a fixed seed
    Seeded(Mutex<StdRng>),
}

/// Chooses read delays from a fixed set of millisecond values
#[derive(Debug)]
pub struct DelayPicker {
    delays_ms: Vec<u64>,
    source: PickSource,
}

impl DelayPicker {
    /// Create a picker backed by the ambient generator
    ///
    /// An empty set is accepted here; it only fails at [`pick`](Self::pick).
    pub fn new(delays_ms: Vec<u64>) -> Self {
        Self {
            delays_ms,
            source: PickSource::Ambient,
        }
    }

    /// Create a picker with a reproducible pick sequence
    pub fn seeded(delays_ms: Vec<u64>, seed: u64) -> Self {
        Self {
            delays_ms,
            source: PickSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Get the configured delay set
    pub fn delays(&self) -> &[u64] {
        &self.delays_ms
    }

    /// Choose one delay uniformly from the set
    pub fn pick(&self) -> Result<u64, ChannelError> {
        let choice = match &self.source {
            PickSource::Ambient => self.delays_ms.choose(&mut rand::thread_rng()),
            PickSource::Seeded(rng) => self.delays_ms.choose(&mut *rng.lock()),
        };
        choice.copied().ok_or(ChannelError::NoDelays)
    }
}

/// Encode the diagnostic prefix for a delay, e.g. `"20-"`
pub fn prefix(delay_ms: u64) -> String {
    format!("{}-", delay_ms)
}
