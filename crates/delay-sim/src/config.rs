//! Configuration for delayed channels

use serde::{Deserialize, Serialize};

/// Configuration for creating a delayed channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DelayedChannelConfig {
    /// Candidate read delays in milliseconds
    pub delays_ms: Vec<u64>,
    /// Fixed RNG seed for reproducible delay picks
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DelayedChannelConfig {
    fn default() -> Self {
        Self {
            delays_ms: vec![10, 20, 30],
            seed: None,
        }
    }
}

impl DelayedChannelConfig {
    /// Create a configuration with the given delay set and no seed
    pub fn new(delays_ms: Vec<u64>) -> Self {
        Self {
            delays_ms,
            seed: None,
        }
    }

    /// Use a fixed seed for delay selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
