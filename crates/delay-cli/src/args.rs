//! Command-line options for `slowrw`.
//!
//! Usage:
//!   slowrw [--delays 10,20,30] [--seed N] [--config FILE] [--reads N] [--newline] [MESSAGE ...]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use delay_sim::DelayedChannelConfig;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Comma-separated delay set as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayList(pub Vec<u64>);

#[derive(Debug, Parser)]
#[command(
    name = "slowrw",
    about = "Write messages to a delayed channel, perform read events, then print the raw buffer"
)]
pub struct Options {
    /// Comma-separated read delays in ms [default from config, else 10,20,30]
    #[arg(long, value_parser = parse_delays)]
    pub delays: Option<DelayList>,

    /// Fixed seed for reproducible delay picks
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON channel configuration; --delays and --seed override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of read events to perform
    #[arg(long, default_value_t = 1)]
    pub reads: usize,

    /// Print the buffer followed by a newline
    #[arg(long)]
    pub newline: bool,

    /// Messages to write, in order (stdin when none are given)
    pub messages: Vec<String>,
}

impl Options {
    /// Build the channel configuration: config file first, then flag overrides
    pub fn channel_config(&self) -> Result<DelayedChannelConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DelayedChannelConfig::default(),
        };
        if let Some(DelayList(delays)) = &self.delays {
            config.delays_ms = delays.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

/// Parse a comma-separated delay list like `10,20,30`
///
/// An empty string yields an empty set, which is reported at read time.
pub fn parse_delays(raw: &str) -> Result<DelayList, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().map_err(|e| format!("invalid delay {:?}: {}", s, e)))
        .collect::<Result<Vec<_>, _>>()
        .map(DelayList)
}

/// Load a channel configuration from a JSON file
pub fn load_config(path: &Path) -> Result<DelayedChannelConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))
}
