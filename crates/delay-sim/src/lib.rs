//! Delayed Serial Channel Simulation
//!
//! This crate provides an in-memory stand-in for a slow serial device, for
//! testing how client code copes with delayed reads without real hardware.
//! It includes:
//!
//! - **DelayedChannel**: Byte buffer whose reads wait for a random delay
//! - **DelayedStream**: `std::io` and tokio I/O adapters over a channel
//!
//! # Example
//!
//! ```rust
//! use delay_sim::DelayedChannel;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), delay_sim::ChannelError> {
//! let channel = DelayedChannel::new(vec![10, 20, 30]);
//! channel.write(b"AB");
//! channel.write(b"C");
//!
//! // Waits 10, 20 or 30 ms, then emits e.g. "20-ABC"
//! let mut dst = [0u8; 64];
//! let event = channel.read(&mut dst).await?;
//! assert!(event.is_end_of_stream());
//! assert_eq!(&dst[..event.len], format!("{}-ABC", event.delay_ms).as_bytes());
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod delay;
pub mod error;
pub mod stream;

pub use channel::{DelayedChannel, ReadEvent, ReadStatus};
pub use config::DelayedChannelConfig;
pub use delay::DelayPicker;
pub use error::ChannelError;
pub use stream::DelayedStream;
