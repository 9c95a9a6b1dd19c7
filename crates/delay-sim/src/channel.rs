//! Delayed channel
//!
//! An in-memory byte buffer that behaves like a slow serial device. Writes
//! append immediately. Each read waits for a randomly chosen delay, then
//! emits the delay as an ASCII prefix followed by the whole buffer. Reads
//! never consume data, so every read event re-emits everything written so
//! far.

use std::io::{self, Write};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::delay::{self, DelayPicker};
use crate::{ChannelError, DelayedChannelConfig};

/// Status reported alongside a completed read event
///
/// Every read event is a single discrete receive, so the only status is
/// end of stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// This read event is complete
    EndOfStream,
}

/// Result of a single read event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadEvent {
    /// Bytes written into the destination (prefix plus buffer)
    pub len: usize,
    /// Delay that elapsed before the payload was produced
    pub delay_ms: u64,
    /// Always [`ReadStatus::EndOfStream`]
    pub status: ReadStatus,
}

impl ReadEvent {
    /// Check whether this event ended the stream
    pub fn is_end_of_stream(&self) -> bool {
        self.status == ReadStatus::EndOfStream
    }
}

/// In-memory byte channel with randomized read latency
///
/// The buffer sits behind a mutex so writers and readers on different
/// tasks never observe a torn buffer. Which writes a read observes is
/// decided by when its delay ends, not when the read started.
#[derive(Debug)]
pub struct DelayedChannel {
    buffer: Mutex<Vec<u8>>,
    picker: DelayPicker,
}

impl DelayedChannel {
    /// Create a channel with the given delay set (milliseconds)
    ///
    /// An empty delay set is accepted; reads then fail with
    /// [`ChannelError::NoDelays`].
    pub fn new(delays_ms: Vec<u64>) -> Self {
        Self::with_picker(DelayPicker::new(delays_ms))
    }

    /// Create a channel from configuration
    pub fn from_config(config: DelayedChannelConfig) -> Self {
        let picker = match config.seed {
            Some(seed) => DelayPicker::seeded(config.delays_ms, seed),
            None => DelayPicker::new(config.delays_ms),
        };
        Self::with_picker(picker)
    }

    fn with_picker(picker: DelayPicker) -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
            picker,
        }
    }

    /// Get the configured delay set
    pub fn delays(&self) -> &[u64] {
        self.picker.delays()
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Check if nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Current capacity of the backing storage
    pub fn capacity(&self) -> usize {
        self.buffer.lock().capacity()
    }

    /// Copy of the current buffer contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    /// Append bytes to the buffer
    ///
    /// Always accepts the whole slice and returns its length. When the
    /// buffer overflows, storage grows to twice the required length.
    pub fn write(&self, data: &[u8]) -> usize {
        let mut buffer = self.buffer.lock();
        let needed = buffer.len() + data.len();
        if needed > buffer.capacity() {
            let additional = needed * 2 - buffer.len();
            buffer.reserve_exact(additional);
        }
        buffer.extend_from_slice(data);

        debug!(
            "Delayed channel wrote {} bytes ({} buffered): {:02X?}",
            data.len(),
            buffer.len(),
            data
        );
        data.len()
    }

    /// Perform one read event, suspending only the calling task
    ///
    /// Waits for a delay chosen from the delay set, then writes
    /// `"<delay>-"` followed by the buffer into `dst`. Dropping the future
    /// before the delay ends abandons the read without side effects.
    pub async fn read(&self, dst: &mut [u8]) -> Result<ReadEvent, ChannelError> {
        let delay_ms = self.pick_delay()?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        self.fill(delay_ms, dst)
    }

    /// Perform one read event, blocking the calling thread for the delay
    pub fn read_blocking(&self, dst: &mut [u8]) -> Result<ReadEvent, ChannelError> {
        let delay_ms = self.pick_delay()?;
        std::thread::sleep(Duration::from_millis(delay_ms));
        self.fill(delay_ms, dst)
    }

    /// Build the payload a read event with this delay would produce now
    ///
    /// Every read event copies exactly this into its destination.
    pub fn payload(&self, delay_ms: u64) -> Vec<u8> {
        let buffer = self.buffer.lock();
        let prefix = delay::prefix(delay_ms);
        let mut payload = Vec::with_capacity(prefix.len() + buffer.len());
        payload.extend_from_slice(prefix.as_bytes());
        payload.extend_from_slice(&buffer);
        payload
    }

    /// Choose the delay for the next read event
    pub(crate) fn pick_delay(&self) -> Result<u64, ChannelError> {
        self.picker.pick().map_err(|e| {
            warn!("Delayed channel read failed: {}", e);
            e
        })
    }

    /// Copy the payload for an elapsed delay into `dst`
    ///
    /// Leaves `dst` untouched when it cannot hold the whole payload.
    pub(crate) fn fill(&self, delay_ms: u64, dst: &mut [u8]) -> Result<ReadEvent, ChannelError> {
        let payload = self.payload(delay_ms);
        let needed = payload.len();
        if dst.len() < needed {
            let err = ChannelError::DestinationTooSmall {
                needed,
                available: dst.len(),
            };
            warn!("Delayed channel read failed: {}", err);
            return Err(err);
        }

        dst[..needed].copy_from_slice(&payload);

        debug!(
            "Delayed channel read {} bytes after {}ms",
            needed, delay_ms
        );
        Ok(ReadEvent {
            len: needed,
            delay_ms,
            status: ReadStatus::EndOfStream,
        })
    }

    /// Copy the buffer verbatim to `out`, without delay or prefix
    pub fn print_buffer_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let snapshot = self.snapshot();
        out.write_all(&snapshot)?;
        out.flush()
    }

    /// Copy the buffer to `out` followed by a newline
    pub fn print_bufferln_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut snapshot = self.snapshot();
        snapshot.push(b'\n');
        out.write_all(&snapshot)?;
        out.flush()
    }

    /// Copy the buffer verbatim to stdout
    pub fn print_buffer(&self) -> io::Result<()> {
        self.print_buffer_to(&mut io::stdout().lock())
    }

    /// Copy the buffer to stdout followed by a newline
    pub fn print_bufferln(&self) -> io::Result<()> {
        self.print_bufferln_to(&mut io::stdout().lock())
    }
}
