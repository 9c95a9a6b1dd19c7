//! Byte-stream adapters for delayed channels
//!
//! [`DelayedStream`] lets client code that is generic over readers and
//! writers talk to a [`DelayedChannel`] as if it were a serial port. It
//! implements both the blocking `std::io` traits and tokio's async I/O
//! traits.
//!
//! ## Read events and end of stream
//!
//! A read performs one full read event and returns the payload length. The
//! following read returns `0` to signal end of stream, and the read after
//! that starts a new event. The destination must hold the whole payload;
//! otherwise the read fails with [`ChannelError::DestinationTooSmall`]
//! wrapped in an `InvalidInput` I/O error.
//!
//! ## Cancelled reads
//!
//! An async read event starts when it is first polled and its delay is
//! measured from that moment. Dropping the read future (for example via
//! `tokio::time::timeout`) does not abandon the event: like bytes already
//! in flight on a real port, the next read resumes it and completes once the
//! original deadline passes, reporting the original delay. Call
//! [`DelayedStream::cancel_pending`] to discard the event so the next read
//! starts fresh with a full new delay.
//!
//! [`ChannelError::DestinationTooSmall`]: crate::ChannelError::DestinationTooSmall

use std::future::Future;
use std::io::{self, Read, Write};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Sleep;
use tracing::debug;

use crate::DelayedChannel;

/// Progress of the current read event
enum ReadState {
    /// No read event in progress
    Idle,
    /// Waiting for the chosen delay to elapse
    Waiting {
        delay_ms: u64,
        sleep: Pin<Box<Sleep>>,
    },
    /// Last read delivered a payload; next read reports end of stream
    Ended,
}

/// Stream handle onto a shared [`DelayedChannel`]
///
/// Clones share the channel but track their own read events.
pub struct DelayedStream {
    channel: Arc<DelayedChannel>,
    state: ReadState,
}

impl std::fmt::Debug for DelayedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            ReadState::Idle => "idle",
            ReadState::Waiting { .. } => "waiting",
            ReadState::Ended => "ended",
        };
        f.debug_struct("DelayedStream")
            .field("channel", &self.channel)
            .field("state", &state)
            .finish()
    }
}

impl Clone for DelayedStream {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.channel))
    }
}

impl From<DelayedChannel> for DelayedStream {
    fn from(channel: DelayedChannel) -> Self {
        Self::new(Arc::new(channel))
    }
}

impl DelayedStream {
    /// Create a stream over a shared channel
    pub fn new(channel: Arc<DelayedChannel>) -> Self {
        Self {
            channel,
            state: ReadState::Idle,
        }
    }

    /// Get the underlying channel
    pub fn channel(&self) -> &Arc<DelayedChannel> {
        &self.channel
    }

    /// Check whether an async read event is waiting on its delay
    pub fn has_pending_read(&self) -> bool {
        matches!(self.state, ReadState::Waiting { .. })
    }

    /// Discard a pending read event left behind by a cancelled read
    ///
    /// Returns true if an event was discarded. A pending end-of-stream
    /// marker is cleared too.
    pub fn cancel_pending(&mut self) -> bool {
        let was_waiting = self.has_pending_read();
        if was_waiting {
            debug!("Delayed stream discarding pending read event");
        }
        self.state = ReadState::Idle;
        was_waiting
    }
}

impl Write for DelayedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.channel.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for DelayedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let ReadState::Ended = self.state {
            self.state = ReadState::Idle;
            debug!("Delayed stream reporting end of stream");
            return Ok(0);
        }

        // A pending async wait is abandoned; the blocking read starts fresh
        self.state = ReadState::Idle;
        let event = self.channel.read_blocking(buf)?;
        self.state = ReadState::Ended;
        Ok(event.len)
    }
}

impl AsyncWrite for DelayedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(self.channel.write(buf)))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl AsyncRead for DelayedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                ReadState::Ended => {
                    this.state = ReadState::Idle;
                    debug!("Delayed stream reporting end of stream");
                    return Poll::Ready(Ok(()));
                }
                ReadState::Idle => {
                    let delay_ms = this.channel.pick_delay()?;
                    this.state = ReadState::Waiting {
                        delay_ms,
                        sleep: Box::pin(tokio::time::sleep(Duration::from_millis(delay_ms))),
                    };
                }
                ReadState::Waiting { delay_ms, sleep } => {
                    ready!(sleep.as_mut().poll(cx));
                    let delay_ms = *delay_ms;

                    let result = this.channel.fill(delay_ms, buf.initialize_unfilled());
                    return match result {
                        Ok(event) => {
                            buf.advance(event.len);
                            this.state = ReadState::Ended;
                            Poll::Ready(Ok(()))
                        }
                        Err(e) => {
                            this.state = ReadState::Idle;
                            Poll::Ready(Err(e.into()))
                        }
                    };
                }
            }
        }
    }
}
