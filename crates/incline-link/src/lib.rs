//! Blocking link session between the host and the measurement board.
//!
//! The board is the responder on a point-to-point half-duplex serial link:
//! it emits frames at its own cadence and the host has no event-driven
//! wakeup, so [`Session::receive`] polls the channel until a full frame is
//! buffered. There is deliberately no timeout: an absent board blocks the
//! caller indefinitely, which matches the protocol's documented behavior.

pub mod serial;

use incline_wire::{FieldValue, FrameError, FrameSchema};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Settling delay the board needs after the link opens before any frame is
/// meaningful.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Byte channel I/O failure")]
    Io(#[from] io::Error),
    #[error("Frame codec failure")]
    Frame(#[from] FrameError),
}

/// Minimal blocking byte transport the session drives.
///
/// Implementations own the underlying device exclusively and release it
/// exactly once when dropped, including on abnormal termination.
pub trait ByteChannel {
    /// Number of bytes ready to read without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read exactly `buf.len()` bytes, blocking until satisfied.
    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Write the whole buffer.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Frame-level session over a [`ByteChannel`].
pub struct Session<C> {
    channel: C,
}

impl<C: ByteChannel> Session<C> {
    /// Open a session on a freshly connected channel, observing the board's
    /// settling delay before any read or write is issued.
    pub fn open(channel: C) -> Self {
        tracing::debug!(delay_s = SETTLE_DELAY.as_secs(), "Waiting for the board to settle");
        std::thread::sleep(SETTLE_DELAY);
        Self { channel }
    }

    /// Wrap a channel that has already settled (a resumed connection, or a
    /// test double).
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// The underlying byte channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Receive one frame matching `schema`.
    ///
    /// Polls until the channel has buffered at least the frame's width, then
    /// reads exactly that many bytes and decodes them. Blocks forever if the
    /// board never sends enough.
    pub fn receive(&mut self, schema: &FrameSchema) -> Result<Vec<FieldValue>, LinkError> {
        let width = schema.width();
        while self.channel.bytes_available()? < width {
            std::hint::spin_loop();
        }

        let mut buf = vec![0u8; width];
        self.channel.read_exactly(&mut buf)?;
        Ok(schema.decode(&buf)?)
    }

    /// Encode `values` against `schema` and write the frame. The board sends
    /// no acknowledgement.
    pub fn send(&mut self, schema: &FrameSchema, values: &[FieldValue]) -> Result<(), LinkError> {
        let bytes = schema.encode(values)?;
        self.channel.write_all(&bytes)?;
        Ok(())
    }
}
