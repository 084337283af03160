//! Serial-port byte channel.

use crate::ByteChannel;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Per-read timeout on the underlying port. [`crate::Session`] only reads
/// once a full frame is buffered, so this never fires in normal operation;
/// it bounds a read against a port that dies mid-frame.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Exclusive handle on the board's serial device.
///
/// The port is released when the channel is dropped.
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Open `port_name` at `baud_rate`.
    pub fn open(port_name: &str, baud_rate: u32) -> serialport::Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        tracing::info!(port_name, baud_rate, "Serial port open");
        Ok(Self { port })
    }
}

impl ByteChannel for SerialChannel {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let n = self.port.bytes_to_read().map_err(io::Error::from)?;
        Ok(n as usize)
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.port.read_exact(buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}
