//! Shared test doubles.

use incline_link::ByteChannel;
use std::collections::VecDeque;
use std::io;

/// Scripted byte channel: queued input bytes, captured output bytes.
#[derive(Default)]
pub struct ScriptedChannel {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
}

impl ScriptedChannel {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            output: Vec::new(),
        }
    }
}

impl ByteChannel for ScriptedChannel {
    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.input.len())
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<()> {
        for slot in buf.iter_mut() {
            *slot = self
                .input
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script ran dry"))?;
        }
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }
}
