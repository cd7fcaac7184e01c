use std::io;

/// Collects bytes that may belong to an in-band error object until the
/// decoder is ready to parse them as a whole.
pub trait ErrorAccumulator: Send {
    /// Append bytes to the buffer
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Current contents of the buffer
    fn bytes(&self) -> &[u8];

    /// Drop everything written so far
    fn reset(&mut self);
}

/// Growable in-memory accumulator, optionally bounded
#[derive(Debug, Clone, Default)]
pub struct BufferAccumulator {
    buffer: Vec<u8>,
    max_len: Option<usize>,
}

impl BufferAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator that rejects writes growing it past `max_len` bytes
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_len: Some(max_len),
        }
    }
}

impl ErrorAccumulator for BufferAccumulator {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(max_len) = self.max_len {
            if self.buffer.len() + bytes.len() > max_len {
                return Err(io::Error::new(
                    io::ErrorKind::OutOfMemory,
                    format!("error buffer would exceed {max_len} bytes"),
                ));
            }
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}
