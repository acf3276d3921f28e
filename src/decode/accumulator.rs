/// Reassembles exact `frame_size`-byte frames from a byte stream delivered in arbitrary chunks.
///
/// A chunk may end mid-frame or carry several frames; frame boundaries never depend on chunk
/// boundaries. Total emitted bytes equal total pushed bytes once the stream ends on a frame
/// boundary.
#[derive(Debug)]
pub struct FrameByteAccumulator {
    buf: Vec<u8>,
    offset: usize,
}

impl FrameByteAccumulator {
    /// Allocate a buffer for frames of `frame_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics when `frame_size == 0`.
    pub fn new(frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be non-zero");
        Self {
            buf: vec![0u8; frame_size],
            offset: 0,
        }
    }

    /// Bytes per frame.
    pub fn frame_size(&self) -> usize {
        self.buf.len()
    }

    /// Bytes of the current partial frame.
    pub fn pending(&self) -> usize {
        self.offset
    }

    /// Feed one chunk, calling `emit` with every frame it completes, in order.
    pub fn push(&mut self, mut chunk: &[u8], mut emit: impl FnMut(Vec<u8>)) {
        let frame_size = self.buf.len();
        while !chunk.is_empty() {
            let n = (frame_size - self.offset).min(chunk.len());
            self.buf[self.offset..self.offset + n].copy_from_slice(&chunk[..n]);
            self.offset += n;
            chunk = &chunk[n..];
            if self.offset == frame_size {
                emit(self.buf.clone());
                self.offset = 0;
            }
        }
    }

    /// Convenience wrapper collecting the frames completed by `chunk`.
    pub fn push_collect(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        self.push(chunk, |f| out.push(f));
        out
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/accumulator.rs"]
mod tests;
