use crate::keys::ESCAPE;

/// The keys that end an echo session, oldest first.
pub const EXIT_SEQUENCE: [u8; 3] = [ESCAPE, b':', b'q'];

/// Remembers the last three bytes read so the exit sequence can be spotted.
#[derive(Debug, Default, Clone)]
pub struct ExitSequence {
    buf: [u8; 3],
    // next slot to overwrite, which is also the oldest byte
    idx: usize,
}

impl ExitSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, byte: u8) {
        self.buf[self.idx] = byte;
        self.idx = (self.idx + 1) % self.buf.len();
    }

    /// Whether the last three inserted bytes spell out [`EXIT_SEQUENCE`].
    pub fn should_exit(&self) -> bool {
        self.buf
            .iter()
            .cycle()
            .skip(self.idx)
            .take(self.buf.len())
            .eq(EXIT_SEQUENCE.iter())
    }
}
