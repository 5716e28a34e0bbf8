/// Forward-only reader over an in-memory MIDI buffer
///
/// Reads past the end never panic: single bytes come back as `None` and
/// skips are clamped to the end of the buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = self.peek_u8()?;
        self.offset += 1;
        Some(byte)
    }

    pub fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.offset..self.offset + N)?;
        self.offset += N;
        bytes.try_into().ok()
    }

    pub fn read_u16_be(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32_be(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Advance by `count` bytes, returning how many were actually skipped
    pub fn skip(&mut self, count: usize) -> usize {
        let skipped = count.min(self.remaining());
        self.offset += skipped;
        skipped
    }

    /// Split off the next `len` bytes (fewer if the buffer ends first)
    pub fn take(&mut self, len: usize) -> ByteCursor<'a> {
        let end = self.offset + len.min(self.remaining());
        let sub = ByteCursor::new(&self.data[self.offset..end]);
        self.offset = end;
        sub
    }
}
