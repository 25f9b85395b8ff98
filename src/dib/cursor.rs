//! Little-endian cursor over the input bytes.

use crate::error::DibError;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Reads past `end` fail; RLE streams narrow this to the declared size.
    end: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub(crate) fn eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Restrict reads to `len` bytes starting at the current position.
    pub(crate) fn limit_to(&mut self, len: usize) {
        self.end = self.pos.saturating_add(len).min(self.data.len());
    }

    fn truncated(&self, needed: usize) -> DibError {
        DibError::TruncatedStream {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    /// Seek to `pos`. Seeking past the end reports the bytes the seek would
    /// have needed from the current position.
    pub(crate) fn set_position(&mut self, pos: usize) -> Result<(), DibError> {
        if pos > self.end {
            return Err(self.truncated(pos - self.pos));
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), DibError> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        self.pos += n;
        Ok(())
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], DibError> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], DibError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DibError> {
        let [b] = self.read_fixed_bytes::<1>()?;
        Ok(b)
    }

    pub(crate) fn read_u16_le(&mut self) -> Result<u16, DibError> {
        Ok(u16::from_le_bytes(self.read_fixed_bytes()?))
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, DibError> {
        Ok(u32::from_le_bytes(self.read_fixed_bytes()?))
    }

    pub(crate) fn read_i32_le(&mut self) -> Result<i32, DibError> {
        Ok(i32::from_le_bytes(self.read_fixed_bytes()?))
    }

    /// Fill `buf`, zero-padding whatever is missing. Returns the number of
    /// bytes that were actually available.
    pub(crate) fn read_zero_padded(&mut self, buf: &mut [u8]) -> usize {
        let available = buf.len().min(self.remaining());
        buf[..available].copy_from_slice(&self.data[self.pos..self.pos + available]);
        buf[available..].fill(0);
        self.pos += available;
        available
    }
}
