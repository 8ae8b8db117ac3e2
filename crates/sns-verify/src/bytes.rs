//! Byte buffer with a read offset.
//!
//! The DER decoder reads through a `ByteCursor`; the encoder appends to one.
//! Clones are independent, so a probe parse never moves the original.

/// Attempted to read more bytes than remain unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer underrun: requested {requested} bytes, {available} available")]
pub struct BufferUnderrun {
    pub available: usize,
    pub requested: usize,
}

/// Owned bytes plus a read position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteCursor {
    data: Vec<u8>,
    read: usize,
}

impl ByteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            read: 0,
        }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current read offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.read
    }

    fn ensure(&self, n: usize) -> Result<(), BufferUnderrun> {
        if n > self.remaining() {
            return Err(BufferUnderrun {
                available: self.remaining(),
                requested: n,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, BufferUnderrun> {
        self.ensure(1)?;
        let b = self.data[self.read];
        self.read += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, BufferUnderrun> {
        let out = self.peek_bytes(n)?.to_vec();
        self.read += n;
        Ok(out)
    }

    pub fn peek_u8(&self) -> Result<u8, BufferUnderrun> {
        self.ensure(1)?;
        Ok(self.data[self.read])
    }

    /// Borrow the next `n` unread bytes without advancing.
    pub fn peek_bytes(&self, n: usize) -> Result<&[u8], BufferUnderrun> {
        self.ensure(n)?;
        Ok(&self.data[self.read..self.read + n])
    }

    pub fn skip(&mut self, n: usize) -> Result<(), BufferUnderrun> {
        self.ensure(n)?;
        self.read += n;
        Ok(())
    }

    /// Read a big-endian unsigned integer of `bits` width (8, 16, 24 or 32).
    pub fn read_uint(&mut self, bits: u32) -> Result<u32, BufferUnderrun> {
        debug_assert!(matches!(bits, 8 | 16 | 24 | 32), "unsupported width {bits}");
        let n = (bits / 8) as usize;
        let bytes = self.peek_bytes(n)?;
        let value = bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
        self.read += n;
        Ok(value)
    }

    pub fn put_u8(&mut self, b: u8) -> &mut Self {
        self.data.push(b);
        self
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Unread bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.read..]
    }

    /// Consume the cursor, returning the unread bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.drain(..self.read);
        self.data
    }

    /// Lowercase hex of the unread bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }
}

impl From<Vec<u8>> for ByteCursor {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<&[u8]> for ByteCursor {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(data)
    }
}
