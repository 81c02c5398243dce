//! Growable byte writer with a movable cursor.

use crate::blittable::Blittable;
use crate::codec::WireCodec;
use crate::error::{BitError, BitResult};

/// Maximum content length of a string, in bytes.
///
/// Strings are prefixed with `u16` length + 1, and 0 is reserved for `None`.
pub const MAX_STRING_LENGTH: usize = u16::MAX as usize - 1;

/// Maximum length accepted by [`ByteWriter::write_bytes_and_size`] and
/// [`ByteReader::read_bytes_and_size`](crate::ByteReader::read_bytes_and_size).
pub const MAX_BYTES_AND_SIZE: usize = 16 * 1024 * 1024;

/// Default capacity for writers created with [`ByteWriter::new`].
pub const DEFAULT_CAPACITY: usize = 1500;

/// A growable byte writer.
///
/// The cursor ([`position`](Self::position)) doubles as the logical length:
/// everything before it is written data. The cursor can be moved back to
/// patch a header and forward again to continue. Writing past the current
/// capacity doubles the backing storage, so plain writes never fail.
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    position: usize,
}

/// The default writer has no storage; it allocates on first write.
impl Default for ByteWriter {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl ByteWriter {
    /// Creates a new writer with [`DEFAULT_CAPACITY`] bytes of storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: vec![0; bytes],
            position: 0,
        }
    }

    /// Returns the current cursor position, which is also the written length.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor, growing the buffer if needed.
    pub fn set_position(&mut self, position: usize) {
        self.ensure_capacity(position);
        self.position = position;
    }

    /// Returns the number of written bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.position
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Returns the size of the backing storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Rewinds the cursor to zero without releasing storage.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.position]
    }

    /// Copies the written bytes into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    fn ensure_capacity(&mut self, required: usize) {
        if self.buf.len() < required {
            let grown = required.max(self.buf.len().saturating_mul(2));
            self.buf.resize(grown, 0);
        }
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.ensure_capacity(self.position + 1);
        self.buf[self.position] = value;
        self.position += 1;
    }

    /// Writes a boolean as one byte (0 or 1).
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Writes a fixed-width value in little-endian order.
    #[inline]
    pub fn write_blittable<T: Blittable>(&mut self, value: T) {
        let end = self.position + T::SIZE;
        self.ensure_capacity(end);
        value.write_le(&mut self.buf[self.position..end]);
        self.position = end;
    }

    /// Writes `count` bytes of `src` starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + count` is out of bounds for `src`.
    pub fn write_bytes(&mut self, src: &[u8], offset: usize, count: usize) {
        self.write_slice(&src[offset..offset + count]);
    }

    /// Writes an entire slice.
    pub fn write_slice(&mut self, src: &[u8]) {
        let end = self.position + src.len();
        self.ensure_capacity(end);
        self.buf[self.position..end].copy_from_slice(src);
        self.position = end;
    }

    /// Writes any [`WireCodec`] value.
    ///
    /// # Errors
    ///
    /// Propagates the value's [`WireCodec::write`] error.
    #[inline]
    pub fn write<T: WireCodec>(&mut self, value: &T) -> BitResult<()> {
        value.write(self)
    }

    /// Writes an optional string as `[u16 len+1][utf8]`, with 0 meaning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::PayloadTooLarge`] if the string is longer than
    /// [`MAX_STRING_LENGTH`] bytes. Nothing is written in that case.
    pub fn write_string(&mut self, value: Option<&str>) -> BitResult<()> {
        let Some(value) = value else {
            self.write_blittable(0u16);
            return Ok(());
        };
        let len = value.len();
        if len > MAX_STRING_LENGTH {
            return Err(BitError::PayloadTooLarge {
                len,
                max: MAX_STRING_LENGTH,
            });
        }
        self.write_blittable((len + 1) as u16);
        self.write_slice(value.as_bytes());
        Ok(())
    }

    /// Writes an optional byte array as `[varint len+1][bytes]`, with 0
    /// meaning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::PayloadTooLarge`] if the array is longer than
    /// [`MAX_BYTES_AND_SIZE`]. Nothing is written in that case.
    pub fn write_bytes_and_size(&mut self, value: Option<&[u8]>) -> BitResult<()> {
        let Some(value) = value else {
            self.write_var_u64(0);
            return Ok(());
        };
        if value.len() > MAX_BYTES_AND_SIZE {
            return Err(BitError::PayloadTooLarge {
                len: value.len(),
                max: MAX_BYTES_AND_SIZE,
            });
        }
        self.write_var_u64(value.len() as u64 + 1);
        self.write_slice(value);
        Ok(())
    }
}
