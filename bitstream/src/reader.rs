//! Byte reader with bounded operations.

use crate::blittable::Blittable;
use crate::codec::WireCodec;
use crate::error::{BitError, BitResult};
use crate::writer::MAX_BYTES_AND_SIZE;

/// A byte reader over a borrowed slice.
///
/// All read operations are bounds-checked and return
/// [`BitError::EndOfData`] instead of panicking. A failed read leaves the
/// cursor where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Returns the total length of the underlying slice.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current cursor position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the full underlying slice.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Moves the cursor to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::PositionOutOfBounds`] if `position` is past the end.
    pub fn set_position(&mut self, position: usize) -> BitResult<()> {
        if position > self.data.len() {
            return Err(BitError::PositionOutOfBounds {
                position,
                len: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    fn take(&mut self, count: usize) -> BitResult<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(BitError::EndOfData {
                requested: count,
                available,
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.data[start..start + count])
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> BitResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a boolean; any non-zero byte is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> BitResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads a fixed-width little-endian value.
    #[inline]
    pub fn read_blittable<T: Blittable>(&mut self) -> BitResult<T> {
        self.take(T::SIZE).map(T::read_le)
    }

    /// Reads `count` bytes, borrowing from the underlying slice.
    pub fn read_bytes(&mut self, count: usize) -> BitResult<&'a [u8]> {
        self.take(count)
    }

    /// Reads any [`WireCodec`] value.
    #[inline]
    pub fn read<T: WireCodec>(&mut self) -> BitResult<T> {
        T::read(self)
    }

    /// Reads an optional string borrowed from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::EndOfData`] if the buffer is truncated and
    /// [`BitError::InvalidUtf8`] if the content is not UTF-8. The cursor is
    /// restored on error.
    pub fn read_str(&mut self) -> BitResult<Option<&'a str>> {
        let start = self.position;
        let result = self.read_str_inner();
        if result.is_err() {
            self.position = start;
        }
        result
    }

    fn read_str_inner(&mut self) -> BitResult<Option<&'a str>> {
        let prefix: u16 = self.read_blittable()?;
        if prefix == 0 {
            return Ok(None);
        }
        let bytes = self.take(usize::from(prefix - 1))?;
        std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|_| BitError::InvalidUtf8)
    }

    /// Reads an optional owned string.
    pub fn read_string(&mut self) -> BitResult<Option<String>> {
        Ok(self.read_str()?.map(str::to_owned))
    }

    /// Reads an optional byte array written by
    /// [`ByteWriter::write_bytes_and_size`](crate::ByteWriter::write_bytes_and_size).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::PayloadTooLarge`] if the declared size exceeds
    /// [`MAX_BYTES_AND_SIZE`], or [`BitError::EndOfData`] if truncated. The
    /// cursor is restored on error.
    pub fn read_bytes_and_size(&mut self) -> BitResult<Option<&'a [u8]>> {
        let start = self.position;
        let result = self.read_bytes_and_size_inner();
        if result.is_err() {
            self.position = start;
        }
        result
    }

    fn read_bytes_and_size_inner(&mut self) -> BitResult<Option<&'a [u8]>> {
        let prefix = self.read_var_u64()?;
        if prefix == 0 {
            return Ok(None);
        }
        let len = prefix - 1;
        if len > MAX_BYTES_AND_SIZE as u64 {
            return Err(BitError::PayloadTooLarge {
                len: usize::try_from(len).unwrap_or(usize::MAX),
                max: MAX_BYTES_AND_SIZE,
            });
        }
        self.take(len as usize).map(Some)
    }
}
