//! Variable-length integer encoding.
//!
//! Unsigned values use a prefix-byte scheme where the first byte alone tells
//! the decoder how many bytes follow:
//!
//! | first byte | total bytes | values                         |
//! |------------|-------------|--------------------------------|
//! | 0–240      | 1           | 0–240                          |
//! | 241–248    | 2           | 241–2287                       |
//! | 249        | 3           | 2288–67823                     |
//! | 250        | 4           | up to 2^24−1, 3 raw LE bytes   |
//! | 251        | 5           | up to 2^32−1, 4 raw LE bytes   |
//! | 252        | 6           | up to 2^40−1, 5 raw LE bytes   |
//! | 253        | 7           | up to 2^48−1, 6 raw LE bytes   |
//! | 254        | 8           | up to 2^56−1, 7 raw LE bytes   |
//! | 255        | 9           | full `u64`, 8 raw LE bytes     |
//!
//! Signed values are zig-zag mapped onto unsigned first so small magnitudes
//! of either sign stay short.

use crate::error::{BitError, BitResult};
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

const ONE_BYTE_MAX: u64 = 240;
const TWO_BYTE_MAX: u64 = 2287;
const THREE_BYTE_MAX: u64 = 67823;

/// Maximum encoded length of a varint in bytes.
pub const MAX_VARINT_LEN: usize = 9;

/// Returns the encoded length of `value` in bytes.
#[must_use]
pub const fn var_u64_len(value: u64) -> usize {
    if value <= ONE_BYTE_MAX {
        1
    } else if value <= TWO_BYTE_MAX {
        2
    } else if value <= THREE_BYTE_MAX {
        3
    } else {
        // 4..=9: one prefix byte plus the minimal number of raw bytes (>= 3).
        let raw = (64 - value.leading_zeros() as usize).div_ceil(8);
        1 + if raw < 3 { 3 } else { raw }
    }
}

/// Maps a signed value onto unsigned so that small magnitudes stay small.
#[inline]
#[must_use]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
#[must_use]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

impl ByteWriter {
    /// Writes an unsigned varint (1–9 bytes).
    pub fn write_var_u64(&mut self, value: u64) {
        if value <= ONE_BYTE_MAX {
            self.write_u8(value as u8);
        } else if value <= TWO_BYTE_MAX {
            let rest = value - ONE_BYTE_MAX;
            self.write_u8(((rest >> 8) + 241) as u8);
            self.write_u8((rest & 0xFF) as u8);
        } else if value <= THREE_BYTE_MAX {
            let rest = value - (TWO_BYTE_MAX + 1);
            self.write_u8(249);
            self.write_u8((rest >> 8) as u8);
            self.write_u8((rest & 0xFF) as u8);
        } else {
            let raw = var_u64_len(value) - 1;
            // 3 raw bytes -> 250, ..., 8 raw bytes -> 255
            self.write_u8((247 + raw) as u8);
            self.write_slice(&value.to_le_bytes()[..raw]);
        }
    }

    /// Writes a zig-zag encoded signed varint.
    pub fn write_var_i64(&mut self, value: i64) {
        self.write_var_u64(zigzag_encode(value));
    }

    /// Writes a `u32` as an unsigned varint.
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_var_u64(u64::from(value));
    }

    /// Writes an `i32` as a zig-zag encoded varint.
    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_i64(i64::from(value));
    }
}

impl ByteReader<'_> {
    /// Reads an unsigned varint.
    ///
    /// The cursor is restored if the varint is truncated.
    pub fn read_var_u64(&mut self) -> BitResult<u64> {
        let start = self.position();
        let result = self.read_var_u64_inner();
        if result.is_err() {
            // start was a valid position, so this cannot fail
            let _ = self.set_position(start);
        }
        result
    }

    fn read_var_u64_inner(&mut self) -> BitResult<u64> {
        let prefix = self.read_u8()?;
        match prefix {
            0..=240 => Ok(u64::from(prefix)),
            241..=248 => {
                let low = self.read_u8()?;
                Ok(ONE_BYTE_MAX + 256 * u64::from(prefix - 241) + u64::from(low))
            }
            249 => {
                let high = self.read_u8()?;
                let low = self.read_u8()?;
                Ok(TWO_BYTE_MAX + 1 + 256 * u64::from(high) + u64::from(low))
            }
            250..=255 => {
                let raw = usize::from(prefix - 247);
                let bytes = self.read_bytes(raw)?;
                let mut buf = [0u8; 8];
                buf[..raw].copy_from_slice(bytes);
                Ok(u64::from_le_bytes(buf))
            }
        }
    }

    /// Reads a zig-zag encoded signed varint.
    pub fn read_var_i64(&mut self) -> BitResult<i64> {
        self.read_var_u64().map(zigzag_decode)
    }

    /// Reads an unsigned varint that must fit in a `u32`.
    pub fn read_var_u32(&mut self) -> BitResult<u32> {
        let value = self.read_var_u64()?;
        u32::try_from(value).map_err(|_| BitError::VarintOverflow { value, bits: 32 })
    }

    /// Reads a zig-zag encoded varint that must fit in an `i32`.
    pub fn read_var_i32(&mut self) -> BitResult<i32> {
        let raw = self.read_var_u64()?;
        i32::try_from(zigzag_decode(raw))
            .map_err(|_| BitError::VarintOverflow { value: raw, bits: 32 })
    }
}
