//! Byte-level encoding primitives for the snapline replication stack.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for byte-cursor
//! encoding and decoding, the prefix-byte varint scheme, smallest-three
//! quaternion compression, the [`WireCodec`] trait for statically dispatched
//! value encoding, and a caller-owned [`Pool`] for buffer reuse.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded reads** - Every read is bounds-checked and fails with
//!   [`BitError::EndOfData`] instead of panicking.
//! - **Infallible writes** - The writer grows on demand; only length-limited
//!   encodings (strings, sized byte arrays) can fail.
//! - **No domain knowledge** - This crate knows nothing about frames,
//!   entities, or timelines.
//!
//! # Example
//!
//! ```
//! use bitstream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_bool(true);
//! writer.write_var_u64(300);
//! writer.write_string(Some("crate")).unwrap();
//!
//! let mut reader = ByteReader::new(writer.as_slice());
//! assert!(reader.read_bool().unwrap());
//! assert_eq!(reader.read_var_u64().unwrap(), 300);
//! assert_eq!(reader.read_string().unwrap().as_deref(), Some("crate"));
//! ```

mod blittable;
mod codec;
mod error;
mod pool;
mod quaternion;
mod reader;
mod varint;
mod writer;

pub use blittable::Blittable;
pub use codec::{VarI64, VarU64, WireCodec};
pub use error::{BitError, BitResult};
pub use pool::{Pool, Pooled, Recycle};
pub use quaternion::{
    compress_quaternion, decompress_quaternion, largest_absolute_component_index,
    scale_float_to_uint, scale_uint_to_float, QUATERNION_MAX_ERROR, QUATERNION_MAX_RANGE,
    QUATERNION_MIN_RANGE,
};
pub use reader::ByteReader;
pub use varint::{var_u64_len, zigzag_decode, zigzag_encode, MAX_VARINT_LEN};
pub use writer::{ByteWriter, DEFAULT_CAPACITY, MAX_BYTES_AND_SIZE, MAX_STRING_LENGTH};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = ByteWriter::new();
        assert!(writer.as_slice().is_empty());

        let reader = ByteReader::new(writer.as_slice());
        assert!(reader.is_empty());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = ByteWriter::new();
        writer.write_bool(true);
        writer.write_blittable(0xBEEFu16);
        writer.write_var_i64(-1);
        writer.write_blittable(1.5f32);
        writer.write_bytes_and_size(Some(&[7, 8])).unwrap();

        let mut reader = ByteReader::new(writer.as_slice());
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_blittable::<u16>().unwrap(), 0xBEEF);
        assert_eq!(reader.read_var_i64().unwrap(), -1);
        assert_eq!(reader.read_blittable::<f32>().unwrap(), 1.5);
        assert_eq!(reader.read_bytes_and_size().unwrap(), Some(&[7u8, 8][..]));
        assert!(reader.is_empty());
    }

    #[test]
    fn doctest_example() {
        let mut writer = ByteWriter::new();
        writer.write_bool(true);
        writer.write_var_u64(300);
        writer.write_string(Some("crate")).unwrap();

        let mut reader = ByteReader::new(writer.as_slice());
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_var_u64().unwrap(), 300);
        assert_eq!(reader.read_string().unwrap().as_deref(), Some("crate"));
    }

    #[test]
    fn pooled_writer_is_reused() {
        let pool = Pool::writers();
        let capacity = {
            let mut writer = pool.acquire();
            writer.write_slice(&[0u8; 4000]);
            writer.capacity()
        };
        let writer = pool.acquire();
        assert!(writer.is_empty());
        assert_eq!(writer.capacity(), capacity);
    }
}
