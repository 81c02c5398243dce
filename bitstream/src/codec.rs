//! Statically dispatched value encoding.

use glam::{Quat, Vec3};

use crate::error::BitResult;
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// A value with a self-delimiting wire encoding.
///
/// Implementations must read back exactly the bytes they wrote; message
/// boundaries on the wire are implied by this.
pub trait WireCodec: Sized {
    /// Appends the encoding of `self` to the writer.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::PayloadTooLarge`](crate::BitError::PayloadTooLarge)
    /// if a length-limited part of the value does not fit its prefix. Bytes
    /// written before the failure are left in place; callers drop the send.
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()>;

    /// Reads a value from the reader.
    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self>;
}

macro_rules! impl_wire_codec_blittable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireCodec for $ty {
                #[inline]
                fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
                    writer.write_blittable(*self);
                    Ok(())
                }

                #[inline]
                fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
                    reader.read_blittable()
                }
            }
        )*
    };
}

impl_wire_codec_blittable!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, f32, f64);

impl WireCodec for bool {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_bool(*self);
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        reader.read_bool()
    }
}

/// A `u64` encoded as a variable-length integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VarU64(pub u64);

impl WireCodec for VarU64 {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_var_u64(self.0);
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        reader.read_var_u64().map(Self)
    }
}

/// An `i64` encoded as a zig-zag variable-length integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VarI64(pub i64);

impl WireCodec for VarI64 {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_var_i64(self.0);
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        reader.read_var_i64().map(Self)
    }
}

/// Strings longer than [`MAX_STRING_LENGTH`](crate::MAX_STRING_LENGTH) fail
/// with `PayloadTooLarge`.
impl WireCodec for String {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_string(Some(self))
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        Ok(reader.read_string()?.unwrap_or_default())
    }
}

impl<T: WireCodec> WireCodec for Option<T> {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        match self {
            Some(value) => {
                writer.write_bool(true);
                value.write(writer)
            }
            None => {
                writer.write_bool(false);
                Ok(())
            }
        }
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        if reader.read_bool()? {
            T::read(reader).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: WireCodec> WireCodec for Vec<T> {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_var_u64(self.len() as u64);
        for item in self {
            item.write(writer)?;
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        let len = reader.read_var_u64()?;
        // Every element takes at least one byte, so a count larger than the
        // remaining bytes is truncated input.
        if len > reader.remaining() as u64 {
            return Err(crate::BitError::EndOfData {
                requested: usize::try_from(len).unwrap_or(usize::MAX),
                available: reader.remaining(),
            });
        }
        let mut out = Vec::with_capacity(len as usize);
        for _ in 0..len {
            out.push(T::read(reader)?);
        }
        Ok(out)
    }
}

impl WireCodec for Vec3 {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_blittable(self.x);
        writer.write_blittable(self.y);
        writer.write_blittable(self.z);
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        let x = reader.read_blittable()?;
        let y = reader.read_blittable()?;
        let z = reader.read_blittable()?;
        Ok(Self::new(x, y, z))
    }
}

/// Quaternions are written in compressed smallest-three form (4 bytes).
impl WireCodec for Quat {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_quaternion(*self);
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        reader.read_quaternion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BitError;

    #[derive(Debug, Clone, PartialEq)]
    struct Spawn {
        id: VarU64,
        name: String,
        position: Vec3,
        health: Option<u16>,
    }

    impl WireCodec for Spawn {
        fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
            writer.write(&self.id)?;
            writer.write(&self.name)?;
            writer.write(&self.position)?;
            writer.write(&self.health)
        }

        fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
            Ok(Self {
                id: reader.read()?,
                name: reader.read()?,
                position: reader.read()?,
                health: reader.read()?,
            })
        }
    }

    #[test]
    fn struct_roundtrip() {
        let spawn = Spawn {
            id: VarU64(70_000),
            name: "crate".to_owned(),
            position: Vec3::new(1.0, -2.5, 3.25),
            health: Some(100),
        };
        let mut writer = ByteWriter::new();
        writer.write(&spawn).unwrap();

        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read::<Spawn>().unwrap(), spawn);
        assert!(reader.is_empty());
    }

    #[test]
    fn vec_roundtrip() {
        let values = vec![VarI64(-1), VarI64(0), VarI64(i64::MAX)];
        let mut writer = ByteWriter::new();
        writer.write(&values).unwrap();
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read::<Vec<VarI64>>().unwrap(), values);
    }

    #[test]
    fn vec_rejects_impossible_length() {
        let mut writer = ByteWriter::new();
        writer.write_var_u64(1_000_000);
        let mut reader = ByteReader::new(writer.as_slice());
        let err = reader.read::<Vec<u8>>().unwrap_err();
        assert!(matches!(err, BitError::EndOfData { .. }));
    }

    #[test]
    fn option_none_is_one_byte() {
        let mut writer = ByteWriter::new();
        writer.write(&None::<u64>).unwrap();
        assert_eq!(writer.as_slice(), &[0]);
    }

    #[test]
    fn oversized_string_is_rejected() {
        let long = "x".repeat(70_000);
        let mut writer = ByteWriter::new();
        let err = writer.write(&long).unwrap_err();
        assert_eq!(
            err,
            BitError::PayloadTooLarge {
                len: 70_000,
                max: crate::MAX_STRING_LENGTH
            }
        );
        assert!(writer.is_empty());
    }

    #[test]
    fn oversized_string_in_vec_fails_whole_write() {
        let values = vec!["ok".to_owned(), "é".repeat(crate::MAX_STRING_LENGTH)];
        let mut writer = ByteWriter::new();
        assert!(matches!(
            writer.write(&values),
            Err(BitError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn string_at_limit_roundtrips() {
        let value = "x".repeat(crate::MAX_STRING_LENGTH);
        let mut writer = ByteWriter::new();
        writer.write(&value).unwrap();
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read::<String>().unwrap(), value);
    }

    #[test]
    fn quat_uses_four_bytes() {
        let mut writer = ByteWriter::new();
        writer.write(&Quat::from_rotation_x(0.5)).unwrap();
        assert_eq!(writer.len(), 4);
    }
}
