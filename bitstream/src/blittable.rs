//! Fixed-width little-endian value types.

/// A plain value with a fixed little-endian byte layout.
///
/// Implemented for all primitive integers and floats. The encoded size is
/// always [`SIZE`](Self::SIZE) bytes regardless of the value.
pub trait Blittable: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Writes the value into `out`, which is exactly `SIZE` bytes long.
    fn write_le(self, out: &mut [u8]);

    /// Reads the value from `bytes`, which is exactly `SIZE` bytes long.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_blittable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Blittable for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_blittable!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, f32, f64);
