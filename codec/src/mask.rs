//! 64-bit dirty masks.

use bitstream::{BitResult, ByteReader, ByteWriter, WireCodec};

/// Maximum number of components per entity: one bit each in a `u64` mask.
pub const MAX_COMPONENTS: usize = 64;

/// Set of changed component indices.
///
/// Bit `i` set means component `i` changed. Encoded on the wire as a
/// varint, so masks touching only the first few components stay short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirtyMask(u64);

impl DirtyMask {
    /// A mask with no bits set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A mask with the low `count` bits set.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`MAX_COMPONENTS`].
    #[must_use]
    pub const fn all(count: usize) -> Self {
        assert!(count <= MAX_COMPONENTS, "mask wider than 64 components");
        if count == MAX_COMPONENTS {
            Self(u64::MAX)
        } else {
            Self((1u64 << count) - 1)
        }
    }

    /// Wraps raw mask bits.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw mask bits.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Sets bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`MAX_COMPONENTS`].
    pub fn set(&mut self, index: usize) {
        assert!(index < MAX_COMPONENTS, "component index {index} out of range");
        self.0 |= 1 << index;
    }

    /// Clears bit `index`. Out-of-range indices are ignored.
    pub fn unset(&mut self, index: usize) {
        if index < MAX_COMPONENTS {
            self.0 &= !(1 << index);
        }
    }

    /// Returns `true` if bit `index` is set.
    #[must_use]
    pub const fn is_set(self, index: usize) -> bool {
        index < MAX_COMPONENTS && self.0 & (1 << index) != 0
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of set bits.
    #[must_use]
    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns the bits set in either mask.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the highest set index, if any.
    #[must_use]
    pub const fn highest(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(63 - self.0.leading_zeros() as usize)
        }
    }

    /// Iterates over set indices in ascending order.
    #[must_use]
    pub const fn iter(self) -> DirtyBits {
        DirtyBits(self.0)
    }
}

impl IntoIterator for DirtyMask {
    type Item = usize;
    type IntoIter = DirtyBits;

    fn into_iter(self) -> DirtyBits {
        self.iter()
    }
}

impl FromIterator<usize> for DirtyMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for index in iter {
            mask.set(index);
        }
        mask
    }
}

/// Iterator over the set indices of a [`DirtyMask`].
#[derive(Debug, Clone)]
pub struct DirtyBits(u64);

impl Iterator for DirtyBits {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        // clear lowest set bit
        self.0 &= self.0 - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.0.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DirtyBits {}

impl WireCodec for DirtyMask {
    fn write(&self, writer: &mut ByteWriter) -> BitResult<()> {
        writer.write_var_u64(self.0);
        Ok(())
    }

    fn read(reader: &mut ByteReader<'_>) -> BitResult<Self> {
        reader.read_var_u64().map(Self)
    }
}
