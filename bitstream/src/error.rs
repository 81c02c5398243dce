//! Error types for byte buffer operations.

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur while encoding or decoding byte buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    EndOfData {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A length-prefixed payload exceeds what its prefix can describe.
    #[error("payload of {len} bytes exceeds the maximum of {max} bytes")]
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// Varint prefix byte with no mapped length.
    ///
    /// The current table maps all 256 prefixes, so this indicates corruption
    /// upstream of the decoder.
    #[error("unknown varint prefix byte 0x{prefix:02X}")]
    UnknownVarintPrefix {
        /// The offending prefix byte.
        prefix: u8,
    },

    /// Decoded varint does not fit in the requested integer width.
    #[error("varint value {value} does not fit in {bits} bits")]
    VarintOverflow {
        /// The decoded value.
        value: u64,
        /// Width of the target type.
        bits: u8,
    },

    /// Cursor moved outside the buffer.
    #[error("position {position} is outside a buffer of {len} bytes")]
    PositionOutOfBounds {
        /// The requested position.
        position: usize,
        /// Length of the buffer.
        len: usize,
    },
}
