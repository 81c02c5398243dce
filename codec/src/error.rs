//! Error types for replication.

use bitstream::BitError;

/// Result type for replication operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Hard replication errors. The caller should drop the connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Reading the mask or a size byte failed.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitError),

    /// An entity was built with more components than a mask can address.
    #[error("too many components: {actual} > {limit}")]
    TooManyComponents { limit: usize, actual: usize },

    /// The dirty mask names a component the entity does not have.
    #[error("dirty mask names component {index}, entity has {count}")]
    UnknownComponent { index: usize, count: usize },

    /// The remote sent state for a component we have authority over.
    #[error("remote wrote component {index}, which is writable locally")]
    UnauthorizedWrite { index: usize },

    /// A component failed to write its payload. The record was dropped.
    #[error("component {index} failed to serialize: {source}")]
    Serialize { index: usize, source: BitError },

    /// A component moved the reader back before its own payload.
    #[error("component {index} rewound the reader to {position}, payload starts at {start}")]
    ReaderRewound {
        index: usize,
        start: usize,
        position: usize,
    },

    /// Size corrections kept happening; the stream is not trustworthy.
    #[error("{count} consecutive passes needed size correction (limit {limit})")]
    TooManySizeMismatches { count: usize, limit: usize },
}

/// A recovered per-component fault, reported instead of failing the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentFault {
    /// The component read a different number of bytes than the sender wrote.
    /// The reader was moved to where the sender's payload most likely ended.
    SizeMismatch {
        /// Component index.
        index: usize,
        /// Low byte of the payload size, as sent.
        safety: u8,
        /// Bytes the component actually read.
        consumed: usize,
        /// Payload size assumed after correction.
        corrected: usize,
        /// Set if the component's own read failed.
        read_error: Option<BitError>,
    },
}

impl ComponentFault {
    /// Returns the index of the faulty component.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::SizeMismatch { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_component() {
        let err = CodecError::UnknownComponent { index: 9, count: 3 };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn display_too_many_mismatches() {
        let err = CodecError::TooManySizeMismatches { count: 4, limit: 4 };
        assert!(err.to_string().contains("consecutive"));
    }

    #[test]
    fn display_serialize_names_component() {
        let err = CodecError::Serialize {
            index: 3,
            source: BitError::PayloadTooLarge {
                len: 70_000,
                max: 65_534,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("component 3"));
        assert!(msg.contains("70000"));
    }

    #[test]
    fn bit_error_converts() {
        let err: CodecError = BitError::InvalidUtf8.into();
        assert_eq!(err, CodecError::Bitstream(BitError::InvalidUtf8));
    }

    #[test]
    fn fault_index() {
        let fault = ComponentFault::SizeMismatch {
            index: 2,
            safety: 4,
            consumed: 3,
            corrected: 4,
            read_error: None,
        };
        assert_eq!(fault.index(), 2);
    }
}
