//! Error types for frame batching and unbatching.

use bitstream::BitError;

/// Result type for frame decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors raised while accepting or reading a received frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Frame is too small to contain the timestamp header.
    #[error("frame too small: {actual} bytes, need at least {required}")]
    FrameTooSmall { actual: usize, required: usize },

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Underlying byte reader error.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitError),
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FrameBytes,
    QueuedFrames,
    MessageBytes,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FrameBytes => "frame bytes",
            Self::QueuedFrames => "queued frames",
            Self::MessageBytes => "message bytes",
        };
        write!(f, "{name}")
    }
}

/// Errors raised while batching outgoing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// Message is larger than the transport can carry; it was dropped.
    #[error("message too large: {len} bytes, max {max}")]
    MessageTooLarge { len: usize, max: usize },

    /// Serializing the message failed.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_frame_too_small() {
        let err = DecodeError::FrameTooSmall {
            actual: 3,
            required: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("frame too small"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn decode_error_display_limits_exceeded() {
        let err = DecodeError::LimitsExceeded {
            kind: LimitKind::QueuedFrames,
            limit: 4,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("queued frames"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn bit_error_converts() {
        let err: DecodeError = BitError::EndOfData {
            requested: 8,
            available: 2,
        }
        .into();
        assert!(matches!(err, DecodeError::Bitstream(_)));
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::MessageTooLarge { len: 100, max: 10 };
        assert!(err.to_string().contains("message too large"));
    }
}
