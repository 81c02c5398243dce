//! Configurable limits for batching and bounded unbatching.

use crate::header::HEADER_SIZE;

/// Wire-level limits for frame batching.
///
/// The batcher uses `frame_threshold` and `max_message_bytes`; the unbatcher
/// enforces `max_frame_bytes` and `max_queued_frames` so a peer cannot make
/// us buffer unbounded data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// A frame is closed before a message would push it past this size.
    pub frame_threshold: usize,

    /// Largest message the batcher accepts.
    pub max_message_bytes: usize,

    /// Largest frame the unbatcher accepts.
    pub max_frame_bytes: usize,

    /// Maximum number of frames waiting in the unbatcher.
    pub max_queued_frames: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Fits a typical UDP payload under a 1280-byte MTU
            frame_threshold: 1200,
            max_message_bytes: 64 * 1024,
            max_frame_bytes: 64 * 1024 + HEADER_SIZE,
            max_queued_frames: 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            frame_threshold: 64,
            max_message_bytes: 256,
            max_frame_bytes: 256 + HEADER_SIZE,
            max_queued_frames: 8,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            frame_threshold: usize::MAX,
            max_message_bytes: usize::MAX,
            max_frame_bytes: usize::MAX,
            max_queued_frames: usize::MAX,
        }
    }

    /// Derives limits from a transport's maximum packet size.
    ///
    /// Frames never exceed one packet, and a message must fit in a frame
    /// together with its timestamp header.
    #[must_use]
    pub const fn for_transport(max_packet_size: usize) -> Self {
        Self {
            frame_threshold: max_packet_size,
            max_message_bytes: max_packet_size.saturating_sub(HEADER_SIZE),
            max_frame_bytes: max_packet_size,
            max_queued_frames: 1024,
        }
    }
}
