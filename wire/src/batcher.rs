//! Outgoing message batching.

use std::collections::VecDeque;

use bitstream::{BitResult, ByteWriter, Pool, Pooled};
use log::{debug, trace, warn};

use crate::error::EncodeError;
use crate::header::{encode_timestamp, HEADER_SIZE};
use crate::limits::Limits;

/// Packs messages into timestamped frames sized for the transport.
///
/// Each frame is `[f64 timestamp][message]*`. The timestamp is the one
/// passed with the message that opened the frame. Messages are appended
/// back to back without framing of their own, so receivers must be able to
/// tell where a message ends from its content.
#[derive(Debug)]
pub struct FrameBatcher {
    limits: Limits,
    pool: Pool<ByteWriter>,
    open: Option<Pooled<ByteWriter>>,
    closed: VecDeque<Pooled<ByteWriter>>,
}

impl FrameBatcher {
    /// Creates a batcher that draws frame buffers from `pool`.
    #[must_use]
    pub fn new(limits: Limits, pool: Pool<ByteWriter>) -> Self {
        Self {
            limits,
            pool,
            open: None,
            closed: VecDeque::new(),
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Appends a message, opening a new frame when the current one would
    /// grow past the threshold.
    ///
    /// A message larger than the threshold still goes out, alone in its
    /// own frame.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::MessageTooLarge`] if the message exceeds
    /// `max_message_bytes`. The message is dropped and queued frames are
    /// left untouched.
    pub fn add_message(&mut self, message: &[u8], timestamp: f64) -> Result<(), EncodeError> {
        if message.len() > self.limits.max_message_bytes {
            warn!(
                "dropping {} byte message, max is {}",
                message.len(),
                self.limits.max_message_bytes
            );
            return Err(EncodeError::MessageTooLarge {
                len: message.len(),
                max: self.limits.max_message_bytes,
            });
        }

        let rotate = self.open.as_ref().map_or(true, |frame| {
            frame.len().saturating_add(message.len()) > self.limits.frame_threshold
        });
        if rotate {
            if let Some(full) = self.open.take() {
                debug!("closing {} byte frame", full.len());
                self.closed.push_back(full);
            }
            let mut frame = self.pool.acquire();
            encode_timestamp(&mut frame, timestamp);
            self.open = Some(frame);
        }

        if let Some(frame) = self.open.as_mut() {
            frame.write_slice(message);
            trace!("batched {} byte message, frame at {}", message.len(), frame.len());
        }
        Ok(())
    }

    /// Serializes a message with a pooled scratch writer, then batches it.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Bitstream`] if `write` fails, or
    /// [`EncodeError::MessageTooLarge`] as for [`add_message`](Self::add_message).
    pub fn add_with<F>(&mut self, timestamp: f64, write: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut ByteWriter) -> BitResult<()>,
    {
        let mut scratch = self.pool.acquire();
        write(&mut scratch)?;
        self.add_message(scratch.as_slice(), timestamp)
    }

    /// Takes the next frame to send: the oldest closed frame, else the
    /// partially filled open frame.
    ///
    /// Dropping the returned guard recycles the buffer.
    pub fn take_frame(&mut self) -> Option<Pooled<ByteWriter>> {
        self.closed.pop_front().or_else(|| self.open.take())
    }

    /// Returns the number of frames waiting to be taken, including the open
    /// frame.
    #[must_use]
    pub fn queued_frames(&self) -> usize {
        self.closed.len() + usize::from(self.open.is_some())
    }

    /// Returns `true` if any message is waiting to be sent.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.queued_frames() > 0
    }

    /// Returns the payload bytes of the open frame, excluding its header.
    #[must_use]
    pub fn open_payload_len(&self) -> usize {
        self.open
            .as_ref()
            .map_or(0, |frame| frame.len().saturating_sub(HEADER_SIZE))
    }
}
