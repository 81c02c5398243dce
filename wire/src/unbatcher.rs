//! Incoming frame unbatching.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use bitstream::{ByteReader, ByteWriter, Pool, Pooled};
use log::{debug, trace};

use crate::error::{DecodeError, LimitKind, WireResult};
use crate::header::{decode_timestamp, HEADER_SIZE};
use crate::limits::Limits;

/// Splits received frames back into messages.
///
/// Frames are copied into pooled buffers and consumed in arrival order.
/// A message never spans two frames.
#[derive(Debug)]
pub struct FrameUnbatcher {
    limits: Limits,
    pool: Pool<ByteWriter>,
    frames: VecDeque<Pooled<ByteWriter>>,
    /// Read position inside the front frame.
    cursor: usize,
    /// Timestamp header of the front frame.
    remote_timestamp: f64,
}

impl FrameUnbatcher {
    /// Creates an unbatcher that copies frames into buffers from `pool`.
    #[must_use]
    pub fn new(limits: Limits, pool: Pool<ByteWriter>) -> Self {
        Self {
            limits,
            pool,
            frames: VecDeque::new(),
            cursor: 0,
            remote_timestamp: 0.0,
        }
    }

    /// Queues a received frame.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FrameTooSmall`] if the frame cannot hold the
    /// timestamp header, and [`DecodeError::LimitsExceeded`] if it is larger
    /// than `max_frame_bytes` or the queue is full. Rejected frames leave the
    /// queue untouched.
    pub fn add_frame(&mut self, frame: &[u8]) -> WireResult<()> {
        if frame.len() < HEADER_SIZE {
            return Err(DecodeError::FrameTooSmall {
                actual: frame.len(),
                required: HEADER_SIZE,
            });
        }
        if frame.len() > self.limits.max_frame_bytes {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::FrameBytes,
                limit: self.limits.max_frame_bytes,
                actual: frame.len(),
            });
        }
        if self.frames.len() >= self.limits.max_queued_frames {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::QueuedFrames,
                limit: self.limits.max_queued_frames,
                actual: self.frames.len() + 1,
            });
        }

        let mut buffer = self.pool.acquire();
        buffer.write_slice(frame);
        self.frames.push_back(buffer);
        trace!("queued {} byte frame ({} waiting)", frame.len(), self.frames.len());

        if self.frames.len() == 1 {
            self.prime_front();
        }
        Ok(())
    }

    /// Reads the header of the front frame and points the cursor past it.
    fn prime_front(&mut self) {
        self.cursor = HEADER_SIZE;
        if let Some(frame) = self.frames.front() {
            // add_frame checked the length, so the header is always present
            if let Ok(timestamp) = decode_timestamp(frame.as_slice()) {
                self.remote_timestamp = timestamp;
            }
        }
    }

    /// Returns a reader positioned at the next message, or `None` once
    /// every queued frame is exhausted.
    ///
    /// Whatever the caller reads through the returned guard is consumed
    /// when the guard drops. A guard dropped without reading anything yields
    /// the same message again.
    pub fn next_message(&mut self) -> Option<FrameMessage<'_>> {
        loop {
            let len = self.frames.front()?.len();
            if self.cursor < len {
                break;
            }
            self.frames.pop_front();
            debug!("frame exhausted, {} remaining", self.frames.len());
            self.prime_front();
        }

        let frame = self.frames.front()?;
        let mut reader = ByteReader::new(frame.as_slice());
        reader.set_position(self.cursor).ok()?;
        Some(FrameMessage {
            reader,
            committed: &mut self.cursor,
            remote_timestamp: self.remote_timestamp,
        })
    }

    /// Returns the timestamp header of the frame currently being read.
    #[must_use]
    pub const fn remote_timestamp(&self) -> f64 {
        self.remote_timestamp
    }

    /// Returns the number of queued frames, including a partially read one.
    #[must_use]
    pub fn queued_frames(&self) -> usize {
        self.frames.len()
    }

    /// Drops every queued frame.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.cursor = 0;
    }
}

/// A message being read out of a frame.
///
/// Dereferences to a [`ByteReader`] over the rest of the frame. The read
/// position is written back to the unbatcher on drop.
#[derive(Debug)]
pub struct FrameMessage<'a> {
    reader: ByteReader<'a>,
    committed: &'a mut usize,
    remote_timestamp: f64,
}

impl FrameMessage<'_> {
    /// Returns the send timestamp of the frame this message arrived in.
    #[must_use]
    pub const fn remote_timestamp(&self) -> f64 {
        self.remote_timestamp
    }
}

impl<'a> Deref for FrameMessage<'a> {
    type Target = ByteReader<'a>;

    fn deref(&self) -> &ByteReader<'a> {
        &self.reader
    }
}

impl<'a> DerefMut for FrameMessage<'a> {
    fn deref_mut(&mut self) -> &mut ByteReader<'a> {
        &mut self.reader
    }
}

impl Drop for FrameMessage<'_> {
    fn drop(&mut self) {
        *self.committed = self.reader.position();
    }
}
