//! Timestamped frame batching for the snapline replication stack.
//!
//! Outgoing messages are packed into frames sized for the transport, each
//! prefixed with the sender's timestamp. Received frames are queued and
//! split back into messages in order. This crate does not know what a
//! message contains, only where frames begin and end.
//!
//! # Design Principles
//!
//! - **Stable wire format** - A frame is `[f64 LE timestamp][message]*`;
//!   see `WIRE_FORMAT.md`.
//! - **Bounded decoding** - Frame size and queue depth are checked against
//!   [`Limits`] before anything is buffered.
//! - **Pooled buffers** - Frames live in writers drawn from a caller-owned
//!   [`Pool`](bitstream::Pool) and return to it when dropped.
//!
//! # Example
//!
//! ```
//! use bitstream::Pool;
//! use wire::{FrameBatcher, FrameUnbatcher, Limits};
//!
//! let pool = Pool::writers();
//! let mut batcher = FrameBatcher::new(Limits::default(), pool.clone());
//! batcher.add_message(&[1, 2], 0.5).unwrap();
//!
//! let frame = batcher.take_frame().unwrap();
//! let mut unbatcher = FrameUnbatcher::new(Limits::default(), pool);
//! unbatcher.add_frame(frame.as_slice()).unwrap();
//!
//! let mut message = unbatcher.next_message().unwrap();
//! assert_eq!(message.remote_timestamp(), 0.5);
//! assert_eq!(message.read_bytes(2).unwrap(), &[1, 2]);
//! ```

mod batcher;
mod error;
mod header;
mod limits;
mod unbatcher;

pub use batcher::FrameBatcher;
pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use header::{decode_timestamp, encode_timestamp, HEADER_SIZE};
pub use limits::Limits;
pub use unbatcher::{FrameMessage, FrameUnbatcher};
