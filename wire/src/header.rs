//! Frame header: the send timestamp that prefixes every frame.

use bitstream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, WireResult};

/// Header size in bytes: one little-endian `f64` send timestamp.
pub const HEADER_SIZE: usize = 8;

/// Writes the frame timestamp header.
pub fn encode_timestamp(writer: &mut ByteWriter, timestamp: f64) {
    writer.write_blittable(timestamp);
}

/// Reads the timestamp header from the start of a frame.
///
/// # Errors
///
/// Returns [`DecodeError::FrameTooSmall`] if the frame is shorter than
/// [`HEADER_SIZE`].
pub fn decode_timestamp(frame: &[u8]) -> WireResult<f64> {
    if frame.len() < HEADER_SIZE {
        return Err(DecodeError::FrameTooSmall {
            actual: frame.len(),
            required: HEADER_SIZE,
        });
    }
    let mut reader = ByteReader::new(frame);
    Ok(reader.read_blittable::<f64>()?)
}
