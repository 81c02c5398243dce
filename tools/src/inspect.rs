//! Frame inspection.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use bitstream::Pool;
use serde::Serialize;
use wire::{FrameUnbatcher, Limits, HEADER_SIZE};

/// Payload bytes shown in the hex preview.
pub const PREVIEW_BYTES: usize = 32;

/// Summary of one received frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    /// Sender clock when the frame was opened.
    pub timestamp: f64,
    pub total_bytes: usize,
    pub payload_bytes: usize,
    /// Hex of the first payload bytes.
    pub preview: String,
    /// Lengths of the length-prefixed messages, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<usize>>,
}

/// Validates `frame` against `limits` and summarizes it.
///
/// With `sized`, the payload is split into `bytes_and_size` messages and
/// their lengths are reported; a truncated message is an error.
pub fn inspect_frame(frame: &[u8], limits: &Limits, sized: bool) -> Result<InspectReport> {
    let mut unbatcher = FrameUnbatcher::new(limits.clone(), Pool::writers());
    unbatcher.add_frame(frame).context("invalid frame")?;
    let timestamp = unbatcher.remote_timestamp();

    let payload = &frame[HEADER_SIZE..];
    let messages = if sized {
        let mut lengths = Vec::new();
        while let Some(mut message) = unbatcher.next_message() {
            let bytes = message
                .read_bytes_and_size()
                .with_context(|| format!("read message {}", lengths.len()))?;
            lengths.push(bytes.map_or(0, <[u8]>::len));
        }
        Some(lengths)
    } else {
        None
    };

    Ok(InspectReport {
        timestamp,
        total_bytes: frame.len(),
        payload_bytes: payload.len(),
        preview: hex::encode(&payload[..payload.len().min(PREVIEW_BYTES)]),
        messages,
    })
}

/// Renders a report for a terminal.
pub fn format_inspect_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "timestamp: {:.6}", report.timestamp);
    let _ = writeln!(
        out,
        "size: {} bytes ({} header + {} payload)",
        report.total_bytes, HEADER_SIZE, report.payload_bytes
    );
    let ellipsis = if report.payload_bytes > PREVIEW_BYTES {
        "..."
    } else {
        ""
    };
    let _ = write!(out, "payload: {}{ellipsis}", report.preview);
    if let Some(messages) = &report.messages {
        let _ = write!(out, "\nmessages: {}", messages.len());
        for (index, len) in messages.iter().enumerate() {
            let _ = write!(out, "\n  #{index}: {len} bytes");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::FrameBatcher;

    fn frame_of(messages: &[&[u8]], timestamp: f64) -> Vec<u8> {
        let mut batcher = FrameBatcher::new(Limits::default(), Pool::writers());
        for &message in messages {
            batcher
                .add_with(timestamp, |writer| writer.write_bytes_and_size(Some(message)))
                .unwrap();
        }
        batcher.take_frame().unwrap().as_slice().to_vec()
    }

    #[test]
    fn reports_header_and_preview() {
        let frame = frame_of(&[&[0xAB, 0xCD]], 2.5);
        let report = inspect_frame(&frame, &Limits::default(), false).unwrap();
        assert_eq!(report.timestamp, 2.5);
        assert_eq!(report.total_bytes, frame.len());
        assert_eq!(report.payload_bytes, frame.len() - HEADER_SIZE);
        assert!(report.preview.ends_with("abcd"));
        assert!(report.messages.is_none());
    }

    #[test]
    fn splits_sized_messages() {
        let frame = frame_of(&[&[1, 2, 3], &[], &[9; 40]], 0.0);
        let report = inspect_frame(&frame, &Limits::default(), true).unwrap();
        assert_eq!(report.messages, Some(vec![3, 0, 40]));
        assert_eq!(report.preview.len(), PREVIEW_BYTES * 2);
        assert!(format_inspect_pretty(&report).contains("#2: 40 bytes"));
    }

    #[test]
    fn rejects_short_frame() {
        let err = inspect_frame(&[0; 4], &Limits::default(), false).unwrap_err();
        assert!(format!("{err:#}").contains("invalid frame"));
    }

    #[test]
    fn rejects_oversized_frame() {
        let frame = vec![0; Limits::for_testing().max_frame_bytes + 1];
        assert!(inspect_frame(&frame, &Limits::for_testing(), false).is_err());
    }

    #[test]
    fn truncated_sized_message_fails() {
        let mut frame = frame_of(&[&[1, 2, 3]], 0.0);
        frame.pop();
        assert!(inspect_frame(&frame, &Limits::default(), true).is_err());
    }
}
