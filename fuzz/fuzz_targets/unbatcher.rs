#![no_main]

use bitstream::Pool;
use libfuzzer_sys::fuzz_target;
use wire::{FrameUnbatcher, Limits};

fuzz_target!(|data: &[u8]| {
    let mut unbatcher = FrameUnbatcher::new(Limits::for_testing(), Pool::writers());

    // Split the input into frames of fuzzer-chosen length.
    let mut idx = 0usize;
    while idx < data.len() && idx < 4096 {
        let len = usize::from(data[idx] % 120).saturating_add(1);
        idx += 1;
        let end = (idx + len).min(data.len());
        let _ = unbatcher.add_frame(&data[idx..end]);
        idx = end;
    }

    let mut reads = 0usize;
    while let Some(mut message) = unbatcher.next_message() {
        if message.read_bytes_and_size().is_err() {
            // skip the rest of the frame
            let remaining = message.remaining();
            let _ = message.read_bytes(remaining);
        }
        reads += 1;
        if reads > 4096 {
            break;
        }
    }
});
