#![no_main]

use bitstream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick the next read; the reader consumes the same bytes.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        let ok = match op {
            0 => reader.read_bool().is_ok(),
            1 => reader.read_blittable::<u32>().is_ok(),
            2 => reader.read_var_u64().is_ok(),
            3 => reader.read_var_i64().is_ok(),
            4 => reader.read_string().is_ok(),
            5 => reader.read_bytes_and_size().is_ok(),
            6 => reader.read_quaternion().is_ok(),
            _ => reader.set_position(usize::from(data[idx - 1])).is_ok(),
        };
        if !ok {
            assert!(reader.position() <= data.len());
        }
    }
});
