use bitstream::{
    var_u64_len, zigzag_decode, zigzag_encode, BitError, ByteReader, ByteWriter, VarI64, VarU64,
};
use glam::{Quat, Vec3};

#[test]
fn varint_boundary_lengths() {
    let cases: [(u64, usize); 14] = [
        (0, 1),
        (240, 1),
        (241, 2),
        (2287, 2),
        (2288, 3),
        (67823, 3),
        (67824, 4),
        ((1 << 24) - 1, 4),
        (1 << 24, 5),
        (u64::from(u32::MAX), 5),
        (1 << 32, 6),
        ((1 << 48) - 1, 7),
        (1 << 56, 9),
        (u64::MAX, 9),
    ];

    for (value, expected_len) in cases {
        let mut writer = ByteWriter::new();
        writer.write_var_u64(value);
        assert_eq!(writer.len(), expected_len, "encoded length of {value}");
        assert_eq!(var_u64_len(value), expected_len, "predicted length of {value}");

        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read_var_u64().unwrap(), value);
        assert!(reader.is_empty());
    }
}

#[test]
fn zigzag_boundaries_roundtrip() {
    let cases: [(i64, u64, usize); 5] = [
        (0, 0, 1),
        (-1, 1, 1),
        (1, 2, 1),
        (i64::MAX, u64::MAX - 1, 9),
        (i64::MIN, u64::MAX, 9),
    ];

    for (value, zigzag, expected_len) in cases {
        assert_eq!(zigzag_encode(value), zigzag, "zig-zag of {value}");
        assert_eq!(zigzag_decode(zigzag), value);

        let mut writer = ByteWriter::new();
        writer.write_var_i64(value);
        assert_eq!(writer.len(), expected_len, "encoded length of {value}");

        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read_var_i64().unwrap(), value);
        assert!(reader.is_empty());
    }
}

#[test]
fn every_prefix_byte_decodes() {
    // Pad with enough bytes for the longest form so no prefix runs out of data.
    for prefix in 0..=u8::MAX {
        let mut data = vec![prefix];
        data.extend_from_slice(&[0u8; 8]);
        let mut reader = ByteReader::new(&data);
        assert!(reader.read_var_u64().is_ok(), "prefix {prefix}");
    }
}

#[test]
fn truncated_raw_varint_is_end_of_data() {
    let mut writer = ByteWriter::new();
    writer.write_var_u64(u64::MAX);
    let bytes = writer.to_vec();

    let mut reader = ByteReader::new(&bytes[..5]);
    assert!(matches!(
        reader.read_var_u64(),
        Err(BitError::EndOfData {
            requested: 8,
            available: 4
        })
    ));
}

#[test]
fn mixed_fields_in_one_buffer() {
    let mut writer = ByteWriter::with_capacity(8);
    writer.write_blittable(7u8);
    writer.write(&VarU64(70_000)).unwrap();
    writer.write(&VarI64(-70_000)).unwrap();
    writer.write_string(Some("snapline")).unwrap();
    writer.write(&Vec3::new(1.0, 2.0, 3.0)).unwrap();
    writer.write_quaternion(Quat::from_rotation_y(0.25));
    writer.write_blittable(-0.5f64);

    let mut reader = ByteReader::new(writer.as_slice());
    assert_eq!(reader.read_blittable::<u8>().unwrap(), 7);
    assert_eq!(reader.read::<VarU64>().unwrap(), VarU64(70_000));
    assert_eq!(reader.read::<VarI64>().unwrap(), VarI64(-70_000));
    assert_eq!(reader.read_string().unwrap().as_deref(), Some("snapline"));
    assert_eq!(reader.read::<Vec3>().unwrap(), Vec3::new(1.0, 2.0, 3.0));
    let q = reader.read_quaternion().unwrap();
    assert!(q.angle_between(Quat::from_rotation_y(0.25)) < 0.01);
    assert_eq!(reader.read_blittable::<f64>().unwrap(), -0.5);
    assert!(reader.is_empty());
}

#[test]
fn reading_past_the_end_fails_without_moving() {
    let mut writer = ByteWriter::new();
    writer.write_blittable(1u16);
    let mut reader = ByteReader::new(writer.as_slice());
    assert!(reader.read_blittable::<u64>().is_err());
    assert_eq!(reader.position(), 0);
    assert_eq!(reader.read_blittable::<u16>().unwrap(), 1);
}
