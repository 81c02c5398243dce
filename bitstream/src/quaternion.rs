//! Smallest-three quaternion compression into 32 bits.
//!
//! Layout of the packed word:
//!
//! ```text
//! bits 31..30  index of the dropped (largest magnitude) component
//! bits 29..20  first remaining component, 10 bits
//! bits 19..10  second remaining component, 10 bits
//! bits  9..0   third remaining component, 10 bits
//! ```
//!
//! The remaining components of a unit quaternion are bounded by ±1/√2 once
//! the largest one is dropped, so each is quantized from that range.

use glam::Quat;

use crate::error::BitResult;
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// Lower bound of a non-largest component of a unit quaternion.
pub const QUATERNION_MIN_RANGE: f32 = -0.707_107;
/// Upper bound of a non-largest component of a unit quaternion.
pub const QUATERNION_MAX_RANGE: f32 = 0.707_107;

const TEN_BITS_MAX: u32 = 0x3FF;

/// Worst-case rotation error, in radians, of a compressed quaternion.
pub const QUATERNION_MAX_ERROR: f32 = 0.01;

/// Returns the index (0..4, xyzw order) of the component with the largest
/// absolute value. Ties go to the lowest index.
#[must_use]
pub fn largest_absolute_component_index(q: Quat) -> usize {
    let components = q.to_array();
    let mut largest = 0;
    for (i, c) in components.iter().enumerate().skip(1) {
        if c.abs() > components[largest].abs() {
            largest = i;
        }
    }
    largest
}

/// Linearly maps `value` from `[min_value, max_value]` onto
/// `[min_target, max_target]`, rounding to the nearest integer and clamping.
#[must_use]
pub fn scale_float_to_uint(
    value: f32,
    min_value: f32,
    max_value: f32,
    min_target: u32,
    max_target: u32,
) -> u32 {
    let target_range = (max_target - min_target) as f32;
    let value_range = max_value - min_value;
    let relative = (value - min_value) / value_range;
    let scaled = (relative * target_range).round().clamp(0.0, target_range);
    min_target + scaled as u32
}

/// Inverse of [`scale_float_to_uint`].
#[must_use]
pub fn scale_uint_to_float(
    value: u32,
    min_value: f32,
    max_value: f32,
    min_target: u32,
    max_target: u32,
) -> f32 {
    let target_range = (max_target - min_target) as f32;
    let value_range = max_value - min_value;
    let relative = (value - min_target) as f32 / target_range;
    min_value + relative * value_range
}

fn quantize(component: f32) -> u32 {
    scale_float_to_uint(
        component,
        QUATERNION_MIN_RANGE,
        QUATERNION_MAX_RANGE,
        0,
        TEN_BITS_MAX,
    )
}

fn dequantize(bits: u32) -> f32 {
    scale_uint_to_float(
        bits & TEN_BITS_MAX,
        QUATERNION_MIN_RANGE,
        QUATERNION_MAX_RANGE,
        0,
        TEN_BITS_MAX,
    )
}

/// Compresses a unit quaternion into 32 bits.
///
/// `q` and `-q` describe the same rotation, so the sign is canonicalized by
/// making the dropped component positive.
#[must_use]
pub fn compress_quaternion(q: Quat) -> u32 {
    let largest = largest_absolute_component_index(q);
    let mut components = q.to_array();
    if components[largest] < 0.0 {
        for c in &mut components {
            *c = -*c;
        }
    }

    let remaining = components
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != largest)
        .map(|(_, c)| *c);
    let mut packed = (largest as u32) << 30;
    for (c, shift) in remaining.zip([20u32, 10, 0]) {
        packed |= quantize(c) << shift;
    }
    packed
}

/// Decompresses a quaternion produced by [`compress_quaternion`].
///
/// The dropped component is rebuilt from the unit-length constraint. A
/// non-positive radicand (possible after quantization) yields zero, and the
/// result is normalized.
#[must_use]
pub fn decompress_quaternion(packed: u32) -> Quat {
    let largest = (packed >> 30) as usize;
    let a = dequantize(packed >> 20);
    let b = dequantize(packed >> 10);
    let c = dequantize(packed);

    let radicand = 1.0 - a * a - b * b - c * c;
    let d = if radicand > 0.0 { radicand.sqrt() } else { 0.0 };

    let components = match largest {
        0 => [d, a, b, c],
        1 => [a, d, b, c],
        2 => [a, b, d, c],
        _ => [a, b, c, d],
    };
    let q = Quat::from_array(components);
    let length = q.length();
    if length > 0.0 {
        q / length
    } else {
        Quat::IDENTITY
    }
}

impl ByteWriter {
    /// Writes a quaternion as a compressed 32-bit word.
    pub fn write_quaternion(&mut self, q: Quat) {
        self.write_blittable(compress_quaternion(q));
    }
}

impl ByteReader<'_> {
    /// Reads a quaternion written by [`ByteWriter::write_quaternion`].
    pub fn read_quaternion(&mut self) -> BitResult<Quat> {
        self.read_blittable::<u32>().map(decompress_quaternion)
    }
}
