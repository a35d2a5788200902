//! Fixed-point, big-endian binary fields.
//!
//! Catalog files store every scalar in a fixed number of bytes. Integers are
//! written as-is; bounded floats use *ratio* mode, which spreads the float
//! range over the full integer range of the field:
//!
//! | Mode | Float range | Integer stored |
//! |------|-------------|----------------|
//! | unsigned ratio | `[0, 1]` | `round(v · (2^(8L) − 1))` |
//! | signed ratio | `[−1, 1]` | `round(v · (2^(8L−1) − 1))` |
//!
//! Decoding divides by the same constant, so a round trip is exact to within
//! one quantum ([`ratio_quantum`]).
//!
//! The widths used by the catalog format are collected in the `*_WIDTH`
//! constants. Composite values implement [`BinaryField`].

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::f64::consts::PI;
use std::io::{Read, Write};

use crate::{SkyError, SkyResult, Vector3};

/// Bytes per vector component (signed ratio).
pub const VECTOR_COMPONENT_WIDTH: usize = 4;
/// Bytes per angle (unsigned ratio of `angle / π`).
pub const ANGLE_WIDTH: usize = 3;
/// Bytes per brightness (unsigned ratio).
pub const BRIGHTNESS_WIDTH: usize = 1;
/// Bytes per color channel (raw unsigned).
pub const COLOR_CHANNEL_WIDTH: usize = 1;

/// A value with a fixed-width binary representation.
pub trait BinaryField: Sized {
    /// Encoded size in bytes.
    const WIDTH: usize;

    fn encode<W: Write>(&self, w: &mut W) -> SkyResult<()>;

    fn decode<R: Read>(r: &mut R) -> SkyResult<Self>;
}

/// The integer a ratio-mode field maps its float bound onto.
pub fn ratio_scale(length: usize, signed: bool) -> f64 {
    let bits = 8 * length as i32;
    if signed {
        2f64.powi(bits - 1) - 1.0
    } else {
        2f64.powi(bits) - 1.0
    }
}

/// Largest round-trip error of a ratio-mode field.
pub fn ratio_quantum(length: usize, signed: bool) -> f64 {
    1.0 / ratio_scale(length, signed)
}

fn check_width(length: usize) -> SkyResult<()> {
    if length == 0 || length > 8 {
        return Err(SkyError::encoding_range(length as f64, length, "field width"));
    }
    Ok(())
}

fn int_bounds(length: usize, signed: bool) -> (i128, i128) {
    let bits = 8 * length as u32;
    if signed {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    } else {
        (0, (1i128 << bits) - 1)
    }
}

/// Writes `value` as a `length`-byte big-endian integer.
///
/// # Errors
/// [`SkyError::EncodingRange`] if the value does not fit the field.
pub fn write_int<W: Write>(w: &mut W, value: i64, length: usize, signed: bool) -> SkyResult<()> {
    check_width(length)?;
    let (min, max) = int_bounds(length, signed);
    let wide = value as i128;
    if wide < min || wide > max {
        let mode = if signed { "signed integer" } else { "unsigned integer" };
        return Err(SkyError::encoding_range(value as f64, length, mode));
    }
    if signed {
        w.write_int::<BigEndian>(value, length)?;
    } else {
        w.write_uint::<BigEndian>(value as u64, length)?;
    }
    Ok(())
}

/// Reads a `length`-byte big-endian integer.
///
/// # Errors
/// [`SkyError::CorruptCatalog`] naming `field` if the stream ends early.
pub fn read_int<R: Read>(r: &mut R, length: usize, signed: bool, field: &str) -> SkyResult<i64> {
    check_width(length)?;
    if signed {
        r.read_int::<BigEndian>(length)
            .map_err(|e| SkyError::from_read(e, field))
    } else {
        r.read_uint::<BigEndian>(length)
            .map(|v| v as i64)
            .map_err(|e| SkyError::from_read(e, field))
    }
}

/// Writes a bounded float in ratio mode.
///
/// # Errors
/// [`SkyError::EncodingRange`] if the value is not finite or lies outside
/// `[0, 1]` (unsigned) / `[−1, 1]` (signed).
pub fn write_ratio<W: Write>(w: &mut W, value: f64, length: usize, signed: bool) -> SkyResult<()> {
    check_width(length)?;
    let mode = if signed { "signed ratio" } else { "unsigned ratio" };
    if !value.is_finite() {
        return Err(SkyError::encoding_range(value, length, mode));
    }
    let scaled = (value * ratio_scale(length, signed)).round_ties_even();
    let (min, max) = int_bounds(length, signed);
    if scaled < min as f64 || scaled > max as f64 {
        return Err(SkyError::encoding_range(value, length, mode));
    }
    write_int(w, scaled as i64, length, signed)
}

/// Reads a ratio-mode float.
pub fn read_ratio<R: Read>(r: &mut R, length: usize, signed: bool, field: &str) -> SkyResult<f64> {
    let raw = read_int(r, length, signed, field)?;
    Ok(raw as f64 / ratio_scale(length, signed))
}

/// Writes an angle in `[0, π]` as a 3-byte unsigned ratio of `angle / π`.
pub fn write_angle<W: Write>(w: &mut W, angle: f64) -> SkyResult<()> {
    write_ratio(w, angle / PI, ANGLE_WIDTH, false)
}

/// Reads an angle written by [`write_angle`].
pub fn read_angle<R: Read>(r: &mut R, field: &str) -> SkyResult<f64> {
    Ok(read_ratio(r, ANGLE_WIDTH, false, field)? * PI)
}

impl BinaryField for Vector3 {
    const WIDTH: usize = 3 * VECTOR_COMPONENT_WIDTH;

    fn encode<W: Write>(&self, w: &mut W) -> SkyResult<()> {
        for component in self.to_array() {
            write_ratio(w, component, VECTOR_COMPONENT_WIDTH, true)?;
        }
        Ok(())
    }

    fn decode<R: Read>(r: &mut R) -> SkyResult<Self> {
        let x = read_ratio(r, VECTOR_COMPONENT_WIDTH, true, "vector.x")?;
        let y = read_ratio(r, VECTOR_COMPONENT_WIDTH, true, "vector.y")?;
        let z = read_ratio(r, VECTOR_COMPONENT_WIDTH, true, "vector.z")?;
        Ok(Vector3::new(x, y, z))
    }
}
