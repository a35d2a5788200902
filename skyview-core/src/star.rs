//! Stars as stored in the index: a direction, a normalized brightness and a color.

use std::io::{Read, Write};

use crate::codec::{
    read_int, read_ratio, write_int, write_ratio, BinaryField, BRIGHTNESS_WIDTH,
    COLOR_CHANNEL_WIDTH,
};
use crate::{SkyError, SkyResult, Vector3};

/// Perceptual brightness in `[0, 1]`; brighter stars are closer to 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Brightness(f64);

impl Brightness {
    /// # Errors
    /// [`SkyError::EncodingRange`] if `value` is not in `[0, 1]`.
    pub fn new(value: f64) -> SkyResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(SkyError::encoding_range(value, BRIGHTNESS_WIDTH, "brightness"));
        }
        Ok(Self(value))
    }

    /// Clamps `value` into `[0, 1]`; NaN becomes 0.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl BinaryField for Brightness {
    const WIDTH: usize = BRIGHTNESS_WIDTH;

    fn encode<W: Write>(&self, w: &mut W) -> SkyResult<()> {
        write_ratio(w, self.0, BRIGHTNESS_WIDTH, false)
    }

    fn decode<R: Read>(r: &mut R) -> SkyResult<Self> {
        Ok(Self(read_ratio(r, BRIGHTNESS_WIDTH, false, "brightness")?))
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl BinaryField for Color {
    const WIDTH: usize = 3 * COLOR_CHANNEL_WIDTH;

    fn encode<W: Write>(&self, w: &mut W) -> SkyResult<()> {
        for channel in self.to_array() {
            write_int(w, channel as i64, COLOR_CHANNEL_WIDTH, false)?;
        }
        Ok(())
    }

    fn decode<R: Read>(r: &mut R) -> SkyResult<Self> {
        let red = read_int(r, COLOR_CHANNEL_WIDTH, false, "color.r")? as u8;
        let green = read_int(r, COLOR_CHANNEL_WIDTH, false, "color.g")? as u8;
        let blue = read_int(r, COLOR_CHANNEL_WIDTH, false, "color.b")? as u8;
        Ok(Self::new(red, green, blue))
    }
}

/// A catalog star.
///
/// `location` is a unit vector for stars built with [`Star::new`]. Stars
/// decoded from a catalog carry the quantized location as stored, which is
/// unit length to within a few parts in 10⁹.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Star {
    pub location: Vector3,
    pub brightness: Brightness,
    pub color: Color,
}

impl Star {
    /// Builds a star, normalizing `location` to unit length.
    ///
    /// # Errors
    /// [`SkyError::DegenerateVector`] if `location` is the zero vector.
    pub fn new(location: Vector3, brightness: Brightness, color: Color) -> SkyResult<Self> {
        Ok(Self {
            location: location.normalized()?,
            brightness,
            color,
        })
    }
}

impl BinaryField for Star {
    const WIDTH: usize = Vector3::WIDTH + Brightness::WIDTH + Color::WIDTH;

    fn encode<W: Write>(&self, w: &mut W) -> SkyResult<()> {
        self.location.encode(w)?;
        self.brightness.encode(w)?;
        self.color.encode(w)
    }

    fn decode<R: Read>(r: &mut R) -> SkyResult<Self> {
        let location = Vector3::decode(r)?;
        let brightness = Brightness::decode(r)?;
        let color = Color::decode(r)?;
        Ok(Self {
            location,
            brightness,
            color,
        })
    }
}
