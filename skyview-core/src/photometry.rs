//! Photometric mapping from catalog columns to index values.
//!
//! - [`brightness_from_magnitude`] turns an apparent magnitude into a
//!   perceptual brightness in `[0, 1]`, decreasing with magnitude.
//! - [`Color::from_bv`] looks up an RGB tint for a B−V color index;
//!   [`Color::from_bv_blackbody`] derives it from a black-body temperature.
//! - [`direction_from_ra_dec`] converts equatorial coordinates to a unit vector.

use std::f64::consts::PI;

use crate::{Brightness, Color, Vector3};

/// Bluest B−V index handled by the color mapping.
pub const BV_MIN: f64 = -0.4;
/// Reddest B−V index handled by the color mapping.
pub const BV_MAX: f64 = 2.0;

/// Tints for B−V from −0.4 to 2.0 in steps of 0.05.
const BV_TABLE: [(u8, u8, u8); 49] = [
    (188, 252, 255),
    (192, 252, 255),
    (196, 252, 255),
    (200, 253, 255),
    (204, 253, 255),
    (208, 253, 255),
    (212, 253, 255),
    (217, 253, 255),
    (221, 253, 255),
    (226, 253, 255),
    (230, 253, 255),
    (235, 253, 255),
    (239, 253, 255),
    (244, 252, 255),
    (248, 252, 255),
    (253, 252, 255),
    (255, 251, 255),
    (255, 251, 255),
    (255, 250, 255),
    (255, 250, 250),
    (255, 249, 241),
    (255, 248, 233),
    (255, 248, 224),
    (255, 247, 216),
    (255, 246, 209),
    (255, 245, 201),
    (255, 245, 194),
    (255, 244, 187),
    (255, 243, 180),
    (255, 242, 173),
    (255, 241, 167),
    (255, 240, 161),
    (255, 239, 155),
    (255, 238, 149),
    (255, 237, 143),
    (255, 236, 138),
    (255, 224, 94),
    (255, 223, 88),
    (255, 221, 83),
    (255, 219, 78),
    (255, 217, 73),
    (255, 215, 68),
    (255, 213, 64),
    (255, 210, 59),
    (255, 208, 55),
    (255, 206, 51),
    (255, 204, 46),
    (255, 201, 43),
    (255, 199, 39),
];

/// Maps an apparent magnitude to a normalized brightness.
///
/// `1 / 1.2^((1.44 + mag) · ln 2.5)`, clamped to `[0, 1]`. Magnitudes at or
/// below −1.44 saturate at full brightness.
pub fn brightness_from_magnitude(mag: f64) -> Brightness {
    Brightness::saturating(1.0 / libm::pow(1.2, (1.44 + mag) * libm::log(2.5)))
}

/// Unit vector for right ascension in hours and declination in degrees.
pub fn direction_from_ra_dec(ra_hours: f64, dec_deg: f64) -> Vector3 {
    let colatitude = (90.0 - dec_deg) / 180.0 * PI;
    let azimuth = ra_hours / 12.0 * PI;
    Vector3::from_colatitude_azimuth(colatitude, azimuth)
}

impl Color {
    /// Table tint for a B−V color index, clamped to `[-0.4, 2.0]`.
    pub fn from_bv(bv: f64) -> Self {
        let bv = if bv.is_nan() { 0.0 } else { bv.clamp(BV_MIN, BV_MAX) };
        let index = ((bv - BV_MIN) * 20.0).round_ties_even() as usize;
        let (r, g, b) = BV_TABLE[index.min(BV_TABLE.len() - 1)];
        Self::new(r, g, b)
    }

    /// Tint from the black-body temperature implied by a B−V index.
    ///
    /// Temperature follows Ballesteros (2012); the Planckian locus is the
    /// Kim et al. cubic spline in CIE xy, converted to linear sRGB.
    pub fn from_bv_blackbody(bv: f64) -> Self {
        let bv = if bv.is_nan() { 0.0 } else { bv.clamp(BV_MIN, BV_MAX) };
        let t = 4600.0 * (1.0 / (0.92 * bv + 1.7) + 1.0 / (0.92 * bv + 0.62));

        let x = if t <= 4000.0 {
            -0.2661239e9 / t.powi(3) + 0.2343580e6 / t.powi(2) + 0.8776956e3 / t + 0.179910
        } else {
            -3.0258469e9 / t.powi(3) + 2.1070379e6 / t.powi(2) + 0.2226347e3 / t + 0.240390
        };

        let y = if t <= 2222.0 {
            -1.1063814 * x.powi(3) - 1.34811020 * x.powi(2) + 2.18555832 * x - 0.20219683
        } else if t <= 4000.0 {
            -0.9549476 * x.powi(3) - 1.37418593 * x.powi(2) + 2.09137015 * x - 0.16748867
        } else {
            3.0817580 * x.powi(3) - 5.87338670 * x.powi(2) + 3.75112997 * x - 0.37001483
        };

        let (cx, cy, cz) = if y == 0.0 {
            (0.0, 0.0, 0.0)
        } else {
            (x / y, 1.0, (1.0 - x - y) / y)
        };

        let r = 3.2406 * cx - 1.5372 * cy - 0.4986 * cz;
        let g = -0.9689 * cx + 1.8758 * cy + 0.0415 * cz;
        let b = 0.0557 * cx - 0.2040 * cy + 1.0570 * cz;

        Self::new(channel(r), channel(g), channel(b))
    }
}

fn channel(v: f64) -> u8 {
    ((v * 255.0) as i64).clamp(0, 255) as u8
}
