//! Parsing of delimited star-catalog lines.
//!
//! A [`ColumnLayout`] says which column holds each field and how it is
//! written. Lines that cannot become a star are reported as
//! [`SkyError::MalformedRecord`] so the caller can count and skip them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use skyview_catalog::index::{bucket_for_magnitude, MagnitudeBand};
use skyview_core::photometry::{brightness_from_magnitude, direction_from_ra_dec};
use skyview_core::{Color, SkyError, SkyResult, Star};

/// How right ascension is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaFormat {
    /// Space separated hours, minutes, seconds: `06 45 08.9`
    Hms,
    /// Decimal degrees
    Deg,
}

/// How declination is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecFormat {
    /// Signed degrees, minutes, seconds: `-16 42 58`
    Dms,
    /// Decimal degrees
    Deg,
}

/// What the color column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    /// B−V color index
    Bv,
    /// B magnitude; the index is B minus the magnitude column
    B,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    #[serde(default = "default_separator")]
    pub separator: char,
    pub ra_column: usize,
    pub ra_format: RaFormat,
    pub dec_column: usize,
    pub dec_format: DecFormat,
    pub mag_column: usize,
    pub color_column: usize,
    pub color_format: ColorFormat,
}

fn default_separator() -> char {
    ';'
}

/// A parsed line: the level it belongs to and the star itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub level: u8,
    pub magnitude: f64,
    pub star: Star,
}

impl ColumnLayout {
    /// Parses one line. `line_no` is 1-based and only used for errors.
    pub fn parse(&self, line: &str, line_no: usize, bands: &[MagnitudeBand]) -> SkyResult<Record> {
        let fields: Vec<&str> = line.split(self.separator).map(str::trim).collect();

        let ra = required(&fields, self.ra_column, line_no, "right ascension")?;
        let dec = required(&fields, self.dec_column, line_no, "declination")?;
        let mag_text = required(&fields, self.mag_column, line_no, "magnitude")?;
        let magnitude = number(mag_text, line_no, "magnitude")?;

        let level = bucket_for_magnitude(bands, magnitude).ok_or_else(|| {
            SkyError::malformed_record(line_no, &format!("magnitude {} outside every band", magnitude))
        })?;

        // An empty color falls back to the magnitude text.
        let color_text = fields
            .get(self.color_column)
            .copied()
            .filter(|value| !value.is_empty())
            .unwrap_or(mag_text);
        let color_value = number(color_text, line_no, "color")?;
        let bv = match self.color_format {
            ColorFormat::Bv => color_value,
            ColorFormat::B => color_value - magnitude,
        };

        let ra_hours = match self.ra_format {
            RaFormat::Hms => sexagesimal(ra, line_no, "right ascension")?,
            RaFormat::Deg => number(ra, line_no, "right ascension")? / 15.0,
        };
        let dec_deg = match self.dec_format {
            DecFormat::Dms => sexagesimal(dec, line_no, "declination")?,
            DecFormat::Deg => number(dec, line_no, "declination")?,
        };

        let star = Star::new(
            direction_from_ra_dec(ra_hours, dec_deg),
            brightness_from_magnitude(magnitude),
            Color::from_bv(bv),
        )?;
        Ok(Record {
            level,
            magnitude,
            star,
        })
    }
}

fn required<'a>(fields: &[&'a str], index: usize, line_no: usize, name: &str) -> SkyResult<&'a str> {
    match fields.get(index) {
        Some(value) if !value.is_empty() => Ok(*value),
        _ => Err(SkyError::malformed_record(line_no, &format!("missing {}", name))),
    }
}

fn number(text: &str, line_no: usize, name: &str) -> SkyResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SkyError::malformed_record(line_no, &format!("bad {} '{}'", name, text)))
}

/// `"d m s"` with an optional sign on the first part.
fn sexagesimal(text: &str, line_no: usize, name: &str) -> SkyResult<f64> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(SkyError::malformed_record(
            line_no,
            &format!("{} '{}' is not three space-separated parts", name, text),
        ));
    }

    let (negative, first) = match parts[0].strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, parts[0].strip_prefix('+').unwrap_or(parts[0])),
    };
    let whole = number(first, line_no, name)?;
    let minutes = number(parts[1], line_no, name)?;
    let seconds = number(parts[2], line_no, name)?;

    let value = whole + minutes / 60.0 + seconds / 3600.0;
    Ok(if negative { -value } else { value })
}
