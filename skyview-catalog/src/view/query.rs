//! View-cone queries streamed straight from a serialized catalog.
//!
//! The query never materializes the tree. It walks the node records in file
//! order and, for every node whose bounding cone cannot reach the view,
//! seeks past the node's subtree using the stored `content_size`. Levels
//! deeper than [`ViewParams::max_level`] are skipped the same way, which is
//! what keeps wide views cheap: faint stars live deep in the mesh and are
//! only reached by narrow views.

use std::cmp::Ordering;
use std::f64::consts::PI;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use skyview_core::codec::{read_angle, read_int, BinaryField};
use skyview_core::{Color, SkyError, SkyResult, Star, Vector3};

use super::camera::Camera;
use super::file::CatalogFile;
use super::origin::Origin;
use crate::index::codec::read_header;

/// Query tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewParams {
    /// Deepest mesh level visited.
    pub max_level: u8,
    /// Steepness of the brightness-to-weight curve; higher is softer.
    pub sensitivity: f64,
    /// Stars at or below this weight are dropped.
    pub min_weight: f64,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            max_level: 10,
            sensitivity: 50.0,
            min_weight: 0.1,
        }
    }
}

impl ViewParams {
    pub fn validate(&self) -> SkyResult<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(SkyError::invalid_parameter(
                "sensitivity",
                &format!("must be positive and finite, got {}", self.sensitivity),
            ));
        }
        Ok(())
    }
}

/// A star as seen in the view, in polar view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ViewStar {
    /// Angle around the view center; the anchor sits at 0.
    pub azimuth: f64,
    /// Distance from the view center as a fraction of the field radius.
    pub radius: f64,
    /// Display weight in `[0, 1]`.
    pub weight: f64,
    pub color: Color,
}

/// Maps star brightness to display weight for a given field of view.
///
/// The midpoint of the curve (`target`) drops as the field narrows, so a
/// zoomed-in view shows fainter stars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightCurve {
    target: f64,
    filter_power: f64,
}

impl WeightCurve {
    pub fn new(frame_angle: f64, sensitivity: f64) -> Self {
        Self {
            target: libm::pow(frame_angle / PI, 0.2) * 0.75 - 0.5,
            filter_power: 100.0 / sensitivity,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn weight(&self, brightness: f64) -> f64 {
        let b = brightness - self.target;
        if b < 0.5 {
            if b < 0.0 {
                0.0
            } else {
                0.5 * libm::pow(b * 2.0, self.filter_power)
            }
        } else if b > 1.0 {
            1.0
        } else {
            1.0 - 0.5 * libm::pow(2.0 - b * 2.0, self.filter_power)
        }
    }
}

/// Result of a view query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct View {
    pub location: Vector3,
    pub anchor: Vector3,
    /// Angular radius of the view.
    pub frame_angle: f64,
    /// Added to every projected azimuth so the anchor lands at 0.
    pub rotation: f64,
    /// Visible stars, heaviest first.
    pub stars: Vec<ViewStar>,
}

impl View {
    /// Runs a query over a catalog stream positioned at its header.
    ///
    /// # Errors
    /// [`SkyError::InvalidParameter`] for a bad `params.sensitivity`;
    /// [`SkyError::CorruptCatalog`] if the stream is truncated, has a bad
    /// header, nests deeper than the header's `max_level`, or a stored size
    /// disagrees with the bytes actually present.
    pub fn from_reader<R: Read + Seek>(
        reader: &mut R,
        camera: &Camera,
        params: &ViewParams,
    ) -> SkyResult<Self> {
        params.validate()?;

        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let header = read_header(reader)?;

        let origin = Origin::new(&camera.location);
        let frame_angle = camera.field_of_view();
        let (_, anchor_azimuth) = origin.apply(&camera.anchor).to_colatitude_azimuth();
        let rotation = -anchor_azimuth;

        let mut walk = Walk {
            reader,
            end,
            catalog_level: header.max_level,
            location: camera.location,
            origin,
            frame_angle,
            rotation,
            curve: WeightCurve::new(frame_angle, params.sensitivity),
            params,
            stars: Vec::new(),
            visited: 0,
            pruned: 0,
            considered: 0,
        };
        walk.visit(0)?;

        let position = walk.reader.stream_position()?;
        if position != end {
            return Err(SkyError::corrupt_catalog(
                "child_count",
                &format!(
                    "root subtree ends at offset {} but the catalog has {} bytes",
                    position, end
                ),
            ));
        }

        let Walk {
            mut stars,
            visited,
            pruned,
            considered,
            ..
        } = walk;
        stars.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

        tracing::debug!(
            catalog_level = header.max_level,
            frame_angle,
            visited,
            pruned,
            considered,
            kept = stars.len(),
            "view query complete"
        );

        Ok(Self {
            location: camera.location,
            anchor: camera.anchor,
            frame_angle,
            rotation,
            stars,
        })
    }

    /// Opens the catalog at `path` and queries it.
    pub fn from_path<P: AsRef<Path>>(path: P, camera: &Camera, params: &ViewParams) -> SkyResult<Self> {
        CatalogFile::open(path)?.view(camera, params)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

struct Walk<'a, R> {
    reader: &'a mut R,
    end: u64,
    catalog_level: u8,
    location: Vector3,
    origin: Origin,
    frame_angle: f64,
    rotation: f64,
    curve: WeightCurve,
    params: &'a ViewParams,
    stars: Vec<ViewStar>,
    visited: usize,
    pruned: usize,
    considered: usize,
}

impl<R: Read + Seek> Walk<'_, R> {
    fn visit(&mut self, depth: u8) -> SkyResult<()> {
        let center = Vector3::decode(self.reader)?;
        let radius = read_angle(self.reader, "radius")?;
        let content_size = read_int(self.reader, 4, false, "content_size")? as u64;
        let content_start = self.reader.stream_position()?;

        let distance = self.location.angular_distance(&center);
        if depth <= self.params.max_level && distance <= self.frame_angle + radius {
            self.visited += 1;

            let star_count = read_int(self.reader, 4, false, "star_count")?;
            for _ in 0..star_count {
                let star = Star::decode(self.reader)?;
                self.consider(&star);
            }

            let child_count = read_int(self.reader, 1, false, "child_count")?;
            if child_count > 0 && depth >= self.catalog_level {
                return Err(SkyError::corrupt_catalog(
                    "child_count",
                    &format!(
                        "node at depth {} has children below max_level {}",
                        depth, self.catalog_level
                    ),
                ));
            }
            for _ in 0..child_count {
                self.visit(depth + 1)?;
            }

            let consumed = self.reader.stream_position()? - content_start;
            if consumed != content_size {
                return Err(SkyError::corrupt_catalog(
                    "content_size",
                    &format!(
                        "node at offset {} stores {} content bytes but holds {}",
                        content_start, content_size, consumed
                    ),
                ));
            }
        } else {
            self.pruned += 1;
            self.skip(content_size)?;
        }
        Ok(())
    }

    fn consider(&mut self, star: &Star) {
        self.considered += 1;
        let (t, p) = self.origin.apply(&star.location).to_colatitude_azimuth();
        if t < self.frame_angle {
            let weight = self.curve.weight(star.brightness.value());
            if weight > self.params.min_weight {
                self.stars.push(ViewStar {
                    azimuth: p + self.rotation,
                    radius: t / self.frame_angle,
                    weight,
                    color: star.color,
                });
            }
        }
    }

    fn skip(&mut self, bytes: u64) -> SkyResult<()> {
        let position = self.reader.stream_position()?;
        if position.saturating_add(bytes) > self.end {
            return Err(SkyError::corrupt_catalog(
                "content_size",
                &format!(
                    "subtree of {} bytes at offset {} runs past the end of the catalog ({} bytes)",
                    bytes, position, self.end
                ),
            ));
        }
        self.reader.seek(SeekFrom::Current(bytes as i64))?;
        Ok(())
    }
}
