//! Star insertion and magnitude-to-level bucketing.
//!
//! The depth a star is stored at is chosen by the caller, usually from its
//! magnitude: bright stars go near the root so every query sees them, faint
//! ones deep in the mesh so only narrow views reach them.

use skyview_core::{SkyError, SkyResult, Star, Vector3};

use super::mesh::{Catalog, Div};

/// Faintest magnitude accepted by the deepest default band.
pub const FAINT_LIMIT: f64 = 36.0;

/// Lower magnitude bounds of the default bands, one per level.
const BAND_THRESHOLDS: [f64; 11] = [-2.0, 2.0, 5.0, 7.0, 9.0, 10.5, 12.0, 13.5, 15.0, 16.5, 18.0];

/// Maps a half-open magnitude interval `[min_mag, max_mag)` to a mesh level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct MagnitudeBand {
    pub level: u8,
    pub min_mag: f64,
    pub max_mag: f64,
}

impl MagnitudeBand {
    pub fn new(level: u8, min_mag: f64, max_mag: f64) -> Self {
        Self {
            level,
            min_mag,
            max_mag,
        }
    }

    #[inline]
    pub fn contains(&self, mag: f64) -> bool {
        mag >= self.min_mag && mag < self.max_mag
    }
}

/// Level of the first band containing `mag`, if any.
pub fn bucket_for_magnitude(bands: &[MagnitudeBand], mag: f64) -> Option<u8> {
    bands.iter().find(|band| band.contains(mag)).map(|band| band.level)
}

/// One band per level `0..=depth`; the deepest band runs to [`FAINT_LIMIT`].
///
/// Level 0 holds magnitudes −2 to 2, level 1 2 to 5, then 5–7, 7–9, 9–10.5,
/// 10.5–12 and steps of 1.5 beyond.
pub fn default_bands(depth: u8) -> Vec<MagnitudeBand> {
    let depth = (depth as usize).min(BAND_THRESHOLDS.len() - 1);
    (0..=depth)
        .map(|level| {
            let max_mag = if level == depth {
                FAINT_LIMIT
            } else {
                BAND_THRESHOLDS[level + 1]
            };
            MagnitudeBand::new(level as u8, BAND_THRESHOLDS[level], max_mag)
        })
        .collect()
}

impl Catalog {
    /// Stores `star` at depth `bucket_level`.
    ///
    /// Level 0 is the root. Deeper levels descend from the root's children,
    /// at each step following the child whose center is nearest to the star
    /// in Euclidean distance (the first one on ties). Every node on the path
    /// widens its radius to cover the star.
    ///
    /// # Errors
    /// [`SkyError::BucketTooDeep`] if `bucket_level > self.max_level`.
    pub fn insert(&mut self, bucket_level: u8, star: Star) -> SkyResult<()> {
        if bucket_level > self.max_level {
            return Err(SkyError::BucketTooDeep {
                bucket_level,
                max_level: self.max_level,
            });
        }
        if bucket_level == 0 {
            self.root.stars.push(star);
            return Ok(());
        }
        descend(&mut self.root.children, 1, bucket_level, star)
    }

    /// Inserts every star with a band match; returns how many were placed.
    pub fn insert_by_magnitude<I>(&mut self, bands: &[MagnitudeBand], stars: I) -> SkyResult<usize>
    where
        I: IntoIterator<Item = (f64, Star)>,
    {
        let mut placed = 0;
        for (mag, star) in stars {
            if let Some(level) = bucket_for_magnitude(bands, mag) {
                self.insert(level, star)?;
                placed += 1;
            }
        }
        Ok(placed)
    }
}

/// A decoded catalog may have shallower branches than `max_level`; running
/// out of children there reports the depth actually reached.
fn descend(siblings: &mut [Div], depth: u8, bucket_level: u8, star: Star) -> SkyResult<()> {
    let index = nearest(siblings, &star.location).ok_or(SkyError::BucketTooDeep {
        bucket_level,
        max_level: depth - 1,
    })?;
    let node = &mut siblings[index];
    node.cover(&star.location);
    if depth == bucket_level {
        node.stars.push(star);
        Ok(())
    } else {
        descend(&mut node.children, depth + 1, bucket_level, star)
    }
}

fn nearest(siblings: &[Div], location: &Vector3) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, div) in siblings.iter().enumerate() {
        let d = div.center.distance_squared(location);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyview_core::{Brightness, Color};

    fn star_at(x: f64, y: f64, z: f64) -> Star {
        Star::new(Vector3::new(x, y, z), Brightness::new(0.5).unwrap(), Color::WHITE).unwrap()
    }

    #[test]
    fn test_level_zero_goes_to_root() {
        let mut catalog = Catalog::create(2).unwrap();
        catalog.insert(0, star_at(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(catalog.root.stars.len(), 1);
        assert_eq!(catalog.stars_per_level(), vec![1, 0, 0]);
    }

    #[test]
    fn test_insert_follows_nearest_center() {
        let mut catalog = Catalog::create(3).unwrap();
        let star = star_at(0.2, -0.7, 0.4);
        catalog.insert(3, star).unwrap();

        // Walk the nearest-center path independently.
        let mut level = &catalog.root.children;
        for depth in 1..=3 {
            let best = level
                .iter()
                .min_by(|a, b| {
                    a.center
                        .distance_squared(&star.location)
                        .total_cmp(&b.center.distance_squared(&star.location))
                })
                .unwrap();
            if depth == 3 {
                assert_eq!(best.stars, vec![star]);
            } else {
                assert!(best.stars.is_empty());
            }
            level = &best.children;
        }
        assert_eq!(catalog.star_count(), 1);
        assert_eq!(catalog.stars_per_level(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_path_covers_star() {
        let mut catalog = Catalog::create(4).unwrap();
        let stars = [
            star_at(0.0, 0.0, 1.0),
            star_at(0.0, 0.0, -1.0),
            star_at(1.0, 1.0, 0.001),
            star_at(-0.3, 0.9, -0.2),
        ];
        for star in stars {
            catalog.insert(4, star).unwrap();
        }
        catalog.visit(|_, div| {
            for star in &div.stars {
                assert!(div.center.angular_distance(&star.location) <= div.radius);
            }
        });
    }

    #[test]
    fn test_bucket_too_deep() {
        let mut catalog = Catalog::create(2).unwrap();
        let err = catalog.insert(3, star_at(1.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            SkyError::BucketTooDeep {
                bucket_level: 3,
                max_level: 2
            }
        ));
        assert_eq!(catalog.star_count(), 0);
    }

    #[test]
    fn test_default_bands() {
        let bands = default_bands(5);
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0], MagnitudeBand::new(0, -2.0, 2.0));
        assert_eq!(bands[4], MagnitudeBand::new(4, 9.0, 10.5));
        assert_eq!(bands[5].max_mag, FAINT_LIMIT);

        assert_eq!(bucket_for_magnitude(&bands, -1.46), Some(0));
        assert_eq!(bucket_for_magnitude(&bands, 2.0), Some(1));
        assert_eq!(bucket_for_magnitude(&bands, 6.99), Some(2));
        assert_eq!(bucket_for_magnitude(&bands, 14.0), Some(5));
        assert_eq!(bucket_for_magnitude(&bands, -3.0), None);
        assert_eq!(bucket_for_magnitude(&bands, 40.0), None);
    }

    #[test]
    fn test_first_matching_band_wins() {
        let bands = [MagnitudeBand::new(2, 0.0, 10.0), MagnitudeBand::new(1, 5.0, 6.0)];
        assert_eq!(bucket_for_magnitude(&bands, 5.5), Some(2));
    }

    #[test]
    fn test_insert_by_magnitude_skips_unbanded() {
        let mut catalog = Catalog::create(1).unwrap();
        let bands = default_bands(1);
        let placed = catalog
            .insert_by_magnitude(
                &bands,
                [
                    (0.0, star_at(1.0, 0.0, 0.0)),
                    (8.0, star_at(0.0, 1.0, 0.0)),
                    (-9.0, star_at(0.0, 0.0, 1.0)),
                ],
            )
            .unwrap();
        assert_eq!(placed, 2);
        assert_eq!(catalog.stars_per_level(), vec![1, 1]);
    }
}
