//! Camera pointing and motion on the celestial sphere.

use std::f64::consts::PI;

use skyview_core::photometry::direction_from_ra_dec;
use skyview_core::{SkyResult, Vector3};

/// Where the view looks and how wide it is.
///
/// `location` is the view center. `anchor` lies on the edge of the view: its
/// angle from `location` is the field radius, and its direction fixes the
/// in-plane orientation (the anchor is rendered at azimuth 0).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Camera {
    pub location: Vector3,
    pub anchor: Vector3,
}

impl Camera {
    /// # Errors
    /// [`SkyError::DegenerateVector`](skyview_core::SkyError::DegenerateVector)
    /// if either vector is zero.
    pub fn new(location: Vector3, anchor: Vector3) -> SkyResult<Self> {
        Ok(Self {
            location: location.normalized()?,
            anchor: anchor.normalized()?,
        })
    }

    /// Camera centred on equatorial coordinates with a `fov_deg` wide view.
    ///
    /// The anchor starts half the field of view down the meridian (up, if
    /// that would pass the south pole) and is turned a quarter about the
    /// view center, so north points the same way for every pointing.
    pub fn from_ra_dec(ra_hours: f64, dec_deg: f64, fov_deg: f64) -> SkyResult<Self> {
        let t = (90.0 - dec_deg) / 180.0 * PI;
        let p = ra_hours / 12.0 * PI;
        let half = fov_deg / 360.0 * PI;

        let location = direction_from_ra_dec(ra_hours, dec_deg);
        let (edge, turn) = if t + half < PI {
            (Vector3::from_colatitude_azimuth(t + half, p), PI * 0.5)
        } else {
            (Vector3::from_colatitude_azimuth(t - half, p), PI * 1.5)
        };
        let anchor = location + (edge - location).rotate_about(&location, turn);
        Self::new(location, anchor)
    }

    /// Angular radius of the view in radians; exactly 0 when the anchor
    /// coincides with the location.
    #[inline]
    pub fn field_of_view(&self) -> f64 {
        if self.location == self.anchor {
            return 0.0;
        }
        self.location.angular_distance(&self.anchor)
    }

    /// Turns the view by `angle` about its center and scales the field by
    /// roughly `scale` (zoom). The center does not move.
    pub fn spin(&mut self, angle: f64, scale: f64) -> SkyResult<()> {
        let offset = (self.anchor - self.location).rotate_about(&self.location, angle);
        self.anchor = (self.location + offset * scale).normalized()?;
        Ok(())
    }

    /// Moves center and anchor together by `speed` along the direction
    /// `angle` away from the anchor, keeping the view orientation.
    pub fn pan(&mut self, angle: f64, speed: f64) -> SkyResult<()> {
        let offset = (self.anchor - self.location).rotate_about(&self.location, angle);
        let heading = self.location + offset;

        let back = self.location - heading;
        let lift = back.dot(&heading);
        let location = self.location - back * speed;
        let anchor = heading + (-back + heading * (lift * 2.0)) * speed;

        self.location = location.normalized()?;
        let anchor = anchor.normalized()?;
        let offset = (anchor - self.location).rotate_about(&self.location, -angle);
        self.anchor = self.location + offset;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ra_dec_field() {
        for (ra, dec, fov) in [(0.0, 0.0, 60.0), (5.5, -70.0, 20.0), (13.0, 45.0, 1.0), (2.0, -89.0, 10.0)] {
            let camera = Camera::from_ra_dec(ra, dec, fov).unwrap();
            let half = fov / 360.0 * PI;
            assert!(
                (camera.field_of_view() - half).abs() < 1e-9,
                "ra {} dec {} fov {}",
                ra,
                dec,
                fov
            );
            assert!((camera.location.magnitude() - 1.0).abs() < 1e-12);
            assert!((camera.anchor.magnitude() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_fov_anchor_equals_location() {
        let camera = Camera::from_ra_dec(3.0, 10.0, 0.0).unwrap();
        assert_eq!(camera.field_of_view(), 0.0);

        let v = Vector3::new(0.3, 0.1, -0.2);
        assert_eq!(Camera::new(v, v).unwrap().field_of_view(), 0.0);
    }

    #[test]
    fn test_spin_keeps_center() {
        let mut camera = Camera::from_ra_dec(4.0, 20.0, 30.0).unwrap();
        let center = camera.location;
        let fov = camera.field_of_view();

        camera.spin(0.7, 1.0).unwrap();
        assert_eq!(camera.location, center);
        assert!((camera.field_of_view() - fov).abs() < 1e-9);

        camera.spin(0.0, 0.5).unwrap();
        assert!(camera.field_of_view() < fov);
    }

    #[test]
    fn test_pan_moves_center_keeps_field() {
        let mut camera = Camera::from_ra_dec(10.0, 0.0, 20.0).unwrap();
        let before = camera.location;
        let fov = camera.field_of_view();

        camera.pan(0.3, 0.05).unwrap();
        assert!(camera.location.angular_distance(&before) > 1e-4);
        assert!((camera.location.magnitude() - 1.0).abs() < 1e-12);
        assert!((camera.field_of_view() - fov).abs() < 1e-3);
    }
}
