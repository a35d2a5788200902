use skyview_core::Vector3;

/// Rotation taking the camera direction to the +Z pole.
///
/// Rows are the local x, y and z axes expressed in catalog coordinates, so
/// applying the frame is three dot products. Projected stars near the view
/// center end up with small colatitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    x: Vector3,
    y: Vector3,
    z: Vector3,
}

impl Origin {
    /// Frame centred on `location`, assumed unit length.
    ///
    /// At the poles the azimuth of `location` is undefined and taken as 0.
    pub fn new(location: &Vector3) -> Self {
        let (t, p) = location.to_colatitude_azimuth();
        let (sin_t, cos_t) = libm::sincos(t);
        let (sin_p, cos_p) = libm::sincos(p);
        Self {
            x: Vector3::new(cos_t * cos_p, cos_t * sin_p, -sin_t),
            y: Vector3::new(-sin_p, cos_p, 0.0),
            z: Vector3::new(sin_t * cos_p, sin_t * sin_p, cos_t),
        }
    }

    #[inline]
    pub fn apply(&self, v: &Vector3) -> Vector3 {
        Vector3::new(self.x.dot(v), self.y.dot(v), self.z.dot(v))
    }
}
