//! 3D Cartesian vectors on (and near) the unit sphere.
//!
//! Every position in a skyview catalog is a direction: star locations, mesh
//! node centers, mesh corners, the camera location and its anchor. All of them
//! are stored as [`Vector3`] values that are expected to have unit length.
//!
//! # Unit-length invariant
//!
//! Functions that take directions assume unit length and do not re-normalize.
//! Normalization happens once, where a direction is created:
//! [`Star::new`](crate::Star::new), mesh construction and camera construction.
//! [`normalize`](Vector3::normalize) mutates in place and fails with
//! [`SkyError::DegenerateVector`] for the zero vector:
//!
//! ```
//! use skyview_core::Vector3;
//!
//! let mut v = Vector3::new(3.0, 4.0, 0.0);
//! v.normalize().unwrap();
//! assert!((v.magnitude() - 1.0).abs() < 1e-15);
//!
//! let mut zero = Vector3::zeros();
//! assert!(zero.normalize().is_err());
//! ```
//!
//! # Angular distance
//!
//! For unit vectors `acos(a·b)` is the great-circle separation. Decoded
//! catalog vectors are quantized and can drift a few parts in 10⁹ from unit
//! length, so the dot product is clamped before `acos`.
use crate::{SkyError, SkyResult};
use std::fmt;

/// A 3D Cartesian vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Creates a new vector from x, y, z components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the zero vector `[0, 0, 0]`.
    #[inline]
    pub fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Returns the unit vector along the Z axis, the catalog's pole.
    #[inline]
    pub fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Creates a unit vector from a colatitude (angle from +Z) and an azimuth
    /// (angle from +X toward +Y), both in radians.
    pub fn from_colatitude_azimuth(colatitude: f64, azimuth: f64) -> Self {
        let (sin_t, cos_t) = libm::sincos(colatitude);
        let (sin_p, cos_p) = libm::sincos(azimuth);
        Self::new(sin_t * cos_p, sin_t * sin_p, cos_t)
    }

    /// Returns the Euclidean length.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.magnitude_squared())
    }

    #[inline]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Scales the vector in place to unit length.
    ///
    /// # Errors
    /// [`SkyError::DegenerateVector`] if the vector has zero length.
    pub fn normalize(&mut self) -> SkyResult<()> {
        self.normalize_to(1.0)
    }

    /// Scales the vector in place to `length`.
    ///
    /// # Errors
    /// [`SkyError::DegenerateVector`] if the vector has zero length.
    pub fn normalize_to(&mut self, length: f64) -> SkyResult<()> {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Err(SkyError::degenerate_vector("Vector3::normalize"));
        }
        let scale = length / mag;
        self.x *= scale;
        self.y *= scale;
        self.z *= scale;
        Ok(())
    }

    /// Returns a unit-length copy.
    pub fn normalized(&self) -> SkyResult<Self> {
        let mut v = *self;
        v.normalize()?;
        Ok(v)
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared Euclidean (chord) distance.
    ///
    /// Monotonic in angular distance for unit vectors, so it ranks
    /// candidates without a trig call.
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (*self - *other).magnitude_squared()
    }

    /// Great-circle separation in radians between two unit vectors.
    ///
    /// Inputs are not re-normalized.
    #[inline]
    pub fn angular_distance(&self, other: &Self) -> f64 {
        libm::acos(self.dot(other).clamp(-1.0, 1.0))
    }

    /// Arithmetic midpoint (not normalized).
    #[inline]
    pub fn midpoint(&self, other: &Self) -> Self {
        (*self + *other) * 0.5
    }

    /// Rotates the vector about `axis` (unit length) by `angle` radians.
    ///
    /// Uses the Rodrigues form `v cos θ + (v × k) sin θ + k (k·v)(1 − cos θ)`,
    /// which turns clockwise when looking down `axis` toward the origin.
    pub fn rotate_about(&self, axis: &Self, angle: f64) -> Self {
        let (sin_a, cos_a) = libm::sincos(angle);
        *self * cos_a + self.cross(axis) * sin_a + *axis * (axis.dot(self) * (1.0 - cos_a))
    }

    /// Returns `(colatitude, azimuth)` in radians.
    ///
    /// Colatitude is measured from +Z, azimuth from +X toward +Y in `(-π, π]`.
    /// The vector does not need to be normalized. The zero vector maps to `(0, 0)`.
    pub fn to_colatitude_azimuth(&self) -> (f64, f64) {
        let mag = self.magnitude();
        if mag == 0.0 {
            return (0.0, 0.0);
        }
        let colatitude = libm::acos((self.z / mag).clamp(-1.0, 1.0));
        (colatitude, libm::atan2(self.y, self.x))
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector3({:.9}, {:.9}, {:.9})", self.x, self.y, self.z)
    }
}
