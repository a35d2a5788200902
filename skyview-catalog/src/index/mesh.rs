//! Icosahedral subdivision of the sphere.
//!
//! The twenty faces of a regular icosahedron are quadrisected recursively:
//! each triangle `(a, b, c)` splits at its normalized edge midpoints into
//! three corner triangles and one inverted center triangle. Cells stay close
//! to equal area at every depth, so the bounding cones used for pruning are
//! tight everywhere on the sky, including the poles.
//!
//! Every node stores a bounding cone: the normalized centroid of its corners
//! and the largest angle from that centroid to a corner.

use std::f64::consts::{PI, TAU};

use skyview_core::{SkyError, SkyResult, Star, Vector3};

/// Deepest mesh [`Catalog::create`] will build. Level 10 has about 7 million nodes.
pub const MAX_LEVEL: u8 = 10;

/// Number of icosahedron faces under the root.
pub const FACE_COUNT: usize = 20;

/// A mesh node: bounding cone, stars bucketed here, and child cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Div {
    /// Unit direction of the cone axis.
    pub center: Vector3,
    /// Cone half-angle in radians; covers the node's cell and every star below it.
    pub radius: f64,
    pub stars: Vec<Star>,
    pub children: Vec<Div>,
}

impl Div {
    /// Empty node with the given cone.
    pub fn new(center: Vector3, radius: f64) -> Self {
        Self {
            center,
            radius,
            stars: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_corners(corners: [Vector3; 3], children: Vec<Div>) -> SkyResult<Self> {
        let [a, b, c] = corners;
        let center = ((a + b + c) / 3.0).normalized()?;
        let radius = corners
            .iter()
            .map(|corner| center.angular_distance(corner))
            .fold(0.0, f64::max);
        Ok(Self {
            center,
            radius,
            stars: Vec::new(),
            children,
        })
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Widens the cone so it contains `location`.
    pub(crate) fn cover(&mut self, location: &Vector3) {
        let distance = self.center.angular_distance(location);
        if distance > self.radius {
            self.radius = distance;
        }
    }

    fn visit_from<F: FnMut(usize, &Div)>(&self, depth: usize, f: &mut F) {
        f(depth, self);
        for child in &self.children {
            child.visit_from(depth + 1, f);
        }
    }
}

/// An in-memory star index: mesh depth plus the root node.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub max_level: u8,
    pub root: Div,
}

impl Catalog {
    /// Builds an empty mesh `max_level` levels deep.
    ///
    /// Level 0 is the root alone. Level 1 adds the twenty icosahedron faces;
    /// each further level quadrisects every leaf.
    ///
    /// # Errors
    /// [`SkyError::EncodingRange`] if `max_level` exceeds [`MAX_LEVEL`].
    pub fn create(max_level: u8) -> SkyResult<Self> {
        if max_level > MAX_LEVEL {
            return Err(SkyError::encoding_range(max_level as f64, 1, "max_level"));
        }

        let mut root = Div::new(Vector3::z_axis(), PI);
        if max_level > 0 {
            root.children = icosahedron_faces()
                .into_iter()
                .map(|[a, b, c]| subdivide(1, max_level, a, b, c))
                .collect::<SkyResult<Vec<_>>>()?;
        }

        tracing::debug!(
            max_level,
            nodes = expected_node_count(max_level),
            "created empty mesh"
        );
        Ok(Self { max_level, root })
    }

    /// Calls `f(depth, node)` for every node in pre-order; the root is depth 0.
    pub fn visit<F: FnMut(usize, &Div)>(&self, mut f: F) {
        self.root.visit_from(0, &mut f);
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(|_, _| count += 1);
        count
    }

    pub fn star_count(&self) -> usize {
        let mut count = 0;
        self.visit(|_, div| count += div.stars.len());
        count
    }

    /// Star totals indexed by node depth (`max_level + 1` entries).
    pub fn stars_per_level(&self) -> Vec<usize> {
        let mut counts = vec![0; self.max_level as usize + 1];
        self.visit(|depth, div| {
            if depth >= counts.len() {
                counts.resize(depth + 1, 0);
            }
            counts[depth] += div.stars.len();
        });
        counts
    }
}

/// Node count of a freshly created mesh, root included.
pub fn expected_node_count(max_level: u8) -> usize {
    if max_level == 0 {
        return 1;
    }
    1 + FACE_COUNT * (4usize.pow(max_level as u32) - 1) / 3
}

fn subdivide(level: u8, max_level: u8, a: Vector3, b: Vector3, c: Vector3) -> SkyResult<Div> {
    let children = if level < max_level {
        let ab = a.midpoint(&b).normalized()?;
        let bc = b.midpoint(&c).normalized()?;
        let ca = c.midpoint(&a).normalized()?;
        vec![
            subdivide(level + 1, max_level, a, ab, ca)?,
            subdivide(level + 1, max_level, ab, b, bc)?,
            subdivide(level + 1, max_level, ca, bc, c)?,
            subdivide(level + 1, max_level, ab, ca, bc)?,
        ]
    } else {
        Vec::new()
    };
    Div::from_corners([a, b, c], children)
}

/// The twelve icosahedron vertices as four latitude rings of 1, 5, 5 and 1.
fn icosahedron_rings() -> [Vec<Vector3>; 4] {
    let belt = libm::atan(0.5);
    let ring = |colatitude: f64, count: usize, offset: f64| -> Vec<Vector3> {
        (0..count)
            .map(|i| {
                let azimuth = i as f64 / count as f64 * TAU + offset;
                Vector3::from_colatitude_azimuth(colatitude, azimuth)
            })
            .collect()
    };
    [
        ring(0.0, 1, 0.0),
        ring(PI / 2.0 - belt, 5, 0.0),
        ring(PI / 2.0 + belt, 5, PI / 5.0),
        ring(PI, 1, 0.0),
    ]
}

/// Faces ordered north cap, upper belt, lower belt, south cap.
fn icosahedron_faces() -> Vec<[Vector3; 3]> {
    let [north, upper, lower, south] = icosahedron_rings();
    let mut faces = Vec::with_capacity(FACE_COUNT);
    for i in 0..5 {
        faces.push([north[0], upper[i], upper[(i + 1) % 5]]);
    }
    for i in 0..5 {
        faces.push([upper[i], upper[(i + 1) % 5], lower[i]]);
    }
    for i in 0..5 {
        faces.push([lower[i], lower[(i + 1) % 5], upper[(i + 1) % 5]]);
    }
    for i in 0..5 {
        faces.push([south[0], lower[i], lower[(i + 1) % 5]]);
    }
    faces
}
