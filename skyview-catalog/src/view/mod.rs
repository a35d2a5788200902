//! Camera model and view-cone queries over serialized catalogs.

pub mod camera;
pub mod file;
pub mod origin;
pub mod query;
pub mod svg;

pub use camera::Camera;
pub use file::CatalogFile;
pub use origin::Origin;
pub use query::{View, ViewParams, ViewStar, WeightCurve};
pub use svg::{SvgStyle, DEFAULT_TEMPLATE};
