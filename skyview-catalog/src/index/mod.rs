//! The in-memory index: mesh construction, insertion and serialization.

pub mod builder;
pub mod codec;
pub mod mesh;

pub use builder::{bucket_for_magnitude, default_bands, MagnitudeBand, FAINT_LIMIT};
pub use codec::{read_header, CatalogHeader, FORMAT_VERSION, MAGIC};
pub use mesh::{Catalog, Div, MAX_LEVEL};
