//! Level-of-detail star index on a subdivided icosahedron.
//!
//! Stars are bucketed by brightness into the levels of an icosahedral mesh:
//! the brightest near the root, the faintest in the deepest cells. The mesh
//! is serialized depth-first with the byte size of every subtree, so a view
//! query streams the file and seeks past every subtree whose bounding cone
//! misses the view. The tree is never loaded to answer a query.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`index::mesh`] | [`Catalog::create`](index::Catalog::create), [`Div`](index::Div) nodes, tree walks |
//! | [`index::builder`] | [`Catalog::insert`](index::Catalog::insert), [`MagnitudeBand`](index::MagnitudeBand), [`default_bands`](index::default_bands) |
//! | [`index::codec`] | File format, [`CatalogHeader`](index::CatalogHeader), `write`/`read`/`save`/`load` |
//! | [`view::camera`] | [`Camera`](view::Camera) pointing, spin and pan |
//! | [`view::query`] | [`View::from_reader`](view::View::from_reader), [`ViewParams`](view::ViewParams), [`ViewStar`](view::ViewStar) |
//! | [`view::file`] | [`CatalogFile`](view::CatalogFile), a memory-mapped catalog |
//!
//! # Quick Start
//!
//! ```ignore
//! use skyview_catalog::index::{default_bands, Catalog};
//! use skyview_catalog::view::{Camera, CatalogFile, ViewParams};
//!
//! let mut catalog = Catalog::create(5)?;
//! catalog.insert(0, sirius)?;
//! catalog.save("stars.skyv")?;
//!
//! let file = CatalogFile::open("stars.skyv")?;
//! let camera = Camera::from_ra_dec(6.75, -16.7, 40.0)?;
//! let view = file.view(&camera, &ViewParams::default())?;
//! for star in &view.stars {
//!     println!("{:.3} {:.3} {:.2}", star.azimuth, star.radius, star.weight);
//! }
//! ```
//!
//! # Features
//!
//! - **`cli`**: enables the `forge` (catalog build) and `skyview` (query)
//!   binaries.

pub mod index;
pub mod view;

pub use index::{Catalog, CatalogHeader, Div, MagnitudeBand};
pub use view::{Camera, CatalogFile, View, ViewParams, ViewStar};
