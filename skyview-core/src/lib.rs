//! Core types for skyview star catalogs.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`vector3`] | [`Vector3`] directions on the unit sphere, angular distance, rotations |
//! | [`codec`] | Fixed-point big-endian fields and the [`BinaryField`](codec::BinaryField) trait |
//! | [`star`] | [`Star`], [`Brightness`], [`Color`] and their 16-byte encoding |
//! | [`photometry`] | Magnitude → brightness, B−V → color, RA/Dec → direction |
//! | [`errors`] | [`SkyError`] and [`SkyResult`] |
//!
//! The spatial index, its file format and view queries live in
//! `skyview-catalog`; this crate holds the leaf types they share.
//!
//! # Features
//!
//! - **`serde`**: derives `Serialize`/`Deserialize` for the value types.

pub mod codec;
pub mod errors;
pub mod photometry;
pub mod star;
pub mod vector3;

pub use errors::{SkyError, SkyResult};
pub use star::{Brightness, Color, Star};
pub use vector3::Vector3;
