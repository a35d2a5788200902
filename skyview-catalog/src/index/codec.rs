//! Catalog file format.
//!
//! ```text
//! header   "SKYV" · version (u8) · max_level (u8)
//! div      center (3 × i32 ratio) · radius (u24 ratio of π) · content_size (u32)
//!          star_count (u32) · star × star_count · child_count (u8) · div × child_count
//! star     location (3 × i32 ratio) · brightness (u8 ratio) · r · g · b
//! ```
//!
//! Everything is big-endian. `content_size` counts the bytes after the
//! field itself up to the end of the node's subtree, so a reader can skip a
//! whole subtree with one seek:
//!
//! `content_size = 5 + 16 · star_count + Σ (child.content_size + 19)`
//!
//! Radii are stored rounded up by one angle quantum, so a decoded cone
//! still contains everything the in-memory cone did.
//!
//! Files written before the header existed start directly with the
//! `max_level` byte. They are still readable: a legacy first byte is at
//! most [`MAX_LEVEL`], which can never be the `S` of the magic.

use std::f64::consts::PI;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use skyview_core::codec::{
    ratio_quantum, read_angle, read_int, write_angle, write_int, BinaryField, ANGLE_WIDTH,
};
use skyview_core::{SkyError, SkyResult, Star, Vector3};

use super::mesh::{Catalog, Div, MAX_LEVEL};

pub const MAGIC: &[u8; 4] = b"SKYV";
pub const FORMAT_VERSION: u8 = 1;

/// Bytes of a div before its content: center, radius and content_size.
pub const DIV_HEADER_SIZE: u64 = (Vector3::WIDTH + 3 + 4) as u64;
/// Fixed part of a div's content: star_count and child_count.
pub const DIV_CONTENT_FIXED: u64 = 4 + 1;

const HEADER_SIZE: u64 = MAGIC.len() as u64 + 2;
const LEGACY_HEADER_SIZE: u64 = 1;

/// Parsed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogHeader {
    /// Format version; `None` for headerless legacy files.
    pub version: Option<u8>,
    pub max_level: u8,
}

impl CatalogHeader {
    pub fn current(max_level: u8) -> Self {
        Self {
            version: Some(FORMAT_VERSION),
            max_level,
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.version.is_none()
    }

    /// Bytes occupied by the header; the root div starts here.
    pub fn size(&self) -> u64 {
        if self.is_legacy() {
            LEGACY_HEADER_SIZE
        } else {
            HEADER_SIZE
        }
    }
}

impl fmt::Display for CatalogHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "SKYV v{}, max_level {}", version, self.max_level),
            None => write!(f, "legacy (headerless), max_level {}", self.max_level),
        }
    }
}

pub fn write_header<W: Write>(w: &mut W, max_level: u8) -> SkyResult<()> {
    w.write_all(MAGIC)?;
    write_int(w, FORMAT_VERSION as i64, 1, false)?;
    write_int(w, max_level as i64, 1, false)
}

/// Reads the file header, accepting the legacy one-byte form.
///
/// # Errors
/// [`SkyError::CorruptCatalog`] on truncation, a bad magic, an unknown
/// version, or a `max_level` the mesh cannot have.
pub fn read_header<R: Read>(r: &mut R) -> SkyResult<CatalogHeader> {
    let first = read_int(r, 1, false, "header")? as u8;

    if first <= MAX_LEVEL {
        return Ok(CatalogHeader {
            version: None,
            max_level: first,
        });
    }

    let mut rest = [0u8; 3];
    r.read_exact(&mut rest)
        .map_err(|e| SkyError::from_read(e, "magic"))?;
    if first != MAGIC[0] || rest != MAGIC[1..] {
        return Err(SkyError::corrupt_catalog("magic", "not a skyview catalog"));
    }

    let version = read_int(r, 1, false, "version")? as u8;
    if version != FORMAT_VERSION {
        return Err(SkyError::corrupt_catalog(
            "version",
            &format!("unsupported format version {}", version),
        ));
    }

    let max_level = read_int(r, 1, false, "max_level")? as u8;
    if max_level > MAX_LEVEL {
        return Err(SkyError::corrupt_catalog(
            "max_level",
            &format!("{} exceeds the supported depth {}", max_level, MAX_LEVEL),
        ));
    }

    Ok(CatalogHeader {
        version: Some(version),
        max_level,
    })
}

impl Div {
    /// Encoded size of this node's content; see the module docs.
    pub fn content_size(&self) -> u64 {
        DIV_CONTENT_FIXED
            + self.stars.len() as u64 * Star::WIDTH as u64
            + self
                .children
                .iter()
                .map(|child| child.content_size() + DIV_HEADER_SIZE)
                .sum::<u64>()
    }
}

impl Catalog {
    /// Serializes the header and the whole tree.
    ///
    /// # Errors
    /// [`SkyError::EncodingRange`] if a subtree is larger than 4 GiB or a
    /// node has more than 255 children. Both are detected before anything
    /// is written.
    pub fn write<W: Write>(&self, w: &mut W) -> SkyResult<()> {
        let mut sizes = Vec::new();
        collect_sizes(&self.root, &mut sizes)?;

        write_header(w, self.max_level)?;
        let mut sizes = sizes.into_iter();
        write_div(w, &self.root, &mut sizes)
    }

    /// Writes the catalog to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SkyResult<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.write(&mut w)?;
        w.flush()?;

        tracing::debug!(
            path = %path.display(),
            bytes = HEADER_SIZE + DIV_HEADER_SIZE + self.root.content_size(),
            stars = self.star_count(),
            "saved catalog"
        );
        Ok(())
    }

    /// Decodes a full catalog. Stored sizes are read but not trusted.
    ///
    /// The catalog must run to the end of the stream.
    ///
    /// # Errors
    /// [`SkyError::CorruptCatalog`] if the stream is truncated, the tree is
    /// deeper than the header's `max_level`, or bytes are left over after
    /// the root's subtree (a `child_count` smaller than the real one).
    pub fn read<R: Read>(r: &mut R) -> SkyResult<Self> {
        let header = read_header(r)?;
        let root = read_div(r, 0, header.max_level)?;

        let mut trailing = [0u8; 1];
        if r.read(&mut trailing)? != 0 {
            return Err(SkyError::corrupt_catalog(
                "child_count",
                "bytes left over after the root subtree",
            ));
        }

        Ok(Self {
            max_level: header.max_level,
            root,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> SkyResult<Self> {
        let mut r = BufReader::new(File::open(path)?);
        Self::read(&mut r)
    }
}

/// Records every node's content size in pre-order and returns the root's.
fn collect_sizes(div: &Div, sizes: &mut Vec<u32>) -> SkyResult<u64> {
    if div.children.len() > u8::MAX as usize {
        return Err(SkyError::encoding_range(div.children.len() as f64, 1, "child count"));
    }
    let slot = sizes.len();
    sizes.push(0);

    let mut size = DIV_CONTENT_FIXED + div.stars.len() as u64 * Star::WIDTH as u64;
    for child in &div.children {
        size += collect_sizes(child, sizes)? + DIV_HEADER_SIZE;
    }

    sizes[slot] =
        u32::try_from(size).map_err(|_| SkyError::encoding_range(size as f64, 4, "content size"))?;
    Ok(size)
}

fn write_div<W, I>(w: &mut W, div: &Div, sizes: &mut I) -> SkyResult<()>
where
    W: Write,
    I: Iterator<Item = u32>,
{
    let content_size = sizes
        .next()
        .ok_or_else(|| SkyError::encoding_range(0.0, 4, "content size"))?;

    let radius = (div.radius + PI * ratio_quantum(ANGLE_WIDTH, false)).min(PI);
    div.center.encode(w)?;
    write_angle(w, radius)?;
    write_int(w, content_size as i64, 4, false)?;

    write_int(w, div.stars.len() as i64, 4, false)?;
    for star in &div.stars {
        star.encode(w)?;
    }

    write_int(w, div.children.len() as i64, 1, false)?;
    for child in &div.children {
        write_div(w, child, sizes)?;
    }
    Ok(())
}

fn read_div<R: Read>(r: &mut R, depth: u8, max_level: u8) -> SkyResult<Div> {
    let center = Vector3::decode(r)?;
    let radius = read_angle(r, "radius")?;
    read_int(r, 4, false, "content_size")?;

    let star_count = read_int(r, 4, false, "star_count")? as usize;
    // A corrupt count must not trigger a huge allocation before EOF is hit.
    let mut stars = Vec::with_capacity(star_count.min(4096));
    for _ in 0..star_count {
        stars.push(Star::decode(r)?);
    }

    let child_count = read_int(r, 1, false, "child_count")? as usize;
    if child_count > 0 && depth >= max_level {
        return Err(SkyError::corrupt_catalog(
            "child_count",
            &format!("node at depth {} has children below max_level {}", depth, max_level),
        ));
    }
    let mut children = Vec::with_capacity(child_count);
    for _ in 0..child_count {
        children.push(read_div(r, depth + 1, max_level)?);
    }

    Ok(Div {
        center,
        radius,
        stars,
        children,
    })
}
