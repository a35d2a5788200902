use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use memmap2::Mmap;
use skyview_core::{SkyError, SkyResult};

use super::camera::Camera;
use super::query::{View, ViewParams};
use crate::index::codec::{read_header, CatalogHeader, DIV_CONTENT_FIXED, DIV_HEADER_SIZE};
use crate::index::Catalog;

/// Memory-mapped handle to a serialized catalog.
///
/// Created by [`CatalogFile::open`]. The file stays mapped for the lifetime
/// of this value; each query walks the mapped bytes, so repeated views of
/// the same catalog only touch the pages their unpruned nodes live on.
pub struct CatalogFile {
    mmap: Mmap,
    header: CatalogHeader,
}

impl CatalogFile {
    /// Open and memory-map a catalog file.
    ///
    /// Validates the header and checks the file is large enough for a root
    /// node. No node data is read until a query runs.
    ///
    /// # Errors
    /// [`SkyError::Io`] if the file cannot be opened or mapped;
    /// [`SkyError::CorruptCatalog`] if the header is invalid or the file is
    /// too small.
    pub fn open(path: impl AsRef<Path>) -> SkyResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(SkyError::corrupt_catalog("header", "catalog file is empty"));
        }

        let mmap = unsafe { Mmap::map(&file) }?;
        let header = read_header(&mut Cursor::new(&mmap[..]))?;

        let min_size = header.size() + DIV_HEADER_SIZE + DIV_CONTENT_FIXED;
        if (mmap.len() as u64) < min_size {
            return Err(SkyError::corrupt_catalog(
                "root",
                &format!(
                    "catalog file too small: {} bytes, expected at least {}",
                    mmap.len(),
                    min_size
                ),
            ));
        }

        tracing::debug!(
            path = %path.display(),
            bytes = mmap.len(),
            header = %header,
            "opened catalog"
        );
        Ok(Self { mmap, header })
    }

    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    /// Returns the total size of the memory-mapped file in bytes.
    pub fn file_size(&self) -> usize {
        self.mmap.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Runs a view query over the mapped bytes.
    pub fn view(&self, camera: &Camera, params: &ViewParams) -> SkyResult<View> {
        View::from_reader(&mut Cursor::new(self.as_bytes()), camera, params)
    }

    /// Decodes the whole tree into memory.
    pub fn decode(&self) -> SkyResult<Catalog> {
        Catalog::read(&mut Cursor::new(self.as_bytes()))
    }
}
