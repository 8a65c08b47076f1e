use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Read-only view of a document on disk.
///
/// Non-empty files are memory-mapped. Zero-length files are never mapped,
/// since mapping an empty file is an error on some platforms.
pub struct MappedDocument {
    map: Option<Mmap>,
}

impl MappedDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let hashing_failed = |source| PipelineError::HashingFailed {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(hashing_failed)?;
        let meta = file.metadata().map_err(hashing_failed)?;
        if meta.is_dir() {
            return Err(hashing_failed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path is a directory",
            )));
        }
        if meta.len() == 0 {
            return Ok(Self { map: None });
        }

        // SAFETY: The mapping is read-only and lives only for one pipeline run.
        // Callers must not truncate or replace the document while it is mapped.
        let map = unsafe { Mmap::map(&file) }.map_err(hashing_failed)?;
        Ok(Self { map: Some(map) })
    }

    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }
}
