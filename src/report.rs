//! Report artifacts.
//!
//! `hash.info` lists every record with its index and full 64-bit hash.
//! `hash` lists the upper 32 bits of each hash, one per line, in document
//! order. Both files are opened before either is written.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::collector::FingerprintSequence;
use crate::dedup::UniqueHashSet;
use crate::error::{PipelineError, Result};

pub const DEFAULT_FULL_REPORT: &str = "hash.info";
pub const DEFAULT_COMPACT_REPORT: &str = "hash";

/// What the compact report lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompactListing {
    /// Every record in document order, duplicates included.
    #[default]
    Full,
    /// Only the first occurrence of each hash.
    Unique,
}

struct Artifact {
    path: PathBuf,
    out: BufWriter<File>,
    /// The file did not exist before this run opened it.
    created: bool,
}

impl Artifact {
    /// Open without truncating, so a failure to open the other artifact
    /// leaves this one as it was.
    fn open(path: &Path) -> Result<Self> {
        let created = !path.exists();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| PipelineError::ArtifactOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            created,
        })
    }

    /// Undo `open` when the run is abandoned before anything was written.
    fn discard(self) {
        if self.created {
            drop(self.out);
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), "failed to remove empty report: {e}");
            }
        }
    }

    fn write_failed(&self, source: std::io::Error) -> PipelineError {
        PipelineError::ArtifactWriteFailed {
            path: self.path.clone(),
            source,
        }
    }

    fn truncate(&self) -> Result<()> {
        self.out.get_ref().set_len(0).map_err(|e| self.write_failed(e))
    }

    /// Whether both artifacts resolve to the same file on disk.
    fn same_file(&self, other: &Artifact) -> Result<bool> {
        let resolve = |artifact: &Artifact| {
            std::fs::canonicalize(&artifact.path).map_err(|source| {
                PipelineError::ArtifactOpenFailed {
                    path: artifact.path.clone(),
                    source,
                }
            })
        };
        Ok(resolve(self)? == resolve(other)?)
    }

    fn finish(mut self) -> Result<()> {
        self.out.flush().map_err(|e| self.write_failed(e))
    }
}

pub struct ReportWriter {
    full: Artifact,
    compact: Artifact,
}

impl ReportWriter {
    /// Open both report files. Nothing is written unless both open, name
    /// different files, and the compact report could be truncated.
    pub fn create(full_path: &Path, compact_path: &Path) -> Result<Self> {
        let full = Artifact::open(full_path)?;
        let compact = match Artifact::open(compact_path) {
            Ok(compact) => compact,
            Err(err) => {
                full.discard();
                return Err(err);
            }
        };
        if let Err(err) = Self::prepare(&full, &compact) {
            compact.discard();
            full.discard();
            return Err(err);
        }
        Ok(Self { full, compact })
    }

    fn prepare(full: &Artifact, compact: &Artifact) -> Result<()> {
        if full.same_file(compact)? {
            return Err(PipelineError::invalid_config(
                "compact_report",
                compact.path.display(),
                "must name a different file than the full report",
            ));
        }
        // hash.info is only cleared once the compact report is known to be writable.
        compact.truncate()?;
        full.truncate()
    }

    pub fn write(
        mut self,
        seq: &FingerprintSequence,
        unique: &UniqueHashSet,
        listing: CompactListing,
    ) -> Result<()> {
        write_full(&mut self.full.out, seq).map_err(|e| self.full.write_failed(e))?;

        let compact = match listing {
            CompactListing::Full => write_compact(&mut self.compact.out, seq.hashes()),
            CompactListing::Unique => write_compact(&mut self.compact.out, unique.iter()),
        };
        compact.map_err(|e| self.compact.write_failed(e))?;

        self.full.finish()?;
        self.compact.finish()
    }
}

pub fn write_full<W: Write>(out: &mut W, seq: &FingerprintSequence) -> std::io::Result<()> {
    writeln!(out, "length {}", seq.len())?;
    for (i, record) in seq.records().iter().enumerate() {
        writeln!(out, "hash[{i}] index: {}", record.index)?;
        writeln!(out, "hash[{i}] hash: {:x}", record.hash)?;
    }
    Ok(())
}

pub fn write_compact<W, I>(out: &mut W, hashes: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = u64>,
{
    for hash in hashes {
        writeln!(out, "{:x}", upper_half(hash))?;
    }
    Ok(())
}

/// Upper 32 bits of a fingerprint, the width persisted in the compact report.
#[inline]
pub fn upper_half(hash: u64) -> u32 {
    (hash >> 32) as u32
}
