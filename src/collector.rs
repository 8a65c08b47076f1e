use std::path::Path;

use crate::error::Result;
use crate::tokenizer;
use crate::util::MappedDocument;
use crate::window::{FingerprintRecord, WindowHasher};

/// Every window fingerprint of one document, in ascending index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSequence {
    records: Vec<FingerprintRecord>,
    /// Number of tokens the document normalized to.
    token_count: usize,
}

impl FingerprintSequence {
    pub fn records(&self) -> &[FingerprintRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn hashes(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.iter().map(|r| r.hash)
    }
}

/// Hash the document at `path`.
///
/// An unreadable document is `HashingFailed`. A document too short for a single
/// window is not an error: it yields an empty sequence.
pub fn collect(path: &Path, hasher: &WindowHasher) -> Result<FingerprintSequence> {
    let document = MappedDocument::open(path)?;
    tracing::debug!(
        path = %path.display(),
        bytes = document.bytes().len(),
        "document opened"
    );
    Ok(collect_bytes(document.bytes(), hasher))
}

/// Hash an in-memory document.
pub fn collect_bytes(bytes: &[u8], hasher: &WindowHasher) -> FingerprintSequence {
    let tokens = tokenizer::tokenize(bytes);
    // Window iterators are exact-size, so the record vector is allocated once.
    let records = hasher.hash_tokens(&tokens);

    if records.is_empty() {
        tracing::warn!(
            tokens = tokens.len(),
            kgram = hasher.config().kgram,
            "document yields no windows"
        );
    } else {
        tracing::debug!(
            tokens = tokens.len(),
            windows = records.len(),
            last_window_offset = records.last().map(|r| r.offset),
            "windows hashed"
        );
    }

    FingerprintSequence {
        records,
        token_count: tokens.len(),
    }
}
