//! Window hashing: one 64-bit fingerprint per k-gram of tokens.
//!
//! The default strategy rolls a single hash across the token stream. The
//! parallel strategy hashes every window independently with Rayon and yields
//! the same records in the same order. Optional winnowing keeps only the
//! minimum hash of every run of `w` consecutive windows.

use rayon::prelude::*;
use std::collections::VecDeque;

use crate::error::{PipelineError, Result};
use crate::rolling_hash::{self, KeyTable, RollingHash};
use crate::tokenizer::Token;

/// k-gram length used by the pHash text hasher.
pub const DEFAULT_KGRAM: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintRecord {
    /// Token position of the window's first token.
    pub index: usize,
    pub hash: u64,
    /// Byte offset of the window's first token in the document.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashStrategy {
    #[default]
    Rolling,
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasherConfig {
    pub kgram: usize,
    pub winnow: Option<usize>,
    pub seed: u64,
    pub strategy: HashStrategy,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            kgram: DEFAULT_KGRAM,
            winnow: None,
            seed: rolling_hash::DEFAULT_SEED,
            strategy: HashStrategy::Rolling,
        }
    }
}

pub struct WindowHasher {
    config: HasherConfig,
    table: KeyTable,
}

impl WindowHasher {
    pub fn new(config: HasherConfig) -> Result<Self> {
        if config.kgram == 0 {
            return Err(PipelineError::invalid_config(
                "kgram",
                config.kgram,
                "window size must be non-zero",
            ));
        }
        if config.winnow == Some(0) {
            return Err(PipelineError::invalid_config(
                "winnow",
                0,
                "winnowing window must be non-zero",
            ));
        }
        let table = KeyTable::from_seed(config.seed);
        Ok(Self { config, table })
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Number of window positions for `token_count` tokens.
    pub fn window_count(&self, token_count: usize) -> usize {
        (token_count + 1).saturating_sub(self.config.kgram)
    }

    /// Lazy, sequential iterator over every window of `tokens`.
    pub fn windows<'a>(&'a self, tokens: &'a [Token]) -> Windows<'a> {
        Windows {
            tokens,
            kgram: self.config.kgram,
            roller: RollingHash::new(&self.table, self.config.kgram),
            next_index: 0,
            count: self.window_count(tokens.len()),
        }
    }

    /// Hash all windows with the configured strategy, then winnow if enabled.
    /// Records are always in ascending index order.
    pub fn hash_tokens(&self, tokens: &[Token]) -> Vec<FingerprintRecord> {
        let records = match self.config.strategy {
            HashStrategy::Rolling => self.windows(tokens).collect(),
            HashStrategy::Parallel => self.hash_parallel(tokens),
        };
        match self.config.winnow {
            Some(w) => winnow(&records, w),
            None => records,
        }
    }

    fn hash_parallel(&self, tokens: &[Token]) -> Vec<FingerprintRecord> {
        let kgram = self.config.kgram;
        let symbols: Vec<u8> = tokens.iter().map(|t| t.symbol).collect();
        // Indexed par_iter + collect keeps ascending index order.
        (0..self.window_count(tokens.len()))
            .into_par_iter()
            .map(|index| FingerprintRecord {
                index,
                hash: rolling_hash::hash_window(&self.table, &symbols[index..index + kgram]),
                offset: tokens[index].offset,
            })
            .collect()
    }
}

pub struct Windows<'a> {
    tokens: &'a [Token],
    kgram: usize,
    roller: RollingHash<'a>,
    next_index: usize,
    count: usize,
}

impl Iterator for Windows<'_> {
    type Item = FingerprintRecord;

    fn next(&mut self) -> Option<FingerprintRecord> {
        let index = self.next_index;
        if index >= self.count {
            return None;
        }
        if index == 0 {
            let first: Vec<u8> = self.tokens[..self.kgram].iter().map(|t| t.symbol).collect();
            self.roller.init(&first);
        } else {
            let old = self.tokens[index - 1].symbol;
            let new = self.tokens[index + self.kgram - 1].symbol;
            self.roller.rotate(old, new);
        }
        self.next_index += 1;
        Some(FingerprintRecord {
            index,
            hash: self.roller.digest(),
            offset: self.tokens[index].offset,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}

/// Winnowing via monotonic deque, O(n).
///
/// For every run of `w` consecutive records, selects the one with the minimum
/// hash (rightmost on ties) and emits it when the selection changes. When
/// there are fewer than `w` records the single global minimum is kept.
pub fn winnow(records: &[FingerprintRecord], w: usize) -> Vec<FingerprintRecord> {
    let n = records.len();
    if n == 0 {
        return Vec::new();
    }
    let window = w.max(1).min(n);

    let mut out = Vec::with_capacity(n - window + 1);
    let mut dq: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut last_picked: Option<usize> = None;

    for i in 0..n {
        while let Some(&j) = dq.back() {
            if records[i].hash <= records[j].hash {
                dq.pop_back();
            } else {
                break;
            }
        }
        dq.push_back(i);

        if i + 1 < window {
            continue;
        }
        let left = i + 1 - window;
        while let Some(&j) = dq.front() {
            if j < left {
                dq.pop_front();
            } else {
                break;
            }
        }
        if let Some(&idx) = dq.front() {
            if last_picked != Some(idx) {
                out.push(records[idx]);
                last_picked = Some(idx);
            }
        }
    }

    out
}
