use std::collections::HashSet;

use crate::collector::FingerprintSequence;

/// Distinct hashes in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueHashSet {
    hashes: Vec<u64>,
}

impl UniqueHashSet {
    #[cfg(test)]
    pub fn as_slice(&self) -> &[u64] {
        &self.hashes
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.hashes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Reduce a fingerprint sequence to its distinct hashes. The first occurrence
/// of a hash wins; later duplicates are dropped along with their indices.
pub fn deduplicate(seq: &FingerprintSequence) -> UniqueHashSet {
    deduplicate_hashes(seq.hashes())
}

pub fn deduplicate_hashes<I>(hashes: I) -> UniqueHashSet
where
    I: IntoIterator<Item = u64>,
{
    let iter = hashes.into_iter();
    let (lower, _) = iter.size_hint();
    let mut seen: HashSet<u64> = HashSet::with_capacity(lower);
    let mut ordered = Vec::with_capacity(lower);
    for hash in iter {
        if seen.insert(hash) {
            ordered.push(hash);
        }
    }
    UniqueHashSet { hashes: ordered }
}

#[cfg(test)]
fn deduplicate_naive(hashes: &[u64]) -> Vec<u64> {
    let mut out: Vec<u64> = Vec::new();
    for &h in hashes {
        if !out.contains(&h) {
            out.push(h);
        }
    }
    out
}
