//! Bucket normalization and frequency counting.
//!
//! Raw catalog rows are normalized into bucket keys (calendar months or
//! focal lengths), then reduced to a [`Series`]: the sorted distinct keys
//! and a parallel count of how often each occurred.

pub mod dates;
pub mod focal;

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

pub use dates::{
    capture_month, normalize_capture_times, normalize_capture_times_lenient, FormatError,
    FormatErrorKind, YearMonth,
};
pub use focal::{normalize_focal_lengths, FocalLength};

/// Sorted, duplicate-free copy of `keys`.
pub fn unique_keys<K: Ord + Clone>(keys: &[K]) -> Vec<K> {
    keys.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Count how often each of `unique` occurs in `keys`.
///
/// Builds the occurrence map in a single pass over `keys`. Keys in
/// `unique` that never occur count zero.
pub fn count_occurrences<K: Eq + Hash>(unique: &[K], keys: &[K]) -> Vec<usize> {
    let mut occurrences: HashMap<&K, usize> = HashMap::with_capacity(unique.len());
    for key in keys {
        *occurrences.entry(key).or_insert(0) += 1;
    }

    unique
        .iter()
        .map(|key| occurrences.get(key).copied().unwrap_or(0))
        .collect()
}

/// Parallel keys and counts, ready to plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series<K> {
    pub keys: Vec<K>,
    pub counts: Vec<usize>,
}

impl<K: Ord + Hash + Clone> Series<K> {
    /// Aggregate a normalized key sequence. The distinct keys are always
    /// counted against the same sequence they were drawn from.
    pub fn from_keys(keys: &[K]) -> Self {
        let unique = unique_keys(keys);
        let counts = count_occurrences(&unique, keys);
        Self {
            keys: unique,
            counts,
        }
    }
}

impl<K> Series<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of rows that went into the series.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.keys.iter().zip(self.counts.iter().copied())
    }

    /// Bucket with the highest count; the earliest wins a tie.
    pub fn peak(&self) -> Option<(&K, usize)> {
        self.iter()
            .fold(None, |best, (key, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((key, count)),
            })
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

impl<K> Default for Series<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            counts: Vec::new(),
        }
    }
}
