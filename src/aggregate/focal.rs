//! Focal-length buckets.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Lens focal length in millimetres, usable as a grouping key.
///
/// Ordering is numeric via `f64::total_cmp`; equality and hashing use the
/// same bit pattern so all three agree. Negative zero is folded into zero.
#[derive(Debug, Clone, Copy)]
pub struct FocalLength(f64);

impl FocalLength {
    pub fn new(millimetres: f64) -> Self {
        if millimetres == 0.0 {
            Self(0.0)
        } else {
            Self(millimetres)
        }
    }

    pub fn millimetres(&self) -> f64 {
        self.0
    }
}

impl PartialEq for FocalLength {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FocalLength {}

impl PartialOrd for FocalLength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FocalLength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FocalLength {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for FocalLength {
    fn from(millimetres: f64) -> Self {
        Self::new(millimetres)
    }
}

impl fmt::Display for FocalLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drop absent focal lengths, keeping the rest in their original order.
///
/// Missing lens metadata is normal (phone shots, manual lenses) and is not
/// reported as an error.
pub fn normalize_focal_lengths(rows: &[Option<f64>]) -> Vec<FocalLength> {
    let lengths: Vec<FocalLength> = rows.iter().flatten().copied().map(FocalLength::new).collect();

    let dropped = rows.len() - lengths.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} rows without a focal length", dropped);
    }

    lengths
}
