//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval overlaps with the other.
    /// Touching intervals count as overlapping.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max >= other.min && other.max >= self.min
    }
}

impl<T: Float> Interval<T> {
    /// The smallest interval containing every value, or `None` if there are none.
    pub fn enclosing(values: impl IntoIterator<Item = T>) -> Option<Self> {
        values
            .into_iter()
            .minmax_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .into_option()
            .map(|(min, max)| Self { min, max })
    }

    /// The length of the intersection of both intervals, or zero if they are disjoint.
    pub fn overlap_length(&self, other: &Self) -> T {
        if !self.overlaps(other) {
            return T::zero();
        }
        T::min(self.max, other.max) - T::max(self.min, other.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}
