//! Utility functions and traits for `ProbingTable`

use crate::ProbingTable;
use std::hash::{BuildHasher, Hash};

/// Extension trait for tables that provides additional utility methods
pub trait TableExtensions<K, V> {
    /// Returns the live entries ordered by key, independent of slot layout
    fn sorted_pairs(&self) -> Vec<(K, V)>;

    /// Returns the value for `key`, or `default` if the key is absent
    fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V;
}

impl<K, V, S> TableExtensions<K, V> for ProbingTable<K, V, S>
where
    K: Ord + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn sorted_pairs(&self) -> Vec<(K, V)> {
        let mut pairs = self.pairs();
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        pairs
    }

    fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }
}
