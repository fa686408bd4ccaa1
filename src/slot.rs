//! Slot states of the probing array

/// One position of the slot array.
///
/// A `Tombstone` keeps probe chains intact after a delete: lookups walk past
/// it, inserts may reuse it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot<K, V> {
    /// Never written since the last resize or clear
    #[default]
    Empty,
    /// Held an entry that has since been deleted
    Tombstone,
    /// Holds a live entry
    Occupied(K, V),
}

impl<K, V> Slot<K, V> {
    /// Returns true for `Empty`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true for `Tombstone`
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }

    /// Returns true for `Occupied`
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(..))
    }

    /// Borrows the live entry, if any
    #[must_use]
    pub fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Tombstone => None,
        }
    }

    /// Consumes the slot, yielding its live entry
    pub(crate) fn into_entry(self) -> Option<(K, V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Tombstone => None,
        }
    }
}
