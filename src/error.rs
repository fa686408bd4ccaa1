//! Error type shared by every fallible table operation

use thiserror::Error;

/// Failures surfaced by [`ProbingTable`](crate::ProbingTable) operations.
///
/// A failed operation never leaves the table in a partially updated state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Construction or resize parameters are out of range
    #[error("invalid table configuration: {reason}")]
    InvalidConfig {
        /// Human readable description of the rejected parameter
        reason: String,
    },
    /// The key has no occupied slot
    #[error("key not found")]
    NotFound,
    /// A full probe cycle found neither the key nor a free slot
    #[error("no free slot in a table of capacity {capacity}")]
    TableFull {
        /// Capacity of the table at the time of the failed write
        capacity: usize,
    },
}

impl TableError {
    /// Builds an [`TableError::InvalidConfig`] from anything printable
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            TableError::invalid_config("capacity must be at least 1").to_string(),
            "invalid table configuration: capacity must be at least 1"
        );
        assert_eq!(TableError::NotFound.to_string(), "key not found");
        assert_eq!(
            TableError::TableFull { capacity: 4 }.to_string(),
            "no free slot in a table of capacity 4"
        );
    }
}
