//! Construction parameters for [`ProbingTable`](crate::ProbingTable)

use crate::error::{Result, TableError};

/// Number of slots used when no capacity is requested
pub const DEFAULT_CAPACITY: usize = 8;

/// Load factor at which the next write doubles the table
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.6;

/// Capacity and growth policy of a table.
///
/// ```rust
/// use probing_table::TableConfig;
///
/// let config = TableConfig::default().with_capacity(32).with_load_factor_threshold(0.75);
/// assert!(config.validate().is_ok());
/// assert!(TableConfig::default().with_capacity(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Initial number of slots, at least 1
    pub capacity: usize,
    /// Growth trigger in the half-open range (0, 1]
    pub load_factor_threshold: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY, load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD }
    }
}

impl TableConfig {
    /// Replaces the initial capacity
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replaces the load factor threshold
    #[must_use]
    pub fn with_load_factor_threshold(mut self, threshold: f64) -> Self {
        self.load_factor_threshold = threshold;
        self
    }

    /// Checks both parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when the capacity is zero or the
    /// threshold is outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 1 {
            return Err(TableError::invalid_config("capacity must be at least 1"));
        }
        validate_threshold(self.load_factor_threshold)
    }
}

/// Rejects thresholds outside (0, 1], NaN included
pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(TableError::invalid_config(format!(
            "load factor threshold must be in (0, 1], got {threshold}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TableConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!((config.load_factor_threshold - 0.6).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(0.01).is_ok());
        assert!(validate_threshold(0.0).is_err());
        assert!(validate_threshold(-0.5).is_err());
        assert!(validate_threshold(1.01).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TableConfig::default().with_capacity(0).validate().unwrap_err();
        assert!(matches!(err, TableError::InvalidConfig { .. }));
    }
}
