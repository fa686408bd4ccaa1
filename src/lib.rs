//! # Probing Table
//!
//! An open-addressing hash table with linear probing.
//!
//! All entries live directly in one slot array. A key starts probing at
//! `hash(key) mod capacity` and walks forward one slot at a time, wrapping at
//! the end. Deletes leave tombstones so later entries on the same chain stay
//! reachable, and once the share of non-empty slots reaches the configured
//! load factor threshold the next write doubles the array and rehashes the
//! live entries, dropping every tombstone.
//!
//! ## Basic Usage
//!
//! ```rust
//! use probing_table::{ProbingTable, TableError};
//!
//! // Create a table with ten slots and the default 0.6 threshold
//! let mut table = ProbingTable::new(10).unwrap();
//!
//! // Insert values
//! table.set("apple".to_string(), 1).unwrap();
//! table.set("banana".to_string(), 2).unwrap();
//!
//! // Retrieve values
//! assert_eq!(table.get("apple"), Ok(&1));
//!
//! // Update values
//! table.set("apple".to_string(), 10).unwrap();
//! assert_eq!(table.get("apple"), Ok(&10));
//!
//! // Remove values
//! assert_eq!(table.delete("apple"), Ok(10));
//! assert_eq!(table.get("apple"), Err(TableError::NotFound));
//! ```
//!
//! ## Growth
//!
//! ```rust
//! use probing_table::ProbingTable;
//!
//! let mut table = ProbingTable::with_threshold(5, 0.4).unwrap();
//! table.set(1, "one").unwrap();
//! table.set(2, "two").unwrap();
//! assert_eq!(table.capacity(), 5);
//!
//! // The load factor has reached 0.4, so this write doubles the table first
//! table.set(3, "three").unwrap();
//! assert_eq!(table.capacity(), 10);
//! assert_eq!(table.len(), 3);
//! ```

/// Construction parameters and their defaults
mod config;
/// Error type for table operations
mod error;
/// Hash builders used to place keys
mod hashing;
/// `env_logger` setup
pub mod logger;
/// The open-addressing table itself
mod probing_table;
/// Slot states
mod slot;
/// Utility functions and traits for the table
mod utils;

pub use config::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD, TableConfig};
pub use error::{Result, TableError};
pub use hashing::{BuildIdentityHasher, DefaultHashBuilder, IdentityHasher};
pub use probing_table::{IntoIter, Iter, ProbingTable};
pub use slot::Slot;
pub use utils::TableExtensions;
