use std::{
    borrow::Borrow,
    collections::HashSet,
    fmt,
    hash::{BuildHasher, Hash},
    iter, mem,
    ops::Range,
};

use log::{debug, trace, warn};

use crate::{
    config::{self, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD, TableConfig},
    error::{Result, TableError},
    hashing::DefaultHashBuilder,
    slot::Slot,
};

/// Where a write for a given key should land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// The key is already stored at this index
    Existing(usize),
    /// The key is absent; this is the first empty slot or tombstone on its chain
    Free(usize),
    /// A full cycle found neither the key nor a free slot
    Full,
}

/// Slot indices visited by a linear probe from `start`, wrapping once around
/// a table of `capacity` slots.
fn probe_indices(start: usize, capacity: usize) -> iter::Chain<Range<usize>, Range<usize>> {
    let start = start.min(capacity);
    (start..capacity).chain(0..start)
}

/// Computes `hash(key) mod capacity`
fn start_index<Q, S>(hash_builder: &S, key: &Q, capacity: usize) -> usize
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    let hash = hash_builder.hash_one(key);
    let modulus = u64::try_from(capacity).unwrap_or(u64::MAX);
    hash.checked_rem(modulus).and_then(|index| usize::try_from(index).ok()).unwrap_or(0)
}

/// An open-addressing hash table with linear probing and tombstone deletion.
///
/// Every key lives on the probe chain that starts at `hash(key) mod capacity`
/// and walks forward one slot at a time, wrapping at the end of the array.
/// Deleted entries leave a [`Slot::Tombstone`] behind so later entries of the
/// same chain stay reachable. Once the share of non-empty slots (tombstones
/// included) reaches the load factor threshold, the next write doubles the
/// capacity and rehashes only the live entries.
///
/// ```rust
/// use probing_table::{ProbingTable, TableError};
///
/// let mut table = ProbingTable::new(10).unwrap();
/// table.set("hello", "world").unwrap();
/// assert_eq!(table.get("hello"), Ok(&"world"));
/// assert_eq!(table.delete("hello"), Ok("world"));
/// assert_eq!(table.get("hello"), Err(TableError::NotFound));
/// ```
///
/// Note: This implementation is not thread-safe.
#[derive(Clone)]
pub struct ProbingTable<K, V, S = DefaultHashBuilder> {
    /// The slot array; its length is the capacity
    slots: Vec<Slot<K, V>>,
    /// Number of occupied slots plus tombstones
    occupied: usize,
    /// Number of occupied slots
    active: usize,
    /// Load factor at which the next write grows the table
    load_factor_threshold: f64,
    /// Builds the hasher used to place keys
    hash_builder: S,
}

impl<K, V> ProbingTable<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates a table of `capacity` empty slots with the default threshold of 0.6.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(TableConfig::default().with_capacity(capacity))
    }

    /// Creates a table with an explicit load factor threshold.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when `capacity` is zero or the
    /// threshold is outside (0, 1].
    pub fn with_threshold(capacity: usize, load_factor_threshold: f64) -> Result<Self> {
        Self::with_config(
            TableConfig::default()
                .with_capacity(capacity)
                .with_load_factor_threshold(load_factor_threshold),
        )
    }

    /// Creates a table from a [`TableConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when the config does not validate.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }

    /// Builds a table holding `entries`, inserted first to last.
    ///
    /// Later duplicates of a key overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when `capacity` is zero or smaller
    /// than the number of entries.
    pub fn from_entries<I>(entries: I, capacity: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_entries_with_hasher(entries, capacity, DefaultHashBuilder::default())
    }

    /// Like [`from_entries`](Self::from_entries), sized to the default capacity
    /// or to the entry count if that is larger.
    ///
    /// # Errors
    ///
    /// Only fails if a write fails, which a valid threshold rules out.
    pub fn from_entries_default<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        let capacity = entries.len().max(DEFAULT_CAPACITY);
        Self::from_entries(entries, capacity)
    }
}

impl<K, V, S> ProbingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a table using `hash_builder` as its hash operation.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when the config does not validate.
    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config.capacity, config.load_factor_threshold, hash_builder))
    }

    /// Builds a table holding `entries` that hashes with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when `capacity` is zero or smaller
    /// than the number of entries.
    pub fn from_entries_with_hasher<I>(entries: I, capacity: usize, hash_builder: S) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        if capacity < entries.len() {
            return Err(TableError::invalid_config(format!(
                "capacity {capacity} cannot hold {} entries",
                entries.len()
            )));
        }

        let mut table =
            Self::with_config_and_hasher(TableConfig::default().with_capacity(capacity), hash_builder)?;
        for (key, value) in entries {
            table.set(key, value)?;
        }
        Ok(table)
    }

    /// Retrieves the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] when the key is absent.
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find(key).and_then(|index| self.slots.get(index)) {
            Some(Slot::Occupied(_, value)) => Ok(value),
            _ => Err(TableError::NotFound),
        }
    }

    /// Retrieves a mutable reference to the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] when the key is absent.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find(key).ok_or(TableError::NotFound)?;
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(_, value)) => Ok(value),
            _ => Err(TableError::NotFound),
        }
    }

    /// Returns true if the table holds `key`
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// If the load factor has already reached the threshold the table doubles
    /// before the write, so the new entry lands in the grown array.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::TableFull`] if no slot could take the entry. With a
    /// threshold in (0, 1] growth always leaves an empty slot, so this does not
    /// happen in practice.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        if self.load_factor() >= self.load_factor_threshold {
            self.resize_and_rehash(self.capacity().saturating_mul(2))?;
        }
        self.write(key, value)
    }

    /// Removes `key`, leaving a tombstone, and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] when the key is absent.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find(key).ok_or(TableError::NotFound)?;
        let Some(slot) = self.slots.get_mut(index).filter(|slot| slot.is_occupied()) else {
            return Err(TableError::NotFound);
        };

        let (_, value) = mem::replace(slot, Slot::Tombstone).into_entry().ok_or(TableError::NotFound)?;
        self.active = self.active.saturating_sub(1);
        trace!("tombstoned slot {index}, {} live entries remain", self.active);
        Ok(value)
    }

    /// Rebuilds the table with `new_capacity` slots from its live entries.
    ///
    /// Every entry's new position is worked out before anything moves, so a
    /// failure leaves the table exactly as it was. Tombstones are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when `new_capacity` is zero or
    /// smaller than the number of live entries.
    pub fn resize_and_rehash(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity < self.active.max(1) {
            return Err(TableError::invalid_config(format!(
                "capacity {new_capacity} cannot hold {} entries",
                self.active
            )));
        }

        let mut taken = vec![false; new_capacity];
        let mut targets = Vec::with_capacity(self.active);
        for (key, _) in self.iter() {
            let start = start_index(&self.hash_builder, key, new_capacity);
            let target = probe_indices(start, new_capacity)
                .find(|&index| taken.get(index) == Some(&false))
                .ok_or(TableError::TableFull { capacity: new_capacity })?;
            if let Some(flag) = taken.get_mut(target) {
                *flag = true;
            }
            targets.push(target);
        }

        debug!(
            "rehashing {} entries from {} to {new_capacity} slots, dropping {} tombstones",
            self.active,
            self.capacity(),
            self.tombstone_count()
        );

        let mut staged: Vec<Slot<K, V>> =
            iter::repeat_with(Slot::default).take(new_capacity).collect();
        let old_slots = mem::take(&mut self.slots);
        for ((key, value), target) in old_slots.into_iter().filter_map(Slot::into_entry).zip(targets)
        {
            if let Some(slot) = staged.get_mut(target) {
                *slot = Slot::Occupied(key, value);
            }
        }

        self.slots = staged;
        self.occupied = self.active;
        Ok(())
    }

    /// Number of slots a lookup of `key` visits before it either finds the key
    /// or proves it absent.
    pub fn probe_length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut visited: usize = 0;
        for index in self.probe(key) {
            visited = visited.saturating_add(1);
            match self.slots.get(index) {
                None | Some(Slot::Empty) => break,
                Some(Slot::Occupied(candidate, _)) if candidate.borrow() == key => break,
                Some(Slot::Tombstone | Slot::Occupied(..)) => {}
            }
        }
        visited
    }

    /// Compares contents and capacity; `==` compares contents only
    pub fn eq_with_capacity(&self, other: &Self) -> bool
    where
        V: PartialEq,
    {
        self.capacity() == other.capacity() && self == other
    }

    /// Probe indices for `key` in the current array
    fn probe<Q>(&self, key: &Q) -> iter::Chain<Range<usize>, Range<usize>>
    where
        Q: Hash + ?Sized,
    {
        let capacity = self.slots.len();
        probe_indices(start_index(&self.hash_builder, key, capacity), capacity)
    }

    /// Index of the occupied slot holding `key`
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        for index in self.probe(key) {
            match self.slots.get(index) {
                None | Some(Slot::Empty) => return None,
                Some(Slot::Occupied(candidate, _)) if candidate.borrow() == key => {
                    return Some(index);
                }
                Some(Slot::Tombstone | Slot::Occupied(..)) => {}
            }
        }
        None
    }

    /// Walks the chain of `key`, remembering the first reusable slot
    fn locate(&self, key: &K) -> Placement {
        let mut first_free = None;
        for index in self.probe(key) {
            match self.slots.get(index) {
                None => break,
                Some(Slot::Empty) => return Placement::Free(first_free.unwrap_or(index)),
                Some(Slot::Tombstone) => {
                    if first_free.is_none() {
                        first_free = Some(index);
                    }
                }
                Some(Slot::Occupied(candidate, _)) if candidate == key => {
                    return Placement::Existing(index);
                }
                Some(Slot::Occupied(..)) => {}
            }
        }
        // The whole cycle was walked, so the key is absent and a tombstone is safe to reuse.
        first_free.map_or(Placement::Full, Placement::Free)
    }

    /// Writes without checking the load factor
    fn write(&mut self, key: K, value: V) -> Result<Option<V>> {
        let capacity = self.capacity();
        match self.locate(&key) {
            Placement::Existing(index) => match self.slots.get_mut(index) {
                Some(Slot::Occupied(_, current)) => Ok(Some(mem::replace(current, value))),
                _ => Err(TableError::TableFull { capacity }),
            },
            Placement::Free(index) => {
                let slot = self.slots.get_mut(index).ok_or(TableError::TableFull { capacity })?;
                let reused = slot.is_tombstone();
                *slot = Slot::Occupied(key, value);

                if reused {
                    trace!("reused tombstone at slot {index}");
                } else {
                    self.occupied = self.occupied.saturating_add(1);
                }
                self.active = self.active.saturating_add(1);
                Ok(None)
            }
            Placement::Full => Err(TableError::TableFull { capacity }),
        }
    }
}

impl<K, V, S> ProbingTable<K, V, S> {
    /// Builds an all-empty table from parameters that are known to be valid
    fn from_parts(capacity: usize, load_factor_threshold: f64, hash_builder: S) -> Self {
        Self {
            slots: iter::repeat_with(Slot::default).take(capacity).collect(),
            occupied: 0,
            active: 0,
            load_factor_threshold,
            hash_builder,
        }
    }

    /// Returns the number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.active
    }

    /// Returns true if the table holds no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Returns the number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots plus tombstones
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Returns the number of tombstones
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.occupied.saturating_sub(self.active)
    }

    /// Returns `occupied_count / capacity`
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.slots.len() as f64
    }

    /// Returns the load factor that triggers growth
    #[must_use]
    pub fn load_factor_threshold(&self) -> f64 {
        self.load_factor_threshold
    }

    /// Replaces the load factor that triggers growth.
    ///
    /// The new threshold applies from the next write on.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] when the threshold is outside (0, 1].
    pub fn set_load_factor_threshold(&mut self, threshold: f64) -> Result<()> {
        config::validate_threshold(threshold)?;
        self.load_factor_threshold = threshold;
        Ok(())
    }

    /// Inspects the slot at `index`
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot<K, V>> {
        self.slots.get(index)
    }

    /// Removes every entry and tombstone, keeping the capacity
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.occupied = 0;
        self.active = 0;
    }

    /// Returns an iterator over the live entries in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter() }
    }

    /// Snapshot of the live entries in slot order
    #[must_use]
    pub fn pairs(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }

    /// Snapshot of the keys
    #[must_use]
    pub fn keys(&self) -> HashSet<K>
    where
        K: Clone + Hash + Eq,
    {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Snapshot of the values, in the same order as [`pairs`](Self::pairs)
    #[must_use]
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Returns an independent table with the same capacity, threshold and entries
    #[must_use]
    pub fn copy(&self) -> Self
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        self.clone()
    }
}

impl<K, V, S> Default for ProbingTable<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::from_parts(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD, S::default())
    }
}

impl<K, V, S> PartialEq for ProbingTable<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() &&
            self.iter().all(|(key, value)| other.get(key).is_ok_and(|theirs| theirs == value))
    }
}

impl<K, V, S> Eq for ProbingTable<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Display for ProbingTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

impl<K, V, S> fmt::Debug for ProbingTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ProbingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            if let Err(err) = self.set(key, value) {
                warn!("dropped entry while extending table: {err}");
            }
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ProbingTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

/// Iterator over the live entries of a table, in slot order
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots
    slots: std::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().find_map(Slot::entry)
    }
}

/// Owning iterator over the live entries of a table, in slot order
#[derive(Debug)]
pub struct IntoIter<K, V> {
    /// Remaining slots
    slots: std::vec::IntoIter<Slot<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().find_map(Slot::into_entry)
    }
}

impl<'a, K, V, S> IntoIterator for &'a ProbingTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for ProbingTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { slots: self.slots.into_iter() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::BuildIdentityHasher;

    /// Table whose `u64` keys start probing at `key mod capacity` and which
    /// only grows once every slot is taken
    fn identity_table(capacity: usize) -> ProbingTable<u64, &'static str, BuildIdentityHasher> {
        let config = TableConfig::default().with_capacity(capacity).with_load_factor_threshold(1.0);
        ProbingTable::with_config_and_hasher(config, BuildIdentityHasher::default()).unwrap()
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Dyn {
        Str(&'static str),
        Int(i64),
        Bool(bool),
    }

    #[test]
    fn test_new_validates_config() {
        assert!(matches!(ProbingTable::<u64, u64>::new(0), Err(TableError::InvalidConfig { .. })));
        assert!(matches!(
            ProbingTable::<u64, u64>::with_threshold(4, 0.0),
            Err(TableError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ProbingTable::<u64, u64>::with_threshold(4, 1.5),
            Err(TableError::InvalidConfig { .. })
        ));

        let table = ProbingTable::<u64, u64>::new(7).unwrap();
        assert_eq!(table.capacity(), 7);
        assert!(table.is_empty());
        assert!((0..7).all(|index| table.slot(index) == Some(&Slot::Empty)));
    }

    #[test]
    fn test_mixed_key_scenario() {
        let mut table = ProbingTable::new(10).unwrap();
        table.set(Dyn::Str("hello"), Dyn::Str("world")).unwrap();
        table.set(Dyn::Int(17), Dyn::Int(18)).unwrap();
        table.set(Dyn::Bool(true), Dyn::Bool(false)).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(&Dyn::Str("hello")), Ok(&Dyn::Str("world")));
        assert_eq!(table.get(&Dyn::Int(17)), Ok(&Dyn::Int(18)));
        assert_eq!(table.get(&Dyn::Bool(true)), Ok(&Dyn::Bool(false)));
        assert_eq!(table.get(&Dyn::Str("missing")), Err(TableError::NotFound));
    }

    #[test]
    fn test_update() {
        let mut table = ProbingTable::new(8).unwrap();
        assert_eq!(table.set("key1".to_string(), 1), Ok(None));
        assert_eq!(table.set("key1".to_string(), 10), Ok(Some(1)));
        assert_eq!(table.get("key1"), Ok(&10));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_idempotent_overwrite() {
        let mut table = identity_table(10);
        table.set(4, "four").unwrap();
        table.set(4, "four").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.occupied_count(), 1);
        assert_eq!(table.get(&4), Ok(&"four"));
    }

    #[test]
    fn test_collision_uses_next_slot() {
        let mut table = identity_table(10);
        table.set(3, "a").unwrap();
        table.set(13, "b").unwrap();

        assert_eq!(table.slot(3), Some(&Slot::Occupied(3, "a")));
        assert_eq!(table.slot(4), Some(&Slot::Occupied(13, "b")));
        assert_eq!(table.get(&3), Ok(&"a"));
        assert_eq!(table.get(&13), Ok(&"b"));
        assert_eq!(table.probe_length(&13), 2);
    }

    #[test]
    fn test_wrap_around() {
        let mut table = identity_table(10);
        table.set(8, "a").unwrap();
        table.set(9, "b").unwrap();
        table.set(18, "c").unwrap();

        assert_eq!(table.slot(8), Some(&Slot::Occupied(8, "a")));
        assert_eq!(table.slot(9), Some(&Slot::Occupied(9, "b")));
        assert_eq!(table.slot(0), Some(&Slot::Occupied(18, "c")));
        assert_eq!(table.get(&18), Ok(&"c"));
    }

    #[test]
    fn test_delete_leaves_tombstone() {
        let mut table = identity_table(10);
        table.set(3, "a").unwrap();
        table.set(13, "b").unwrap();
        table.set(23, "c").unwrap();

        assert_eq!(table.delete(&13), Ok("b"));
        assert_eq!(table.slot(4), Some(&Slot::Tombstone));
        assert_eq!(table.get(&13), Err(TableError::NotFound));
        assert_eq!(table.delete(&13), Err(TableError::NotFound));
        assert_eq!(table.len(), 2);
        assert_eq!(table.occupied_count(), 3);
        assert_eq!(table.tombstone_count(), 1);

        // 23 sits behind the tombstone and must stay reachable
        assert_eq!(table.get(&23), Ok(&"c"));
        assert_eq!(table.probe_length(&23), 3);
    }

    #[test]
    fn test_reinsert_reuses_tombstone() {
        let mut table = identity_table(10);
        table.set(3, "a").unwrap();
        table.set(13, "b").unwrap();
        table.set(23, "c").unwrap();
        table.delete(&13).unwrap();

        table.set(13, "again").unwrap();
        assert_eq!(table.slot(4), Some(&Slot::Occupied(13, "again")));
        assert_eq!(table.occupied_count(), 3);
        assert_eq!(table.tombstone_count(), 0);
        assert_eq!(table.get(&23), Ok(&"c"));

        table.delete(&3).unwrap();
        table.set(33, "d").unwrap();
        assert_eq!(table.slot(3), Some(&Slot::Occupied(33, "d")));
    }

    #[test]
    fn test_key_behind_tombstone_is_not_duplicated() {
        let mut table = identity_table(10);
        table.set(3, "a").unwrap();
        table.set(13, "b").unwrap();
        table.delete(&3).unwrap();

        // 13 already lives past the tombstone, so it must be updated in place
        assert_eq!(table.set(13, "c"), Ok(Some("b")));
        assert_eq!(table.slot(3), Some(&Slot::Tombstone));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_threshold_growth_scenario() {
        let mut table = ProbingTable::with_threshold(5, 0.4).unwrap();
        table.set("one", 1).unwrap();
        table.set("two", 2).unwrap();
        assert_eq!(table.capacity(), 5);
        assert!((table.load_factor() - 0.4).abs() < f64::EPSILON);

        table.set("three", 3).unwrap();
        assert_eq!(table.capacity(), 10);
        assert_eq!(table.get("one"), Ok(&1));
        assert_eq!(table.get("two"), Ok(&2));
        assert_eq!(table.get("three"), Ok(&3));
    }

    #[test]
    fn test_growth_drops_tombstones() {
        let config = TableConfig::default().with_capacity(4).with_load_factor_threshold(0.75);
        let mut table =
            ProbingTable::with_config_and_hasher(config, BuildIdentityHasher::default()).unwrap();
        table.set(1_u64, "a").unwrap();
        table.set(2, "b").unwrap();
        table.delete(&1).unwrap();
        table.set(3, "c").unwrap();
        assert_eq!(table.occupied_count(), 3);
        assert_eq!(table.tombstone_count(), 1);

        let mut before = table.pairs();
        table.set(4, "d").unwrap();
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.tombstone_count(), 0);
        assert_eq!(table.occupied_count(), 3);

        let mut after = table.pairs();
        after.retain(|(key, _)| *key != 4);
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn test_resize_and_rehash() {
        let mut table = identity_table(10);
        for key in 0..5 {
            table.set(key, "v").unwrap();
        }
        table.delete(&0).unwrap();
        table.delete(&1).unwrap();

        table.resize_and_rehash(3).unwrap();
        assert_eq!(table.capacity(), 3);
        assert_eq!(table.tombstone_count(), 0);
        assert_eq!(table.occupied_count(), 3);
        assert_eq!(table.slot(0), Some(&Slot::Occupied(3, "v")));
        assert_eq!(table.slot(1), Some(&Slot::Occupied(4, "v")));
        assert_eq!(table.slot(2), Some(&Slot::Occupied(2, "v")));
    }

    #[test]
    fn test_resize_below_len_is_rejected() {
        let mut table = identity_table(10);
        for key in 0..3 {
            table.set(key, "v").unwrap();
        }
        let before = table.copy();

        assert!(matches!(table.resize_and_rehash(2), Err(TableError::InvalidConfig { .. })));
        assert!(matches!(table.resize_and_rehash(0), Err(TableError::InvalidConfig { .. })));
        assert!(table.eq_with_capacity(&before));
    }

    #[test]
    fn test_full_cycle_without_room_is_table_full() {
        let mut table = identity_table(4);
        for key in 0..4 {
            table.set(key, "v").unwrap();
        }
        assert!((table.load_factor() - 1.0).abs() < f64::EPSILON);

        assert_eq!(table.write(8, "x"), Err(TableError::TableFull { capacity: 4 }));
        assert_eq!(table.len(), 4);
        assert_eq!(table.write(1, "y"), Ok(Some("v")));

        // The public path grows instead
        table.set(8, "x").unwrap();
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.get(&8), Ok(&"x"));
    }

    #[test]
    fn test_full_cycle_of_tombstones_reuses_one() {
        let mut table = identity_table(4);
        for key in 0..4 {
            table.set(key, "v").unwrap();
        }
        for key in 0..4 {
            table.delete(&key).unwrap();
        }
        assert_eq!(table.get(&2), Err(TableError::NotFound));

        assert_eq!(table.write(9, "x"), Ok(None));
        assert_eq!(table.slot(1), Some(&Slot::Occupied(9, "x")));
        assert_eq!(table.occupied_count(), 4);
    }

    #[test]
    fn test_from_entries() {
        let table = ProbingTable::from_entries(vec![("a", 1), ("b", 2), ("a", 3)], 5).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Ok(&3));

        assert!(matches!(
            ProbingTable::from_entries(vec![("a", 1), ("b", 2)], 1),
            Err(TableError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ProbingTable::<&str, i32>::from_entries(Vec::new(), 0),
            Err(TableError::InvalidConfig { .. })
        ));

        let defaulted = ProbingTable::from_entries_default((0..20).map(|i| (i, i))).unwrap();
        assert_eq!(defaulted.len(), 20);
    }

    #[test]
    fn test_from_entries_at_exact_capacity() {
        let entries = vec![(0_u64, 'a'), (3, 'b'), (6, 'c')];
        let table =
            ProbingTable::from_entries_with_hasher(entries, 3, BuildIdentityHasher::default())
                .unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.capacity() > 3);
        assert_eq!(table.get(&6), Ok(&'c'));
    }

    #[test]
    fn test_views_are_snapshots() {
        let mut table = identity_table(10);
        table.set(1, "a").unwrap();
        table.set(2, "b").unwrap();

        let keys = table.keys();
        let mut values = table.values();
        let pairs = table.pairs();
        values.push("mutated");

        table.set(3, "c").unwrap();
        table.delete(&1).unwrap();

        assert_eq!(keys, [1, 2].into_iter().collect());
        assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
        assert_eq!(table.values(), vec!["b", "c"]);
        assert_eq!(table.len(), table.pairs().len());
    }

    #[test]
    fn test_values_follow_pairs_order() {
        let table: ProbingTable<String, usize> =
            (0..30).map(|i| (format!("key-{i}"), i)).collect();
        let from_pairs: Vec<usize> = table.pairs().into_iter().map(|(_, value)| value).collect();
        assert_eq!(table.values(), from_pairs);
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let mut small = ProbingTable::new(4).unwrap();
        let mut large = ProbingTable::new(64).unwrap();
        small.set("x", 1).unwrap();
        small.set("y", 2).unwrap();
        large.set("y", 2).unwrap();
        large.set("x", 1).unwrap();

        assert_eq!(small, large);
        assert!(!small.eq_with_capacity(&large));

        large.set("x", 5).unwrap();
        assert_ne!(small, large);
        large.set("x", 1).unwrap();
        large.set("z", 3).unwrap();
        assert_ne!(small, large);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut table = ProbingTable::new(10).unwrap();
        table.set("a".to_string(), vec![1]).unwrap();

        let mut copied = table.copy();
        assert!(copied.eq_with_capacity(&table));

        copied.get_mut("a").unwrap().push(2);
        copied.set("b".to_string(), vec![]).unwrap();
        assert_eq!(table.get("a"), Ok(&vec![1]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut table = identity_table(10);
        table.set(7, "seven").unwrap();
        table.set(2, "two").unwrap();
        table.set(5, "five").unwrap();

        let first: Vec<_> = table.iter().collect();
        let second: Vec<_> = (&table).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![(&2, &"two"), (&5, &"five"), (&7, &"seven")]);

        let owned: Vec<_> = table.into_iter().collect();
        assert_eq!(owned, vec![(2, "two"), (5, "five"), (7, "seven")]);
    }

    #[test]
    fn test_display() {
        let mut table = identity_table(10);
        assert_eq!(table.to_string(), "{}");

        table.set(2, "b").unwrap();
        table.set(1, "a").unwrap();
        assert_eq!(table.to_string(), "{1: a, 2: b}");
        assert_eq!(format!("{table:?}"), "{1: \"a\", 2: \"b\"}");
    }

    #[test]
    fn test_clear_and_threshold() {
        let mut table = identity_table(4);
        table.set(1, "a").unwrap();
        table.delete(&1).unwrap();
        table.clear();
        assert_eq!(table.occupied_count(), 0);
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.slot(1), Some(&Slot::Empty));

        assert!(table.set_load_factor_threshold(0.0).is_err());
        assert!((table.load_factor_threshold() - 1.0).abs() < f64::EPSILON);
        table.set_load_factor_threshold(0.5).unwrap();
        table.set(1, "a").unwrap();
        table.set(2, "b").unwrap();
        table.set(3, "c").unwrap();
        assert_eq!(table.capacity(), 8);
    }

    #[test]
    fn test_contains_key_and_extend() {
        let mut table: ProbingTable<&str, i32> = ProbingTable::default();
        table.extend([("a", 1), ("b", 2)]);
        assert!(table.contains_key("a"));
        assert!(!table.contains_key("c"));
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);
    }
}
