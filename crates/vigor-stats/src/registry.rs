//! Stat lookup surface
//!
//! Hosts keep their stats and vitals behind integer keys; gameplay and UI
//! code only needs a way to resolve a key to a live handle. The trait is
//! the contract, [`StatTable`] the obvious implementation.

use std::collections::HashMap;

use vigor_core::StatKey;

use crate::{Stat, Vital};

/// Lookup capability a host exposes to gameplay and UI code.
pub trait StatRegistry {
    /// Resolve a key to its stat, if registered.
    fn stat(&self, key: StatKey) -> Option<&Stat>;

    /// Resolve a key to its vital, if registered.
    fn vital(&self, key: StatKey) -> Option<&Vital>;
}

/// HashMap-backed registry, one slot per key.
#[derive(Default)]
pub struct StatTable {
    stats: HashMap<StatKey, Stat>,
    vitals: HashMap<StatKey, Vital>,
}

impl StatTable {
    pub fn new() -> Self {
        StatTable::default()
    }

    /// Register a stat under `key`, replacing any previous entry.
    pub fn insert_stat(&mut self, key: StatKey, stat: Stat) {
        self.stats.insert(key, stat);
    }

    /// Register a vital under `key`, replacing any previous entry.
    pub fn insert_vital(&mut self, key: StatKey, vital: Vital) {
        self.vitals.insert(key, vital);
    }

    pub fn remove_stat(&mut self, key: StatKey) -> Option<Stat> {
        self.stats.remove(&key)
    }

    pub fn remove_vital(&mut self, key: StatKey) -> Option<Vital> {
        self.vitals.remove(&key)
    }

    pub fn stat_count(&self) -> usize {
        self.stats.len()
    }

    pub fn vital_count(&self) -> usize {
        self.vitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty() && self.vitals.is_empty()
    }

    /// Iterate over registered stats.
    pub fn iter_stats(&self) -> impl Iterator<Item = (&StatKey, &Stat)> {
        self.stats.iter()
    }

    /// Iterate over registered vitals.
    pub fn iter_vitals(&self) -> impl Iterator<Item = (&StatKey, &Vital)> {
        self.vitals.iter()
    }
}

impl StatRegistry for StatTable {
    fn stat(&self, key: StatKey) -> Option<&Stat> {
        self.stats.get(&key)
    }

    fn vital(&self, key: StatKey) -> Option<&Vital> {
        self.vitals.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRENGTH: StatKey = StatKey(1);
    const HEALTH: StatKey = StatKey(2);

    #[test]
    fn test_table_resolves_registered_handles() {
        let mut table = StatTable::new();
        let strength = Stat::new(10.0);
        let health = Vital::new(&Stat::new(100.0), 0.0, 100.0);

        table.insert_stat(STRENGTH, strength.clone());
        table.insert_vital(HEALTH, health);

        assert_eq!(table.stat(STRENGTH).unwrap().value(), 10.0);
        assert_eq!(table.vital(HEALTH).unwrap().value(), 100.0);
        assert!(table.stat(HEALTH).is_none());

        // Handles resolve to the same attribute the host mutates.
        strength.set_base_value(12.0);
        assert_eq!(table.stat(STRENGTH).unwrap().value(), 12.0);
    }

    #[test]
    fn test_table_remove_and_counts() {
        let mut table = StatTable::new();
        assert!(table.is_empty());

        table.insert_stat(STRENGTH, Stat::new(10.0));
        assert_eq!(table.stat_count(), 1);

        assert!(table.remove_stat(STRENGTH).is_some());
        assert!(table.remove_stat(STRENGTH).is_none());
        assert!(table.is_empty());
    }
}
