//! In-memory record store.

use std::collections::HashSet;

use crate::record::{Category, Record, RecordId};

/// Ordered, immutable collection of records.
///
/// Record ids are positions in insertion order and never change. The store
/// also remembers every category in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    categories: Vec<Category>,
}

impl RecordStore {
    /// Create a store from records in their final order.
    pub fn new(records: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let categories = records
            .iter()
            .map(Record::category)
            .filter(|c| seen.insert(*c))
            .cloned()
            .collect();

        Self {
            records,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by id.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.0)
    }

    /// All records with their ids, in store order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RecordId(i), record))
    }

    /// All record ids, in store order.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> {
        (0..self.records.len()).map(RecordId)
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
