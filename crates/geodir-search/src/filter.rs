//! Category and free-text filtering.
//!
//! A record is visible when its category is active and its normalized
//! searchable text contains every search token. Multi-word queries narrow
//! results (AND), they never broaden them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::tokenize;
use crate::record::{Category, Record, RecordId};
use crate::store::RecordStore;

/// How a category toggle changes the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    /// Keep only the toggled category
    #[default]
    Exclusive,
    /// Flip the toggled category, keeping the others
    Additive,
}

/// Active categories and search tokens.
///
/// The active set is never empty while categories exist: any transition
/// that would empty it restores every category instead.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    all: Vec<Category>,
    active: HashSet<Category>,
    tokens: Vec<String>,
}

impl FilterState {
    /// All categories active, no search tokens.
    pub fn new<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let all: Vec<Category> = categories.into_iter().collect();
        let active = all.iter().cloned().collect();
        Self {
            all,
            active,
            tokens: Vec::new(),
        }
    }

    /// Every known category, in store order.
    pub fn all_categories(&self) -> &[Category] {
        &self.all
    }

    pub fn active_categories(&self) -> &HashSet<Category> {
        &self.active
    }

    pub fn is_active(&self, category: &Category) -> bool {
        self.active.contains(category)
    }

    /// Whether no category is filtered out.
    pub fn all_active(&self) -> bool {
        self.active.len() == self.all.len()
    }

    /// Normalized search tokens, in query order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Replace the search tokens from a raw query. Returns whether they changed.
    pub fn set_query(&mut self, raw: &str) -> bool {
        let tokens = tokenize(raw);
        if tokens == self.tokens {
            return false;
        }
        self.tokens = tokens;
        true
    }

    /// Apply a category toggle. Unknown categories are ignored.
    ///
    /// Returns whether the active set changed.
    pub fn toggle(&mut self, category: &Category, mode: ToggleMode) -> bool {
        if !self.all.contains(category) {
            return false;
        }
        let before = self.active.clone();

        match mode {
            ToggleMode::Exclusive => {
                self.active.clear();
                self.active.insert(category.clone());
            }
            ToggleMode::Additive => {
                if !self.active.remove(category) {
                    self.active.insert(category.clone());
                }
            }
        }

        if self.active.is_empty() {
            self.activate_all();
        }
        self.active != before
    }

    /// Back to all categories and no tokens.
    pub fn reset(&mut self) {
        self.activate_all();
        self.tokens.clear();
    }

    fn activate_all(&mut self) {
        self.active = self.all.iter().cloned().collect();
    }
}

/// Whether `record` passes the category gate and every search token.
pub fn matches(record: &Record, state: &FilterState) -> bool {
    if !state.is_active(record.category()) {
        return false;
    }
    let haystack = record.haystack();
    state.tokens().iter().all(|token| haystack.contains(token.as_str()))
}

/// Ids of all matching records, in store order.
pub fn filter(store: &RecordStore, state: &FilterState) -> Vec<RecordId> {
    store
        .iter()
        .filter(|(_, record)| matches(record, state))
        .map(|(id, _)| id)
        .collect()
}
