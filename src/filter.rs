//! Selection filters over crack records.
//!
//! Filters only ever touch the `selected` flag. Positive filters are additive:
//! chaining them ORs their matches, so a composite selection is built with
//! `select_none` followed by any number of positive filters.

use serde::{Deserialize, Serialize};

use crate::store::CrackStore;

/// Inclusive range of formation cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRange {
    pub min: u64,
    pub max: u64,
}

impl CycleRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, cycle: u64) -> bool {
        cycle >= self.min && cycle <= self.max
    }
}

/// A selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrackFilter {
    None,
    All,
    Cycles(CycleRange),
}

impl CrackFilter {
    pub fn apply(&self, store: &mut CrackStore) {
        match self {
            CrackFilter::None => select_none(store),
            CrackFilter::All => select_all(store),
            CrackFilter::Cycles(range) => select_by_cycle_range(store, range.min, range.max),
        }
    }
}

pub fn select_none(store: &mut CrackStore) {
    for record in store.records_mut() {
        record.selected = false;
    }
}

pub fn select_all(store: &mut CrackStore) {
    for record in store.records_mut() {
        record.selected = true;
    }
}

/// Select records formed in `[min_cycle, max_cycle]`. Never clears a flag.
pub fn select_by_cycle_range(store: &mut CrackStore, min_cycle: u64, max_cycle: u64) {
    let range = CycleRange::new(min_cycle, max_cycle);
    for record in store.records_mut() {
        if range.contains(record.formation_cycle) {
            record.selected = true;
        }
    }
}
