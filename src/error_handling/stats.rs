//! Per-run error and info counters.
//!
//! Record tasks bump these concurrently; the end-of-run statistics read them
//! once every task has finished.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType};

/// One atomic counter per variant of `K`, all created up front.
struct CounterTable<K> {
    counters: HashMap<K, AtomicUsize>,
}

impl<K> CounterTable<K>
where
    K: IntoEnumIterator + Eq + Hash + Copy + std::fmt::Debug,
{
    fn new() -> Self {
        Self {
            counters: K::iter().map(|key| (key, AtomicUsize::new(0))).collect(),
        }
    }

    fn bump(&self, key: K) {
        match self.counters.get(&key) {
            Some(counter) => {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            None => log::error!("No counter registered for {:?}", key),
        }
    }

    fn get(&self, key: K) -> usize {
        self.counters
            .get(&key)
            .map_or(0, |counter| counter.load(Ordering::SeqCst))
    }

    fn sum(&self) -> usize {
        K::iter().map(|key| self.get(key)).sum()
    }
}

/// Error and info counts for one export run.
///
/// Errors are records that were skipped. Info entries are events worth
/// reporting that did not stop a record from being written, such as a stale
/// `original.jpg` being removed.
pub struct ProcessingStats {
    errors: CounterTable<ErrorType>,
    info: CounterTable<InfoType>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        ProcessingStats {
            errors: CounterTable::new(),
            info: CounterTable::new(),
        }
    }

    pub fn increment_error(&self, error: ErrorType) {
        self.errors.bump(error);
    }

    pub fn increment_info(&self, info_type: InfoType) {
        self.info.bump(info_type);
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors.get(error)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info.get(info_type)
    }

    /// Records skipped for any reason.
    pub fn total_errors(&self) -> usize {
        self.errors.sum()
    }

    pub fn total_info(&self) -> usize {
        self.info.sum()
    }
}
