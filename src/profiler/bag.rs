//! Shared, insertion-ordered collection of profiler items.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use crate::profiler::{ProfilerItem, Verbosity, DEBUG_BUCKET, VERBOSE_BUCKET};

/// Items in insertion order plus a key index for O(1) per-step updates.
/// Items are never removed, so indices stay valid for the bag's lifetime.
#[derive(Default)]
struct Entries {
    ordered: Vec<(Uuid, ProfilerItem)>,
    index: HashMap<Uuid, usize>,
}

/// Insertion-ordered bag of [`ProfilerItem`]s keyed by dispatch id.
///
/// Shared between dispatchers and consumers behind an `Arc`; all access
/// goes through an internal mutex, so nested dispatches (a decoder
/// reentering the dispatcher) interleave safely.
pub struct ProfilerBag {
    items: Mutex<Entries>,
    verbosity: Mutex<Verbosity>,
}

impl ProfilerBag {
    /// Create an empty bag at [`Verbosity::Normal`].
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Entries::default()),
            verbosity: Mutex::new(Verbosity::Normal),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current verbosity. Read fresh before every recorded step.
    pub fn verbosity(&self) -> Verbosity {
        *self
            .verbosity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the verbosity; takes effect for the next recorded step.
    pub fn set_verbosity(&self, verbosity: Verbosity) {
        *self
            .verbosity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = verbosity;
    }

    /// Number of items in the bag.
    pub fn len(&self) -> usize {
        self.lock().ordered.len()
    }

    /// True when no dispatch has been profiled yet.
    pub fn is_empty(&self) -> bool {
        self.lock().ordered.is_empty()
    }

    /// Snapshot of all items in insertion order.
    pub fn items(&self) -> Vec<(Uuid, ProfilerItem)> {
        self.lock().ordered.clone()
    }

    /// The most recently added item.
    pub fn last(&self) -> Option<ProfilerItem> {
        self.lock().ordered.last().map(|(_, item)| item.clone())
    }

    /// The item for the given dispatch id.
    pub fn get(&self, key: &Uuid) -> Option<ProfilerItem> {
        let entries = self.lock();
        entries
            .index
            .get(key)
            .map(|&pos| entries.ordered[pos].1.clone())
    }

    pub(crate) fn add(&self, key: Uuid, item: ProfilerItem) {
        let mut entries = self.lock();
        let pos = entries.ordered.len();
        entries.index.insert(key, pos);
        entries.ordered.push((key, item));
    }

    pub(crate) fn update(&self, key: &Uuid, update: impl FnOnce(&mut ProfilerItem)) {
        let mut guard = self.lock();
        let entries = &mut *guard;
        if let Some(&pos) = entries.index.get(key) {
            update(&mut entries.ordered[pos].1);
        }
    }

    pub(crate) fn update_all(&self, mut update: impl FnMut(&mut ProfilerItem)) {
        for (_, item) in self.lock().ordered.iter_mut() {
            update(item);
        }
    }

    /// Append a step to the item's `cqrs.verbose` bucket. Records only at
    /// exactly [`Verbosity::Verbose`]; at debug the richer debug step is
    /// recorded instead, so the buckets never duplicate each other.
    pub(crate) fn verbose_step(&self, key: &Uuid, step: impl FnOnce() -> Value) {
        if self.verbosity() == Verbosity::Verbose {
            self.update(key, |item| item.push_step(VERBOSE_BUCKET, step()));
        }
    }

    /// Append a step to the item's `cqrs.debug` bucket, if verbosity is
    /// debug.
    pub(crate) fn debug_step(&self, key: &Uuid, step: impl FnOnce() -> Value) {
        if self.verbosity().is_debug() {
            self.update(key, |item| item.push_step(DEBUG_BUCKET, step()));
        }
    }
}

impl Default for ProfilerBag {
    fn default() -> Self {
        Self::new()
    }
}
