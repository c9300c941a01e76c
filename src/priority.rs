//! Priority-ordered registries for handlers and decoders.
//!
//! Both dispatchers keep one sorted list per role. Items are evaluated in
//! priority-descending order; ties keep their insertion order (stable sort),
//! and the same item may be registered twice - both entries are evaluated.
//!
//! # Example
//!
//! ```
//! use cqrs_dispatch::priority::{PrioritizedItem, PrioritizedRegistry, PRIORITY_HIGH};
//!
//! let mut registry = PrioritizedRegistry::new();
//! registry.add("fallback");                              // default priority
//! registry.add(("preferred", PRIORITY_HIGH));            // (item, priority) pair
//! registry.add(PrioritizedItem::new("explicit", 60));    // pre-built item
//!
//! let order: Vec<&str> = registry.iter().copied().collect();
//! assert_eq!(order, vec!["preferred", "explicit", "fallback"]);
//! ```

/// Evaluated before everything else, including the built-in cache handler.
pub const PRIORITY_HIGHEST: i32 = 100;
/// Priority of the built-in cache-read handler.
pub const PRIORITY_HIGH: i32 = 80;
/// Default priority for registered handlers and decoders.
pub const PRIORITY_MEDIUM: i32 = 50;
/// Evaluated after the defaults.
pub const PRIORITY_LOW: i32 = 20;
/// Last resort.
pub const PRIORITY_LOWEST: i32 = 0;

/// Pairs an item with an `i32` priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritizedItem<T> {
    item: T,
    priority: i32,
}

impl<T> PrioritizedItem<T> {
    /// Create a new prioritized item.
    pub fn new(item: T, priority: i32) -> Self {
        Self { item, priority }
    }

    /// The wrapped item.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Consume the pair, returning the item.
    pub fn into_item(self) -> T {
        self.item
    }

    /// The assigned priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

impl<T> From<T> for PrioritizedItem<T> {
    /// A bare item gets the default priority.
    fn from(item: T) -> Self {
        Self::new(item, PRIORITY_MEDIUM)
    }
}

impl<T> From<(T, i32)> for PrioritizedItem<T> {
    fn from((item, priority): (T, i32)) -> Self {
        Self::new(item, priority)
    }
}

/// One sorted list of (item, priority) pairs.
///
/// Invariant: after every insertion the collection is sorted by priority
/// descending; equal priorities retain relative insertion order.
pub struct PrioritizedRegistry<T> {
    items: Vec<PrioritizedItem<T>>,
}

impl<T> PrioritizedRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Register an item.
    ///
    /// Accepts a bare item (default priority), an `(item, priority)` pair or
    /// a pre-built [`PrioritizedItem`]; all three normalize to the same
    /// representation before insertion. No duplicate detection is performed.
    pub fn add(&mut self, item: impl Into<PrioritizedItem<T>>) {
        self.items.push(item.into());
        // Vec::sort_by is stable, so ties keep insertion order.
        self.items.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Iterate items in priority-descending order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(PrioritizedItem::item)
    }

    /// Iterate (item, priority) pairs in priority-descending order.
    pub fn entries(&self) -> impl Iterator<Item = &PrioritizedItem<T>> {
        self.items.iter()
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> PrioritizedRegistry<T> {
    /// Copy the current ordering into an owned list.
    ///
    /// Dispatch snapshots the registry before iterating so a reentrant
    /// dispatch call can register items without invalidating the iteration.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Copy the current ordering, excluding items failing the predicate.
    pub fn to_vec_filtered(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        self.iter().filter(|item| filter(item)).cloned().collect()
    }
}

impl<T> Default for PrioritizedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
