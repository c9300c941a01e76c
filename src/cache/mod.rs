//! Cache module - key hashing, TTL values and the store contract.
//!
//! The dispatcher treats the cache as an external key/value store with TTL:
//! keys are pre-hashed strings (see [`CacheKey`]), values are JSON, and the
//! store owns expiry enforcement. [`InMemoryCacheStore`] is the bundled
//! reference implementation.

mod key;
mod store;

pub use key::{CacheKey, CacheTime};
pub use store::{CacheStore, InMemoryCacheStore};
