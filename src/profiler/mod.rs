//! Profiler module - per-dispatch observability.
//!
//! Every dispatch through a profileable request appends one
//! [`ProfilerItem`] to the shared [`ProfilerBag`]. The bag's
//! [`Verbosity`] controls how much detail the dispatchers record:
//!
//! - [`Verbosity::Normal`] - the item itself (timing, handler, decoders,
//!   cache flags, response, error), nothing more.
//! - [`Verbosity::Verbose`] - additionally records coarse pipeline steps
//!   with response *type tags* under the `cqrs.verbose` bucket.
//! - [`Verbosity::Debug`] - additionally records fine-grained steps with
//!   *raw values* under the `cqrs.debug` bucket.
//!
//! Verbosity is read fresh before each step, so flipping it mid-dispatch
//! takes effect immediately.

mod bag;
mod item;

use serde::Serialize;

pub use bag::ProfilerBag;
pub use item::{ItemType, ProfilerItem};

/// Additional-data bucket for verbose steps.
pub const VERBOSE_BUCKET: &str = "cqrs.verbose";

/// Additional-data bucket for debug steps.
pub const DEBUG_BUCKET: &str = "cqrs.debug";

/// How much pipeline detail the dispatchers record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Profiler items only.
    Normal,
    /// Items plus coarse steps with response type tags.
    Verbose,
    /// Items plus fine-grained steps with raw values.
    Debug,
}

impl Verbosity {
    /// True for `Verbose` and `Debug`.
    pub fn is_verbose(&self) -> bool {
        *self >= Verbosity::Verbose
    }

    /// True for `Debug` only.
    pub fn is_debug(&self) -> bool {
        *self == Verbosity::Debug
    }
}
