//! Dispatch internals shared by the query and command dispatchers.
//!
//! The pipeline for both sides is: prepare supporting handlers, start the
//! profile, resolve the first supporting handler, decode the response,
//! finish the profile. The query side adds cache read/write around it.

mod context;
mod decode;

pub(crate) use context::DispatchContext;
pub(crate) use decode::{decode_response, ImpureCacheHook, NoImpureCache};

use serde_json::{json, Value};
use uuid::Uuid;

use crate::profiler::{ItemType, ProfilerBag, ProfilerItem, Verbosity};

/// Record one pipeline step at the bag's current verbosity.
///
/// Exactly one of the two step builders runs: `verbose` (type tags only)
/// at verbose, `debug` (raw values) at debug, neither at normal. The
/// builders are closures so step payloads are never built when nobody
/// records them.
pub(crate) fn record_step(
    bag: Option<&ProfilerBag>,
    key: &Uuid,
    verbose: impl FnOnce() -> Value,
    debug: impl FnOnce() -> Value,
) {
    if let Some(bag) = bag {
        match bag.verbosity() {
            Verbosity::Normal => {}
            Verbosity::Verbose => bag.verbose_step(key, verbose),
            Verbosity::Debug => bag.debug_step(key, debug),
        }
    }
}

/// Record a step that only exists at debug verbosity.
pub(crate) fn record_debug_step(
    bag: Option<&ProfilerBag>,
    key: &Uuid,
    step: impl FnOnce() -> Value,
) {
    if let Some(bag) = bag {
        bag.debug_step(key, step);
    }
}

/// Open a profiler item for this dispatch, when the request opts in.
pub(crate) fn start_profile(
    bag: Option<&ProfilerBag>,
    ctx: &mut DispatchContext<'_>,
    item_type: ItemType,
) {
    let Some(bag) = bag else { return };
    let Some(profileable) = ctx.initiator().as_profileable() else {
        return;
    };

    let mut item = ProfilerItem::new(
        profileable.profiler_id().to_string(),
        item_type,
        ctx.initiator().name(),
        profileable.profiler_data(),
    );

    if let Some(cacheable) = ctx.initiator().as_cacheable() {
        item.set_cache_key(cacheable.cache_key());
        item.set_is_stored_in_cache(false, None);
    }

    bag.add(*ctx.key(), item);
    ctx.start_stopwatch();
}

/// Record the "handled by" step once a handler claims the dispatch.
pub(crate) fn record_handled_step(bag: Option<&ProfilerBag>, ctx: &DispatchContext<'_>) {
    let Some(handler) = ctx.used_handler() else {
        return;
    };
    let name = handler.name;

    record_step(
        bag,
        ctx.key(),
        || json!({ "handled by": name, "response": ctx.handled_response_type() }),
        || {
            let raw = match (ctx.response(), ctx.error()) {
                (Some(response), _) => response.clone(),
                (None, Some(error)) => Value::String(error.to_string()),
                (None, None) => Value::Null,
            };
            json!({ "handled by": name, "response": raw })
        },
    );
}

/// Close this dispatch's profiler item: timing, handler and decoder
/// descriptors, cache flags, final response or error.
pub(crate) fn finish_profile(bag: Option<&ProfilerBag>, ctx: &DispatchContext<'_>) {
    let Some(bag) = bag else { return };
    let Some(handler) = ctx.used_handler() else {
        return;
    };

    let handled_by = format!("{}<{}>", handler.name, ctx.handled_response_type());
    let is_cache_read = handler.is_cache_read;

    bag.update(ctx.key(), |item| {
        if let Some(elapsed) = ctx.elapsed_ms() {
            item.set_duration_ms(elapsed);
        }

        item.set_handled_by(handled_by);
        for descriptor in ctx.used_decoders() {
            item.add_decoded_by(descriptor.clone());
        }

        if let Some(cacheable) = ctx.initiator().as_cacheable() {
            item.set_cache_key(cacheable.cache_key());
            item.set_is_loaded_from_cache(is_cache_read);
        }

        if let Some(response) = ctx.response() {
            item.set_response(response.clone());
        }
        if let Some(error) = ctx.error() {
            item.set_error(error.to_string());
        }
    });
}
