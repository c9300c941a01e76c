//! The decode chain.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::decoder::{Decoded, ResponseDecoder};
use crate::dispatch::context::DispatchContext;
use crate::dispatch::{record_debug_step, record_step};
use crate::profiler::ProfilerBag;
use crate::tag::value_tag;

/// Cache write performed before an impure decoder runs.
///
/// The query dispatcher caches the pre-decode response here so the store
/// never holds an impure transformation; the command side has no cache and
/// plugs in [`NoImpureCache`].
pub(crate) trait ImpureCacheHook {
    fn cache_before_impure_decode(&self, ctx: &mut DispatchContext<'_>, current: &Value);
}

/// No-op hook for dispatchers without a cache.
pub(crate) struct NoImpureCache;

impl ImpureCacheHook for NoImpureCache {
    fn cache_before_impure_decode(&self, _ctx: &mut DispatchContext<'_>, _current: &Value) {}
}

/// Run the handled response through the decoder chain.
///
/// Decoders are visited in priority-descending order; each supporting
/// decoder transforms the current value, and [`Decoded::Final`] stops the
/// chain immediately. Errors are never decoded (the context carries no
/// response then).
pub(crate) fn decode_response(
    ctx: &mut DispatchContext<'_>,
    decoders: &[Arc<dyn ResponseDecoder>],
    bag: Option<&ProfilerBag>,
    impure_cache: &dyn ImpureCacheHook,
) {
    let Some(mut current) = ctx.take_response() else {
        return;
    };

    record_step(
        bag,
        ctx.key(),
        || json!({ "start decoding response": value_tag(&current) }),
        || json!({ "start decoding response": value_tag(&current) }),
    );

    for (index, decoder) in decoders.iter().enumerate() {
        let name = decoder.name();

        record_debug_step(bag, ctx.key(), || {
            json!({ "loop": index, "trying decoder": name })
        });

        if !decoder.supports(&current, ctx.initiator()) {
            continue;
        }

        record_debug_step(bag, ctx.key(), || {
            json!({ "loop": index, "decoder": name, "supports response": value_tag(&current) })
        });

        if decoder.is_impure() && ctx.initiator().as_cacheable().is_some() {
            record_debug_step(bag, ctx.key(), || {
                json!({ "impure decoder": name, "try cache response before decoding": current })
            });

            impure_cache.cache_before_impure_decode(ctx, &current);
            ctx.set_already_cached();
        }

        let input_tag = value_tag(&current);
        // Raw input only survives the decode for the debug trace.
        let raw_input = match bag {
            Some(bag) if bag.verbosity().is_debug() => Some(current.clone()),
            _ => None,
        };
        let decoded = decoder.decode(current);
        let is_final = matches!(decoded, Decoded::Final(_));
        let output = decoded.into_value();
        let output_tag = value_tag(&output);

        ctx.add_used_decoder(if is_final {
            format!("{name}<{input_tag}, Final<{output_tag}>>")
        } else {
            format!("{name}<{input_tag}, {output_tag}>")
        });

        record_step(
            bag,
            ctx.key(),
            || {
                json!({
                    "loop": index,
                    "decoder": name,
                    "response": input_tag,
                    "decoded response": output_tag,
                })
            },
            || {
                json!({
                    "loop": index,
                    "decoder": name,
                    "response": raw_input,
                    "decoded response": output,
                })
            },
        );

        current = output;
        if is_final {
            break;
        }
    }

    ctx.set_response(current);
}
