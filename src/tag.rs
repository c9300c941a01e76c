//! Type tags for profiler descriptors.
//!
//! Profiler entries describe handlers and decoders with compact, reproducible
//! strings such as `CallbackQueryHandler<string>` or
//! `CallbackResponseDecoder<string, string>`. The angle-bracketed parts are
//! *type tags* derived from the JSON shape of a response value, never from
//! the payload itself.

use serde_json::Value;

/// Returns the type tag of a JSON value.
///
/// Tags are stable across runs and releases, so tests may compare profiler
/// descriptors by string equality.
pub fn value_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strips the module path from a fully qualified type name.
///
/// `std::any::type_name` yields paths like `my_crate::handler::EchoHandler`;
/// profiler descriptors only carry the final segment (`EchoHandler`).
pub fn short_type_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}
