//! Cache key derivation.
//!
//! A key is `<prefix>:<canonical JSON of the request parameters>`. Object keys
//! are sorted at every depth, so two bags holding the same values produce the
//! same key no matter how they were built.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

// == Key Params ==
/// Parameter bag for a cached read: query string plus path parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyParams {
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

impl KeyParams {
    pub fn new(query: BTreeMap<String, String>, params: BTreeMap<String, String>) -> Self {
        Self { query, params }
    }
}

// == Generate Key ==
/// Builds the cache key for `prefix` and any serializable parameter bag.
///
/// A bag that cannot be serialized encodes as `null`.
pub fn generate_key<P: Serialize + ?Sized>(prefix: &str, params: &P) -> String {
    let value = serde_json::to_value(params).unwrap_or(Value::Null);

    let mut key = String::with_capacity(prefix.len() + 64);
    key.push_str(prefix);
    key.push(':');
    write_canonical(&mut key, &value);
    key
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, k);
                out.push(':');
                write_canonical(out, v);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::String(s) => write_string(out, s),
        // Scalars already have a single JSON spelling
        other => {
            let _ = write!(out, "{}", other);
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    // Value's Display performs JSON string escaping
    let _ = write!(out, "{}", Value::String(s.to_string()));
}
