// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Parsing helpers shared by the projector and the aggregator.

use serde_json::Value;

/// Drops a transport key prefixed to a line.
///
/// Streaming transports may deliver `key\tpayload` where only the payload is
/// meaningful. Everything up to and including the first tab is discarded; a line
/// without a tab is returned unchanged.
///
/// # Examples
///
/// ```
/// use leaderboard::util::strip_transport_key;
///
/// assert_eq!(strip_transport_key("17\t{\"a\":1}"), "{\"a\":1}");
/// assert_eq!(strip_transport_key("{\"a\":1}"), "{\"a\":1}");
/// ```
pub fn strip_transport_key(line: &str) -> &str {
    match line.split_once('\t') {
        Some((_, payload)) => payload,
        None => line,
    }
}

/// Characters that delimit keys, payloads and lines in the record formats.
const RESERVED_KEY_CHARS: [char; 4] = ['\t', '\n', '\r', ','];

/// Whether `key` can be written as a record key without breaking the line format.
///
/// A key must be non-empty and free of tabs, line breaks and commas.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(&RESERVED_KEY_CHARS[..])
}

/// Loose truthiness of a JSON value.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Coerces a JSON value to a non-negative integer, falling back to 0.
///
/// Floats are truncated toward zero, numeric strings are parsed, negatives and
/// anything non-numeric become 0.
pub fn lenient_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f > 0.0 {
                    // `as` saturates at u64::MAX
                    f.trunc() as u64
                } else {
                    0
                }
            } else {
                0
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f > 0.0)
                        .map(|f| f.trunc() as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}
