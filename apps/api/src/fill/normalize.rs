//! Value normalizer. Turns stored values into strings that are safe to write
//! into a form control. Never fails: anything that cannot be rendered becomes "".

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::models::FieldValue;

static ADDRESS_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"地址|住址|(?i)address").expect("invalid address key regex"));

static ID_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"身份证|(?i)id").expect("invalid id key regex"));

/// Address sub-parts, in assembly order.
const ADDRESS_PARTS: &[&str] = &[
    "province", "city", "district", "street", "detail", "addr", "address",
];
const ID_PARTS: &[&str] = &["number", "id", "code"];
const GENERIC_PARTS: &[&str] = &["value", "name", "text", "label"];

/// Stringifies `raw` for the canonical key `key` (may be empty).
///
/// Strings, numbers and booleans pass through; dates become `YYYY-MM-DD`;
/// objects are composed per key family; lists are flattened and space-joined.
pub fn normalize(key: &str, raw: &FieldValue) -> String {
    match raw {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        FieldValue::Object(map) => normalize_object(key, map),
        FieldValue::List(items) => items
            .iter()
            .map(|item| normalize(key, item))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn normalize_object(key: &str, map: &IndexMap<String, FieldValue>) -> String {
    if ADDRESS_KEY.is_match(key) {
        let parts: Vec<String> = ADDRESS_PARTS
            .iter()
            .filter_map(|part| map.get(*part))
            .filter(|v| v.is_present())
            .map(|v| normalize("", v))
            .filter(|s| !s.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
    }

    if ID_KEY.is_match(key) {
        return first_present(map, ID_PARTS).unwrap_or_default();
    }

    first_present(map, GENERIC_PARTS).unwrap_or_else(|| serialize_lossless(map))
}

fn first_present(map: &IndexMap<String, FieldValue>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| v.is_present())
        .map(|v| normalize("", v))
        .filter(|s| !s.is_empty())
}

fn serialize_lossless(map: &IndexMap<String, FieldValue>) -> String {
    if map.is_empty() {
        return String::new();
    }
    serde_json::to_string(map).unwrap_or_default()
}

/// Key-agnostic stringifier applied at the point of writing into the page.
///
/// Repeats the normalizer's guarantees so a structured value can never reach a
/// form control as an opaque placeholder, even if normalization was skipped.
pub fn safe_string(value: &FieldValue) -> String {
    match value {
        FieldValue::List(items) => items
            .iter()
            .map(safe_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        FieldValue::Object(map) => {
            const PREFERRED: &[&str] = &["value", "name", "text", "label", "number", "id", "code"];
            first_present(map, PREFERRED).unwrap_or_else(|| serialize_lossless(map))
        }
        other => normalize("", other),
    }
}
