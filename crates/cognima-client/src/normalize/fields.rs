//! JSON field access shared by the normalization tables.
//!
//! Every accessor returns `None` for absent, `null` or empty values so that
//! missing provider fields stay explicitly absent.

use cognima_core::{RetrievalError, RetrievalResult};
use serde_json::Value;

/// Follow a dotted path such as `data.media` or `choices.0.message`.
///
/// An empty path returns `root`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(segment),
        _ => None,
    })
    .filter(|value| !value.is_null())
}

/// Like [`lookup`], but a missing value is a normalization error naming `path`.
pub fn require<'a>(root: &'a Value, path: &str) -> RetrievalResult<&'a Value> {
    lookup(root, path).ok_or_else(|| RetrievalError::normalization(path))
}

/// First of `keys` holding text. Numbers are rendered as text (`720` → `"720"`).
pub fn first_str(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match lookup(obj, key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First of `keys` holding a non-negative whole number, as a number or numeric string.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // whole, non-negative, finite
pub fn first_u64(obj: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| match lookup(obj, key)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// [`first_u64`] narrowed to `u32`.
pub fn first_u32(obj: &Value, keys: &[&str]) -> Option<u32> {
    first_u64(obj, keys).and_then(|n| u32::try_from(n).ok())
}

/// First of `keys` holding a number, possibly fractional.
pub fn first_f64(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match lookup(obj, key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First of `keys` holding a non-negative number, rounded to the nearest whole.
///
/// Bitrates arrive fractional (`"abr": 129.478`) from yt-dlp style listings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked
pub fn first_rounded_u32(obj: &Value, keys: &[&str]) -> Option<u32> {
    first_f64(obj, keys)
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f.round() as u32)
}

/// First of `keys` holding a boolean.
pub fn first_bool(obj: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| lookup(obj, key)?.as_bool())
}

/// Names from the first of `keys` that holds a string, a list of strings,
/// or a list of `{ "name": ... }` objects.
pub fn string_list(obj: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| match lookup(obj, key)? {
            Value::String(s) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
            Value::Array(items) => {
                let names: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.trim().to_string()),
                        other => first_str(other, &["name"]),
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                (!names.is_empty()).then_some(names)
            }
            Value::Object(_) => first_str(lookup(obj, key)?, &["name"]).map(|n| vec![n]),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_walks_objects_and_arrays() {
        let doc = json!({"data": {"choices": [{"message": {"content": "hi"}}]}});
        assert_eq!(
            lookup(&doc, "data.choices.0.message.content"),
            Some(&json!("hi"))
        );
        assert!(lookup(&doc, "data.choices.3").is_none());
        assert!(lookup(&doc, "data.missing").is_none());
        assert_eq!(lookup(&doc, ""), Some(&doc));
    }

    #[test]
    fn test_lookup_treats_null_as_absent() {
        let doc = json!({"data": null});
        assert!(lookup(&doc, "data").is_none());
        assert!(matches!(
            require(&doc, "data"),
            Err(RetrievalError::Normalization { missing_field }) if missing_field == "data"
        ));
    }

    #[test]
    fn test_first_str_and_numbers() {
        let obj = json!({"quality": 720, "title": "  ", "name": "Clip"});
        assert_eq!(first_str(&obj, &["quality"]), Some("720".to_string()));
        assert_eq!(first_str(&obj, &["title", "name"]), Some("Clip".to_string()));
        assert_eq!(first_str(&obj, &["absent"]), None);
    }

    #[test]
    fn test_first_u64_does_not_coerce_labels() {
        let obj = json!({"a": 1024, "b": "2048", "c": "12.4 MB", "d": -3, "e": 10.0});
        assert_eq!(first_u64(&obj, &["a"]), Some(1024));
        assert_eq!(first_u64(&obj, &["b"]), Some(2048));
        assert_eq!(first_u64(&obj, &["c"]), None);
        assert_eq!(first_u64(&obj, &["d"]), None);
        assert_eq!(first_u64(&obj, &["e"]), Some(10));
    }

    #[test]
    fn test_first_rounded_u32_accepts_fractions() {
        let obj = json!({"abr": 129.478, "tbr": "48.9", "vbr": -1.0, "asr": 44100});
        assert_eq!(first_rounded_u32(&obj, &["abr"]), Some(129));
        assert_eq!(first_rounded_u32(&obj, &["tbr"]), Some(49));
        assert_eq!(first_rounded_u32(&obj, &["vbr"]), None);
        assert_eq!(first_rounded_u32(&obj, &["asr"]), Some(44_100));
        assert_eq!(first_rounded_u32(&obj, &["missing"]), None);
    }

    #[test]
    fn test_string_list_shapes() {
        let obj = json!({
            "plain": "Solo",
            "list": ["A", "B"],
            "objects": [{"name": "X"}, {"name": "Y"}],
            "author": {"name": "Creator"}
        });
        assert_eq!(string_list(&obj, &["plain"]), vec!["Solo"]);
        assert_eq!(string_list(&obj, &["list"]), vec!["A", "B"]);
        assert_eq!(string_list(&obj, &["objects"]), vec!["X", "Y"]);
        assert_eq!(string_list(&obj, &["author"]), vec!["Creator"]);
        assert!(string_list(&obj, &["nothing"]).is_empty());
    }
}
