//! Passthrough for informational payloads (info, status, completions).

use cognima_core::{RetrievalError, RetrievalResult};
use serde_json::Value;

use super::fields::lookup;

/// Candidate paths of the interesting part of a payload, first match wins.
#[derive(Debug)]
pub struct DocumentRule {
    pub paths: &'static [&'static str],
}

pub static DATA: DocumentRule = DocumentRule { paths: &["data"] };
pub static INFO: DocumentRule = DocumentRule {
    paths: &["info", "data"],
};
pub static COMPLETION: DocumentRule = DocumentRule {
    paths: &["data.choices.0.message.content", "data"],
};
/// Whole payload, for endpoints without an envelope.
pub static WHOLE: DocumentRule = DocumentRule { paths: &[""] };

/// Clone the first present path of `raw`.
pub fn normalize_document(rule: &DocumentRule, raw: &Value) -> RetrievalResult<Value> {
    rule.paths
        .iter()
        .find_map(|path| lookup(raw, path))
        .cloned()
        .ok_or_else(|| {
            RetrievalError::normalization(rule.paths.first().copied().unwrap_or_default())
        })
}
