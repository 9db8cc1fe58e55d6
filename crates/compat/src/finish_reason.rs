use serde_json::Value as JsonValue;

use crate::types::finish::tags;
use crate::types::FinishReason;

/// Collapse any finish reason shape into its plain tag.
///
/// Plain tags pass through without validation against the known set;
/// `{unified, raw}` yields `unified`; anything else yields `"other"`.
pub fn normalize_finish_reason(reason: &FinishReason) -> String {
    match reason {
        FinishReason::Unified(tag) => tag.clone(),
        FinishReason::Detailed { unified, .. } => unified.clone(),
        FinishReason::Unrecognized(value) => normalize_finish_reason_value(value),
    }
}

/// Same rule over an untyped JSON value; total over every input.
pub fn normalize_finish_reason_value(reason: &JsonValue) -> String {
    match reason {
        JsonValue::String(tag) => tag.clone(),
        JsonValue::Object(map) => map
            .get("unified")
            .and_then(JsonValue::as_str)
            .unwrap_or(tags::OTHER)
            .to_string(),
        _ => tags::OTHER.to_string(),
    }
}
