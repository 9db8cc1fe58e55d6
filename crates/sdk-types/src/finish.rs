use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::types::json::JsonMap;

/// Canonical finish reason tags understood by hosts on the older model interface.
pub mod tags {
    pub const STOP: &str = "stop";
    pub const LENGTH: &str = "length";
    pub const CONTENT_FILTER: &str = "content-filter";
    pub const TOOL_CALLS: &str = "tool-calls";
    pub const ERROR: &str = "error";
    pub const OTHER: &str = "other";
}

/// Why a generation stopped, in whichever shape the producing SDK used.
///
/// Older producers emit a plain tag (`"stop"`); newer ones emit
/// `{ "unified": "stop", "raw": "end_turn" }`. Anything else, `null` and
/// objects whose `unified` is not a string included, is kept verbatim as
/// `Unrecognized` so it can still be serialized back out.
#[derive(Debug, Clone, PartialEq)]
pub enum FinishReason {
    Unified(String),
    Detailed {
        unified: String,
        /// Vendor-specific stop code, opaque to the adapter.
        raw: Option<JsonValue>,
        /// Any other keys of the object, in their original order.
        extra: JsonMap,
    },
    Unrecognized(JsonValue),
}

impl FinishReason {
    pub fn unified(tag: impl Into<String>) -> Self {
        FinishReason::Unified(tag.into())
    }

    pub fn detailed(unified: impl Into<String>, raw: Option<JsonValue>) -> Self {
        FinishReason::Detailed {
            unified: unified.into(),
            raw,
            extra: JsonMap::new(),
        }
    }

    /// True when already in the plain-tag shape.
    pub fn is_unified(&self) -> bool {
        matches!(self, FinishReason::Unified(_))
    }
}

impl From<JsonValue> for FinishReason {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::String(tag) => FinishReason::Unified(tag),
            JsonValue::Object(map) => {
                if !map.get("unified").is_some_and(JsonValue::is_string) {
                    return FinishReason::Unrecognized(JsonValue::Object(map));
                }
                let mut unified = String::new();
                let mut raw = None;
                let mut extra = JsonMap::new();
                for (key, value) in map {
                    if key == "unified" {
                        if let JsonValue::String(tag) = value {
                            unified = tag;
                        }
                    } else if key == "raw" {
                        raw = Some(value);
                    } else {
                        extra.insert(key, value);
                    }
                }
                FinishReason::Detailed {
                    unified,
                    raw,
                    extra,
                }
            }
            other => FinishReason::Unrecognized(other),
        }
    }
}

impl Serialize for FinishReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FinishReason::Unified(tag) => serializer.serialize_str(tag),
            FinishReason::Detailed {
                unified,
                raw,
                extra,
            } => {
                let mut map = serializer.serialize_map(Some(2 + extra.len()))?;
                map.serialize_entry("unified", unified)?;
                if let Some(raw) = raw {
                    map.serialize_entry("raw", raw)?;
                }
                for (key, value) in extra {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            FinishReason::Unrecognized(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FinishReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(FinishReason::from)
    }
}

impl From<&str> for FinishReason {
    fn from(tag: &str) -> Self {
        FinishReason::Unified(tag.to_string())
    }
}
