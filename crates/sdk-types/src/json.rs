use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Ordered JSON object used for pass-through fields.
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Provider or per-model settings: configuration key to opaque value.
pub type Settings = JsonMap;

/// Deserialize an optional field so that a present key always yields `Some`,
/// including when its value is `null`. Pair with `#[serde(default)]` so that
/// only an absent key produces `None`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Insert `key` in front of the entries of `body`, keeping the remaining order.
pub(crate) fn with_leading_key(key: &str, value: JsonValue, body: JsonMap) -> JsonMap {
    let mut map = JsonMap::with_capacity(body.len() + 1);
    map.insert(key.to_string(), value);
    for (k, v) in body {
        if k != key {
            map.insert(k, v);
        }
    }
    map
}
