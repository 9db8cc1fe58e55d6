use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::finish::FinishReason;
use crate::types::json::JsonMap;

/// One-shot generation result.
///
/// Only `finishReason` and `steps` are interpreted; every other field
/// (content, usage, warnings, response metadata, ...) is carried in `fields`.
/// A present key stays present, `null` values included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResult {
    #[serde(
        rename = "finishReason",
        default,
        deserialize_with = "crate::types::json::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<FinishReason>,
    #[serde(
        default,
        deserialize_with = "crate::types::json::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub steps: Option<Steps>,
    #[serde(flatten)]
    pub fields: JsonMap,
}

/// A sub-result recorded for a multi-step generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateStep {
    #[serde(
        rename = "finishReason",
        default,
        deserialize_with = "crate::types::json::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<FinishReason>,
    #[serde(flatten)]
    pub fields: JsonMap,
}

/// The `steps` value: normally a list, kept verbatim when it is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Steps {
    List(Vec<StepEntry>),
    Other(JsonValue),
}

/// One element of `steps`. Only objects are read as steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepEntry {
    Step(GenerateStep),
    Other(JsonValue),
}

impl Steps {
    /// The entries, when `steps` is a list.
    pub fn entries(&self) -> Option<&[StepEntry]> {
        match self {
            Steps::List(entries) => Some(entries),
            Steps::Other(_) => None,
        }
    }

    /// Entries that are steps, skipping anything else.
    pub fn iter_steps(&self) -> impl Iterator<Item = &GenerateStep> {
        self.entries()
            .unwrap_or_default()
            .iter()
            .filter_map(StepEntry::as_step)
    }
}

impl From<Vec<GenerateStep>> for Steps {
    fn from(steps: Vec<GenerateStep>) -> Self {
        Steps::List(steps.into_iter().map(StepEntry::Step).collect())
    }
}

impl StepEntry {
    pub fn as_step(&self) -> Option<&GenerateStep> {
        match self {
            StepEntry::Step(step) => Some(step),
            StepEntry::Other(_) => None,
        }
    }
}

impl GenerateResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    pub fn with_steps(mut self, steps: Vec<GenerateStep>) -> Self {
        self.steps = Some(Steps::from(steps));
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Concatenated text of all `content` entries of type `text`, falling
    /// back to a top-level `text` field.
    pub fn text(&self) -> String {
        if let Some(content) = self.fields.get("content").and_then(JsonValue::as_array) {
            return content
                .iter()
                .filter(|c| c.get("type").and_then(JsonValue::as_str) == Some("text"))
                .filter_map(|c| c.get("text").and_then(JsonValue::as_str))
                .collect::<Vec<_>>()
                .join("");
        }
        self.fields
            .get("text")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn usage(&self) -> Option<&JsonValue> {
        self.fields.get("usage")
    }
}

impl GenerateStep {
    pub fn new(finish_reason: Option<FinishReason>) -> Self {
        Self {
            finish_reason,
            fields: JsonMap::new(),
        }
    }
}
