//! Stream parts, keyed on the open-ended `type` discriminator.
//!
//! Known part types get a typed variant; any other `type` deserializes into
//! [`StreamPart::Unknown`] with its payload intact. Every variant keeps its
//! unmodelled fields in an `extra` map so a part survives a
//! deserialize/serialize cycle unchanged.

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::types::finish::FinishReason;
use crate::types::json::{with_leading_key, JsonMap};

/// Start or end marker of a text, reasoning or tool-input block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPart {
    pub id: String,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Incremental chunk of a text, reasoning or tool-input block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaPart {
    pub id: String,
    pub delta: String,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInputStartPart {
    pub id: String,
    pub tool_name: String,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallPart {
    pub tool_call_id: String,
    pub tool_name: String,
    /// Stringified JSON input.
    pub input: String,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPart {
    pub tool_call_id: String,
    pub tool_name: String,
    pub result: JsonValue,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Terminal part of a step (`finish-step`) or of the whole stream (`finish`).
///
/// `usage` and everything else besides `finishReason` stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishPart {
    pub finish_reason: FinishReason,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPart {
    pub error: JsonValue,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Part whose payload is not interpreted (stream-start, response-metadata, raw).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadPart {
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Part with a `type` this crate does not know about.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownPart {
    pub kind: String,
    pub fields: JsonMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamPart {
    StreamStart(PayloadPart),
    ResponseMetadata(PayloadPart),
    TextStart(BlockPart),
    TextDelta(DeltaPart),
    TextEnd(BlockPart),
    ReasoningStart(BlockPart),
    ReasoningDelta(DeltaPart),
    ReasoningEnd(BlockPart),
    ToolInputStart(ToolInputStartPart),
    ToolInputDelta(DeltaPart),
    ToolInputEnd(BlockPart),
    ToolCall(ToolCallPart),
    ToolResult(ToolResultPart),
    FinishStep(FinishPart),
    Finish(FinishPart),
    Error(ErrorPart),
    Raw(PayloadPart),
    Unknown(UnknownPart),
}

impl BlockPart {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: JsonMap::new(),
        }
    }
}

impl DeltaPart {
    pub fn new(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            delta: delta.into(),
            extra: JsonMap::new(),
        }
    }
}

impl FinishPart {
    pub fn new(finish_reason: FinishReason, usage: Option<JsonValue>) -> Self {
        let mut extra = JsonMap::new();
        if let Some(usage) = usage {
            extra.insert("usage".into(), usage);
        }
        Self {
            finish_reason,
            extra,
        }
    }

    pub fn usage(&self) -> Option<&JsonValue> {
        self.extra.get("usage")
    }
}

impl PayloadPart {
    pub fn from_map(extra: JsonMap) -> Self {
        Self { extra }
    }
}

impl StreamPart {
    /// The `type` discriminator as it appears on the wire.
    pub fn kind(&self) -> &str {
        match self {
            StreamPart::StreamStart(_) => "stream-start",
            StreamPart::ResponseMetadata(_) => "response-metadata",
            StreamPart::TextStart(_) => "text-start",
            StreamPart::TextDelta(_) => "text-delta",
            StreamPart::TextEnd(_) => "text-end",
            StreamPart::ReasoningStart(_) => "reasoning-start",
            StreamPart::ReasoningDelta(_) => "reasoning-delta",
            StreamPart::ReasoningEnd(_) => "reasoning-end",
            StreamPart::ToolInputStart(_) => "tool-input-start",
            StreamPart::ToolInputDelta(_) => "tool-input-delta",
            StreamPart::ToolInputEnd(_) => "tool-input-end",
            StreamPart::ToolCall(_) => "tool-call",
            StreamPart::ToolResult(_) => "tool-result",
            StreamPart::FinishStep(_) => "finish-step",
            StreamPart::Finish(_) => "finish",
            StreamPart::Error(_) => "error",
            StreamPart::Raw(_) => "raw",
            StreamPart::Unknown(p) => &p.kind,
        }
    }

    /// Fields of the part that have no typed slot.
    pub fn extra(&self) -> &JsonMap {
        match self {
            StreamPart::StreamStart(p) | StreamPart::ResponseMetadata(p) | StreamPart::Raw(p) => {
                &p.extra
            }
            StreamPart::TextStart(p)
            | StreamPart::TextEnd(p)
            | StreamPart::ReasoningStart(p)
            | StreamPart::ReasoningEnd(p)
            | StreamPart::ToolInputEnd(p) => &p.extra,
            StreamPart::TextDelta(p)
            | StreamPart::ReasoningDelta(p)
            | StreamPart::ToolInputDelta(p) => &p.extra,
            StreamPart::ToolInputStart(p) => &p.extra,
            StreamPart::ToolCall(p) => &p.extra,
            StreamPart::ToolResult(p) => &p.extra,
            StreamPart::FinishStep(p) | StreamPart::Finish(p) => &p.extra,
            StreamPart::Error(p) => &p.extra,
            StreamPart::Unknown(p) => &p.fields,
        }
    }

    pub fn extra_mut(&mut self) -> &mut JsonMap {
        match self {
            StreamPart::StreamStart(p) | StreamPart::ResponseMetadata(p) | StreamPart::Raw(p) => {
                &mut p.extra
            }
            StreamPart::TextStart(p)
            | StreamPart::TextEnd(p)
            | StreamPart::ReasoningStart(p)
            | StreamPart::ReasoningEnd(p)
            | StreamPart::ToolInputEnd(p) => &mut p.extra,
            StreamPart::TextDelta(p)
            | StreamPart::ReasoningDelta(p)
            | StreamPart::ToolInputDelta(p) => &mut p.extra,
            StreamPart::ToolInputStart(p) => &mut p.extra,
            StreamPart::ToolCall(p) => &mut p.extra,
            StreamPart::ToolResult(p) => &mut p.extra,
            StreamPart::FinishStep(p) | StreamPart::Finish(p) => &mut p.extra,
            StreamPart::Error(p) => &mut p.extra,
            StreamPart::Unknown(p) => &mut p.fields,
        }
    }

    fn body(&self) -> Result<JsonValue, serde_json::Error> {
        match self {
            StreamPart::StreamStart(p) | StreamPart::ResponseMetadata(p) | StreamPart::Raw(p) => {
                serde_json::to_value(p)
            }
            StreamPart::TextStart(p)
            | StreamPart::TextEnd(p)
            | StreamPart::ReasoningStart(p)
            | StreamPart::ReasoningEnd(p)
            | StreamPart::ToolInputEnd(p) => serde_json::to_value(p),
            StreamPart::TextDelta(p)
            | StreamPart::ReasoningDelta(p)
            | StreamPart::ToolInputDelta(p) => serde_json::to_value(p),
            StreamPart::ToolInputStart(p) => serde_json::to_value(p),
            StreamPart::ToolCall(p) => serde_json::to_value(p),
            StreamPart::ToolResult(p) => serde_json::to_value(p),
            StreamPart::FinishStep(p) | StreamPart::Finish(p) => serde_json::to_value(p),
            StreamPart::Error(p) => serde_json::to_value(p),
            StreamPart::Unknown(p) => Ok(JsonValue::Object(p.fields.clone())),
        }
    }

    /// Build a part from its JSON object form. Known types whose payload does
    /// not fit the typed variant degrade to [`StreamPart::Unknown`].
    pub fn from_map(mut payload: JsonMap) -> Result<Self, serde_json::Error> {
        let kind = match payload.remove("type") {
            Some(JsonValue::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "stream part `type` must be a string, got {other}"
                )))
            }
            None => return Err(de::Error::missing_field("type")),
        };
        let value = JsonValue::Object(payload.clone());
        let typed = match kind.as_str() {
            "stream-start" => serde_json::from_value(value).map(StreamPart::StreamStart),
            "response-metadata" => serde_json::from_value(value).map(StreamPart::ResponseMetadata),
            "text-start" => serde_json::from_value(value).map(StreamPart::TextStart),
            "text-delta" => serde_json::from_value(value).map(StreamPart::TextDelta),
            "text-end" => serde_json::from_value(value).map(StreamPart::TextEnd),
            "reasoning-start" => serde_json::from_value(value).map(StreamPart::ReasoningStart),
            "reasoning-delta" => serde_json::from_value(value).map(StreamPart::ReasoningDelta),
            "reasoning-end" => serde_json::from_value(value).map(StreamPart::ReasoningEnd),
            "tool-input-start" => serde_json::from_value(value).map(StreamPart::ToolInputStart),
            "tool-input-delta" => serde_json::from_value(value).map(StreamPart::ToolInputDelta),
            "tool-input-end" => serde_json::from_value(value).map(StreamPart::ToolInputEnd),
            "tool-call" => serde_json::from_value(value).map(StreamPart::ToolCall),
            "tool-result" => serde_json::from_value(value).map(StreamPart::ToolResult),
            "finish-step" => serde_json::from_value(value).map(StreamPart::FinishStep),
            "finish" => serde_json::from_value(value).map(StreamPart::Finish),
            "error" => serde_json::from_value(value).map(StreamPart::Error),
            "raw" => serde_json::from_value(value).map(StreamPart::Raw),
            _ => {
                return Ok(StreamPart::Unknown(UnknownPart {
                    kind,
                    fields: payload,
                }))
            }
        };
        Ok(typed.unwrap_or_else(|_| {
            StreamPart::Unknown(UnknownPart {
                kind,
                fields: payload,
            })
        }))
    }

    pub fn to_map(&self) -> Result<JsonMap, serde_json::Error> {
        let body = match self.body()? {
            JsonValue::Object(map) => map,
            other => {
                return Err(ser::Error::custom(format!(
                    "stream part body must be an object, got {other}"
                )))
            }
        };
        Ok(with_leading_key(
            "type",
            JsonValue::String(self.kind().to_string()),
            body,
        ))
    }
}

impl Serialize for StreamPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StreamPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let payload = JsonMap::deserialize(deserializer)?;
        StreamPart::from_map(payload).map_err(de::Error::custom)
    }
}
