//! CLI line events to language model stream parts.

use std::collections::HashMap;

use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::provider_claude_code::cli::events::{parse_line, CliEvent, CliUsage, ContentBlock};
use crate::types::finish::tags;
use crate::types::stream::{
    BlockPart, DeltaPart, ErrorPart, FinishPart, PayloadPart, ToolCallPart, ToolInputStartPart,
    ToolResultPart,
};
use crate::types::{FinishReason, JsonMap, StreamPart};

const TRACE_PREFIX: &str = "[CLAUDE_CODE_CLI]";

/// Key under `providerMetadata` for CLI-specific details.
pub const PROVIDER_METADATA_KEY: &str = "claude-code";

/// Map a CLI stop reason onto the unified tag set.
pub fn map_stop_reason(raw: &str) -> &'static str {
    match raw {
        "end_turn" | "stop_sequence" => tags::STOP,
        "max_tokens" => tags::LENGTH,
        "tool_use" => tags::TOOL_CALLS,
        "refusal" => tags::CONTENT_FILTER,
        "error" => tags::ERROR,
        _ => tags::OTHER,
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn provider_executed() -> JsonMap {
    let mut extra = JsonMap::new();
    extra.insert("providerExecuted".into(), JsonValue::Bool(true));
    extra
}

/// Stateful translation of one CLI run into stream parts.
///
/// Finish reasons are produced in the detailed `{unified, raw}` shape.
pub struct CliPartMapper {
    model_id: String,
    warnings: Vec<JsonValue>,
    metadata_sent: bool,
    session_id: Option<String>,
    tool_names: HashMap<String, String>,
    last_usage: Option<CliUsage>,
    last_stop_reason: Option<String>,
    finished: bool,
}

impl CliPartMapper {
    pub fn new(model_id: impl Into<String>, warnings: Vec<JsonValue>) -> Self {
        Self {
            model_id: model_id.into(),
            warnings,
            metadata_sent: false,
            session_id: None,
            tool_names: HashMap::new(),
            last_usage: None,
            last_stop_reason: None,
            finished: false,
        }
    }

    /// True once a `result` event (or a synthesized finish) was mapped.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The `stream-start` part carrying the call warnings.
    pub fn start(&mut self) -> StreamPart {
        let mut extra = JsonMap::new();
        extra.insert(
            "warnings".into(),
            JsonValue::Array(std::mem::take(&mut self.warnings)),
        );
        StreamPart::StreamStart(PayloadPart::from_map(extra))
    }

    /// Map one stdout line. Lines that are not CLI events are skipped.
    pub fn push_line(&mut self, line: &str) -> Vec<StreamPart> {
        match parse_line(line) {
            Ok(Some(event)) => self.push_event(event),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!("{}: skipping unparsable line: {}", TRACE_PREFIX, err);
                Vec::new()
            }
        }
    }

    pub fn push_event(&mut self, event: CliEvent) -> Vec<StreamPart> {
        match event {
            CliEvent::System {
                session_id, model, ..
            } => {
                if session_id.is_some() {
                    self.session_id = session_id;
                }
                self.response_metadata(model).into_iter().collect()
            }
            CliEvent::Assistant {
                message,
                session_id,
            } => {
                if session_id.is_some() {
                    self.session_id = session_id;
                }
                let mut parts: Vec<StreamPart> =
                    self.response_metadata(message.model).into_iter().collect();
                for block in message.content.into_blocks() {
                    self.push_block(block, &mut parts);
                }
                if let Some(usage) = message.usage {
                    self.last_usage = Some(usage);
                }
                if let Some(stop) = message.stop_reason {
                    let reason = FinishReason::detailed(
                        map_stop_reason(&stop),
                        Some(JsonValue::String(stop.clone())),
                    );
                    self.last_stop_reason = Some(stop);
                    parts.push(StreamPart::FinishStep(FinishPart::new(
                        reason,
                        Some(self.usage_json()),
                    )));
                }
                parts
            }
            CliEvent::User { message } => {
                let mut parts = Vec::new();
                if let Some(message) = message {
                    for block in message.content.into_blocks() {
                        self.push_block(block, &mut parts);
                    }
                }
                parts
            }
            CliEvent::Result {
                subtype,
                result,
                is_error,
                stop_reason,
                usage,
                session_id,
                total_cost_usd,
                duration_ms,
                num_turns,
            } => {
                if session_id.is_some() {
                    self.session_id = session_id;
                }
                if usage.is_some() {
                    self.last_usage = usage;
                }
                let subtype = subtype.unwrap_or_else(|| "success".to_string());
                let failed = is_error || subtype.starts_with("error");
                tracing::debug!(
                    "{}: result subtype={} is_error={} turns={:?}",
                    TRACE_PREFIX,
                    subtype,
                    is_error,
                    num_turns
                );

                let mut parts = Vec::new();
                let reason = if failed {
                    parts.push(StreamPart::Error(ErrorPart {
                        error: JsonValue::String(result.unwrap_or_else(|| subtype.clone())),
                        extra: JsonMap::new(),
                    }));
                    FinishReason::detailed(tags::ERROR, Some(JsonValue::String(subtype)))
                } else {
                    match stop_reason.or_else(|| self.last_stop_reason.take()) {
                        Some(raw) => FinishReason::detailed(
                            map_stop_reason(&raw),
                            Some(JsonValue::String(raw)),
                        ),
                        None => FinishReason::detailed(tags::STOP, None),
                    }
                };

                let mut finish = FinishPart::new(reason, Some(self.usage_json()));
                finish.extra.insert(
                    "providerMetadata".into(),
                    json!({
                        PROVIDER_METADATA_KEY: {
                            "sessionId": self.session_id,
                            "costUsd": total_cost_usd,
                            "durationMs": duration_ms,
                            "numTurns": num_turns,
                        }
                    }),
                );
                parts.push(StreamPart::Finish(finish));
                self.finished = true;
                parts
            }
            CliEvent::Unknown => Vec::new(),
        }
    }

    /// Finish for a run that ended without a `result` event.
    pub fn finish_without_result(&mut self) -> StreamPart {
        self.finished = true;
        StreamPart::Finish(FinishPart::new(
            FinishReason::detailed(tags::OTHER, None),
            Some(self.usage_json()),
        ))
    }

    fn usage_json(&self) -> JsonValue {
        self.last_usage
            .as_ref()
            .map(CliUsage::to_json)
            .unwrap_or_else(|| CliUsage::default().to_json())
    }

    /// `response-metadata`, once per run.
    fn response_metadata(&mut self, model: Option<String>) -> Option<StreamPart> {
        if self.metadata_sent {
            return None;
        }
        self.metadata_sent = true;
        let mut extra = JsonMap::new();
        if let Some(id) = &self.session_id {
            extra.insert("id".into(), JsonValue::String(id.clone()));
        }
        extra.insert(
            "modelId".into(),
            JsonValue::String(model.unwrap_or_else(|| self.model_id.clone())),
        );
        extra.insert(
            "timestamp".into(),
            JsonValue::String(chrono::Utc::now().to_rfc3339()),
        );
        Some(StreamPart::ResponseMetadata(PayloadPart::from_map(extra)))
    }

    fn push_block(&mut self, block: ContentBlock, parts: &mut Vec<StreamPart>) {
        match block {
            ContentBlock::Text { text } => {
                if text.is_empty() {
                    return;
                }
                let id = new_id();
                parts.push(StreamPart::TextStart(BlockPart::new(&id)));
                parts.push(StreamPart::TextDelta(DeltaPart::new(&id, text)));
                parts.push(StreamPart::TextEnd(BlockPart::new(id)));
            }
            ContentBlock::Thinking { thinking } => {
                if thinking.is_empty() {
                    return;
                }
                let id = new_id();
                parts.push(StreamPart::ReasoningStart(BlockPart::new(&id)));
                parts.push(StreamPart::ReasoningDelta(DeltaPart::new(&id, thinking)));
                parts.push(StreamPart::ReasoningEnd(BlockPart::new(id)));
            }
            ContentBlock::ToolUse { id, name, input } => {
                let input = if input.is_null() {
                    "{}".to_string()
                } else {
                    input.to_string()
                };
                self.tool_names.insert(id.clone(), name.clone());
                parts.push(StreamPart::ToolInputStart(ToolInputStartPart {
                    id: id.clone(),
                    tool_name: name.clone(),
                    extra: provider_executed(),
                }));
                parts.push(StreamPart::ToolInputDelta(DeltaPart::new(&id, input.clone())));
                parts.push(StreamPart::ToolInputEnd(BlockPart::new(&id)));
                parts.push(StreamPart::ToolCall(ToolCallPart {
                    tool_call_id: id,
                    tool_name: name,
                    input,
                    extra: provider_executed(),
                }));
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                let tool_name = self
                    .tool_names
                    .get(&tool_use_id)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                let mut extra = provider_executed();
                if is_error {
                    extra.insert("isError".into(), JsonValue::Bool(true));
                }
                parts.push(StreamPart::ToolResult(ToolResultPart {
                    tool_call_id: tool_use_id,
                    tool_name,
                    result: content,
                    extra,
                }));
            }
            ContentBlock::Other => {}
        }
    }
}
