use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::SdkError;
use crate::provider_claude_code::discovery::FALLBACK_EXECUTABLE;
use crate::types::{JsonMap, Settings};

/// System prompt setting: either literal text or a named preset of the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    Text(String),
    Preset {
        #[serde(rename = "type")]
        kind: String,
        preset: String,
        /// Text appended after the preset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        append: Option<String>,
    },
}

impl SystemPrompt {
    pub fn preset(name: impl Into<String>) -> Self {
        SystemPrompt::Preset {
            kind: "preset".into(),
            preset: name.into(),
            append: None,
        }
    }
}

/// Settings understood by the Claude Code CLI model. Unrecognised keys are
/// kept in `extra` and otherwise ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeCliSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_to_claude_code_executable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<SystemPrompt>,
    /// `default`, `acceptEdits`, `bypassPermissions` or `plan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disallowed_tools: Option<Vec<String>>,
    /// Longest silence on stdout before the run is abandoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl ClaudeCliSettings {
    pub fn from_settings(settings: &Settings) -> Result<Self, SdkError> {
        serde_json::from_value(JsonValue::Object(settings.clone())).map_err(|e| {
            SdkError::InvalidArgument {
                message: format!("invalid Claude Code settings: {e}"),
            }
        })
    }

    /// Program to spawn.
    pub fn executable(&self) -> &str {
        self.path_to_claude_code_executable
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(FALLBACK_EXECUTABLE)
    }
}
