use serde_json::{json, Value as JsonValue};

use crate::provider_claude_code::cli::options::{ClaudeCliSettings, SystemPrompt};
use crate::types::{CallOptions, PromptMessage};

/// Everything needed to spawn one CLI run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<String>,
    /// Prompt text written to the child's stdin.
    pub stdin: String,
    /// Call warnings reported in the `stream-start` part.
    pub warnings: Vec<JsonValue>,
}

impl Invocation {
    /// Request summary recorded on the stream envelope.
    pub fn describe(&self) -> JsonValue {
        json!({
            "program": self.program,
            "args": self.args,
            "cwd": self.cwd,
        })
    }
}

fn unsupported_setting(setting: &str) -> JsonValue {
    json!({"type": "unsupported-setting", "setting": setting})
}

/// Build the command line for a single non-interactive run.
///
/// A system message in the prompt replaces the configured system prompt.
pub fn build_invocation(
    model_id: &str,
    settings: &ClaudeCliSettings,
    options: &CallOptions,
) -> Invocation {
    let mut args: Vec<String> = vec![
        "-p".into(),
        "--output-format".into(),
        "stream-json".into(),
        "--verbose".into(),
        "--model".into(),
        model_id.into(),
    ];

    match (options.system_text(), &settings.system_prompt) {
        (Some(system), _) => {
            args.push("--system-prompt".into());
            args.push(system);
        }
        (None, Some(SystemPrompt::Text(text))) => {
            args.push("--system-prompt".into());
            args.push(text.clone());
        }
        (
            None,
            Some(SystemPrompt::Preset {
                append: Some(append),
                ..
            }),
        ) => {
            args.push("--append-system-prompt".into());
            args.push(append.clone());
        }
        // The CLI's own preset is the default.
        (None, Some(SystemPrompt::Preset { append: None, .. })) | (None, None) => {}
    }

    if let Some(mode) = &settings.permission_mode {
        args.push("--permission-mode".into());
        args.push(mode.clone());
    }
    if let Some(turns) = settings.max_turns {
        args.push("--max-turns".into());
        args.push(turns.to_string());
    }
    if let Some(tools) = settings.allowed_tools.as_ref().filter(|t| !t.is_empty()) {
        args.push("--allowedTools".into());
        args.push(tools.join(","));
    }
    if let Some(tools) = settings.disallowed_tools.as_ref().filter(|t| !t.is_empty()) {
        args.push("--disallowedTools".into());
        args.push(tools.join(","));
    }

    let mut warnings = Vec::new();
    if options.temperature.is_some() {
        warnings.push(unsupported_setting("temperature"));
    }
    if options.max_output_tokens.is_some() {
        warnings.push(unsupported_setting("maxOutputTokens"));
    }
    if options.stop_sequences.is_some() {
        warnings.push(unsupported_setting("stopSequences"));
    }

    Invocation {
        program: settings.executable().to_string(),
        args,
        cwd: settings.cwd.clone(),
        stdin: render_prompt(&options.prompt),
        warnings,
    }
}

/// Flatten the conversation into the text the CLI reads from stdin.
///
/// A lone user turn is passed as-is; longer conversations are rendered as a
/// transcript. System messages are passed as flags instead.
pub fn render_prompt(prompt: &[PromptMessage]) -> String {
    let turns: Vec<&PromptMessage> = prompt
        .iter()
        .filter(|m| !matches!(m, PromptMessage::System { .. }))
        .collect();
    match turns.as_slice() {
        [] => String::new(),
        [PromptMessage::User { .. }] => turns[0].text(),
        _ => turns
            .iter()
            .map(|m| match m {
                PromptMessage::Assistant { .. } => format!("Assistant: {}", m.text()),
                _ => format!("User: {}", m.text()),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
