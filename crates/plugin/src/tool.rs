use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::instrument;

use crate::core::{Provider, SdkError};
use crate::plugin::config::ClaudeModel;
use crate::types::CallOptions;

const TRACE_PREFIX: &str = "[CLAUDE_CODE_TOOL]";

pub const QUERY_TOOL_NAME: &str = "claude-code-query";

const QUERY_TOOL_DESCRIPTION: &str = "Execute a direct query using Claude Agent SDK. Useful when you need to leverage Claude Code's specific capabilities with full tool access.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryArgs {
    #[serde(default)]
    pub model: ClaudeModel,
    pub prompt: String,
    #[serde(default)]
    pub system: Option<String>,
}

/// One-shot query against a Claude Code model, exposed to the host as a tool.
///
/// The result is always a JSON string, `{success: true, text, usage}` or
/// `{success: false, error}`; failures never escape as errors.
pub struct QueryTool {
    provider: Arc<dyn Provider>,
}

impl QueryTool {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn name(&self) -> &'static str {
        QUERY_TOOL_NAME
    }

    pub fn description(&self) -> &'static str {
        QUERY_TOOL_DESCRIPTION
    }

    /// JSON schema of the arguments.
    pub fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": "string",
                    "enum": ClaudeModel::ALL.iter().map(ClaudeModel::as_str).collect::<Vec<_>>(),
                    "default": ClaudeModel::default().as_str(),
                    "description": "Model to use (sonnet, opus, or haiku)"
                },
                "prompt": {
                    "type": "string",
                    "description": "The prompt to send to Claude Code"
                },
                "system": {
                    "type": "string",
                    "description": "Optional system prompt override"
                }
            },
            "required": ["prompt"]
        })
    }

    /// Execute with raw JSON arguments as the host delivers them.
    pub async fn execute_json(&self, args: JsonValue) -> String {
        match serde_json::from_value::<QueryArgs>(args) {
            Ok(args) => self.execute(args).await,
            Err(e) => failure(&SdkError::InvalidArgument {
                message: e.to_string(),
            }),
        }
    }

    #[instrument(name = "claude_code.query_tool", skip_all, fields(model = args.model.as_str()))]
    pub async fn execute(&self, args: QueryArgs) -> String {
        match self.run(args).await {
            Ok(outcome) => outcome.to_string(),
            Err(err) => {
                tracing::info!("{}: query failed: {}", TRACE_PREFIX, err);
                failure(&err)
            }
        }
    }

    async fn run(&self, args: QueryArgs) -> Result<JsonValue, SdkError> {
        let model = self.provider.language_model(args.model.as_str(), None)?;
        let options = CallOptions::from_text(args.prompt, args.system.as_deref());
        let result = model.do_generate(options).await?;
        Ok(json!({
            "success": true,
            "text": result.text(),
            "usage": result.usage(),
        }))
    }
}

fn failure(err: &SdkError) -> String {
    json!({
        "success": false,
        "error": err.format_details(),
    })
    .to_string()
}
