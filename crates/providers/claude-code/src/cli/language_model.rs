use std::process::Stdio;
use std::time::Duration;

use async_stream::try_stream;
use futures_util::TryStreamExt;
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tracing::instrument;

use crate::core::{LanguageModel, PartStream, SdkError, StreamResponse};
use crate::provider_claude_code::cli::errors::{exit_error, result_error};
use crate::provider_claude_code::cli::invocation::{build_invocation, Invocation};
use crate::provider_claude_code::cli::mapper::CliPartMapper;
use crate::provider_claude_code::cli::options::ClaudeCliSettings;
use crate::types::{CallOptions, GenerateResult, GenerateStep, Settings, Steps, StreamPart};

const TRACE_PREFIX: &str = "[CLAUDE_CODE_CLI]";

/// Interface version of the parts this model produces.
pub const CLI_SPECIFICATION_VERSION: &str = "v3";

pub const PROVIDER_NAME: &str = "claude-code";

/// Language model backed by one `claude -p` run per call.
///
/// Produces the newer result shape (`finishReason: {unified, raw}`); hosts
/// on the older interface reach it through the compat wrapper.
pub struct ClaudeCliLanguageModel {
    model_id: String,
    settings: ClaudeCliSettings,
    raw_settings: Settings,
}

impl ClaudeCliLanguageModel {
    pub fn new(model_id: impl Into<String>, raw_settings: Settings) -> Result<Self, SdkError> {
        let settings = ClaudeCliSettings::from_settings(&raw_settings)?;
        Ok(Self {
            model_id: model_id.into(),
            settings,
            raw_settings,
        })
    }

    pub fn settings(&self) -> &ClaudeCliSettings {
        &self.settings
    }

    fn spawn(&self, invocation: &Invocation) -> Result<tokio::process::Child, SdkError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SdkError::Process {
                    message: format!(
                        "Claude Code CLI not found at `{}`; install it and run `claude login`",
                        invocation.program
                    ),
                    exit_code: None,
                    stderr: None,
                }
            } else {
                SdkError::Io(e)
            }
        })
    }
}

#[async_trait::async_trait]
impl LanguageModel for ClaudeCliLanguageModel {
    fn specification_version(&self) -> &str {
        CLI_SPECIFICATION_VERSION
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    /// `settings` returns the full settings map; any other name looks up a
    /// single settings key.
    fn attribute(&self, name: &str) -> Option<JsonValue> {
        match name {
            "settings" => Some(JsonValue::Object(self.raw_settings.clone())),
            key => self.raw_settings.get(key).cloned(),
        }
    }

    #[instrument(name = "claude_code.do_generate", skip_all, fields(model = %self.model_id))]
    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResult, SdkError> {
        let response = self.do_stream(options).await?;
        let parts: Vec<StreamPart> = response.stream.try_collect().await?;
        let mut result = collect_generate_result(parts)?;
        if let Some(request) = response.request {
            result.fields.insert("request".into(), request);
        }
        Ok(result)
    }

    #[instrument(name = "claude_code.do_stream", skip_all, fields(model = %self.model_id))]
    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, SdkError> {
        let invocation = build_invocation(&self.model_id, &self.settings, &options);
        tracing::info!(
            "{}: do_stream started model={} program={}",
            TRACE_PREFIX,
            self.model_id,
            invocation.program
        );

        let mut child = self.spawn(&invocation)?;
        let pid = child.id();

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = write_prompt(&mut stdin, &invocation.stdin).await {
                // A child that exits without reading reports through its exit status.
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
                tracing::debug!("{}: CLI closed stdin early", TRACE_PREFIX);
            }
        }
        let stdout = child.stdout.take().ok_or_else(|| SdkError::Process {
            message: "failed to capture stdout of the Claude Code CLI".into(),
            exit_code: None,
            stderr: None,
        })?;
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let idle_timeout = self.settings.timeout_ms.map(Duration::from_millis);
        let mut mapper = CliPartMapper::new(self.model_id.clone(), invocation.warnings.clone());
        let stream: PartStream = Box::pin(try_stream! {
            // Owning the child here ties the process lifetime to the stream.
            let mut child = child;
            yield mapper.start();

            let mut lines = BufReader::new(stdout).lines();
            loop {
                let next = match idle_timeout {
                    Some(limit) => tokio::time::timeout(limit, lines.next_line())
                        .await
                        .map_err(|_| {
                            tracing::warn!("{}: no output for {:?}, stopping the CLI", TRACE_PREFIX, limit);
                            SdkError::Timeout
                        })??,
                    None => lines.next_line().await?,
                };
                let Some(line) = next else { break };
                for part in mapper.push_line(&line) {
                    yield part;
                }
            }

            let status = child.wait().await?;
            if !mapper.is_finished() {
                let stderr = match stderr_task {
                    Some(task) => task.await.unwrap_or_default(),
                    None => String::new(),
                };
                if !status.success() {
                    tracing::warn!(
                        "{}: CLI exited with {:?} before a result",
                        TRACE_PREFIX,
                        status.code()
                    );
                    Err::<(), _>(exit_error(stderr, status.code()))?;
                }
                yield mapper.finish_without_result();
            }
            tracing::debug!("{}: stream finished status={:?}", TRACE_PREFIX, status.code());
        });

        let mut response = StreamResponse::new(stream);
        response.request = Some(invocation.describe());
        response.response = Some(json!({ "pid": pid }));
        Ok(response)
    }
}

async fn write_prompt(stdin: &mut ChildStdin, prompt: &str) -> std::io::Result<()> {
    stdin.write_all(prompt.as_bytes()).await?;
    stdin.shutdown().await
}

/// Fold a finished part sequence into a generate result.
///
/// An `error` part fails the call with its message, as an authentication
/// error when the message says the CLI is not logged in.
pub fn collect_generate_result(parts: Vec<StreamPart>) -> Result<GenerateResult, SdkError> {
    let mut result = GenerateResult::new();
    let mut content: Vec<JsonValue> = Vec::new();
    let mut steps: Vec<GenerateStep> = Vec::new();

    for part in parts {
        match part {
            StreamPart::StreamStart(p) => {
                if let Some(warnings) = p.extra.get("warnings") {
                    result.fields.insert("warnings".into(), warnings.clone());
                }
            }
            StreamPart::ResponseMetadata(p) => {
                result
                    .fields
                    .insert("response".into(), JsonValue::Object(p.extra));
            }
            StreamPart::TextDelta(p) => content.push(json!({"type": "text", "text": p.delta})),
            StreamPart::ReasoningDelta(p) => {
                content.push(json!({"type": "reasoning", "text": p.delta}))
            }
            StreamPart::ToolCall(p) => content.push(json!({
                "type": "tool-call",
                "toolCallId": p.tool_call_id,
                "toolName": p.tool_name,
                "input": p.input,
                "providerExecuted": true,
            })),
            StreamPart::ToolResult(p) => content.push(json!({
                "type": "tool-result",
                "toolCallId": p.tool_call_id,
                "toolName": p.tool_name,
                "result": p.result,
                "providerExecuted": true,
            })),
            StreamPart::FinishStep(p) => {
                let mut step = GenerateStep::new(Some(p.finish_reason));
                if let Some(usage) = p.extra.get("usage") {
                    step.fields.insert("usage".into(), usage.clone());
                }
                steps.push(step);
            }
            StreamPart::Finish(p) => {
                result.finish_reason = Some(p.finish_reason);
                if let Some(usage) = p.extra.get("usage") {
                    result.fields.insert("usage".into(), usage.clone());
                }
                if let Some(metadata) = p.extra.get("providerMetadata") {
                    result
                        .fields
                        .insert("providerMetadata".into(), metadata.clone());
                }
            }
            StreamPart::Error(p) => {
                let message = match p.error {
                    JsonValue::String(s) => s,
                    other => other.to_string(),
                };
                return Err(result_error(message));
            }
            _ => {}
        }
    }

    result.fields.insert("content".into(), JsonValue::Array(content));
    if !steps.is_empty() {
        result.steps = Some(Steps::from(steps));
    }
    Ok(result)
}
