use crate::compat::wrap_language_model;
use crate::core::{LanguageModel, SdkError};
use crate::provider_claude_code::cli::errors::{exit_error, is_auth_failure};
use crate::provider_claude_code::cli::invocation::{build_invocation, render_prompt};
use crate::provider_claude_code::cli::language_model::{
    collect_generate_result, ClaudeCliLanguageModel,
};
use crate::provider_claude_code::cli::mapper::{map_stop_reason, CliPartMapper};
use crate::provider_claude_code::cli::options::{ClaudeCliSettings, SystemPrompt};
use crate::types::{CallOptions, FinishReason, PromptMessage, Settings, StreamPart};
use futures_util::{StreamExt, TryStreamExt};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

const SESSION: &[&str] = &[
    r#"{"type":"system","subtype":"init","session_id":"s-1","model":"claude-sonnet-4-5","tools":["Read"]}"#,
    r#"{"type":"assistant","message":{"id":"msg_1","model":"claude-sonnet-4-5","content":[{"type":"thinking","thinking":"Need the file."},{"type":"text","text":"Let me read."},{"type":"tool_use","id":"tu_1","name":"Read","input":{"file_path":"a.txt"}}],"stop_reason":"tool_use","usage":{"input_tokens":10,"output_tokens":5}},"session_id":"s-1"}"#,
    r#"{"type":"user","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"tu_1","content":"hello"}]},"session_id":"s-1"}"#,
    "",
    r#"{"type":"assistant","message":{"content":[{"type":"text","text":" Done."}],"stop_reason":"end_turn","usage":{"input_tokens":20,"output_tokens":7,"cache_read_input_tokens":4}},"session_id":"s-1"}"#,
    r#"{"type":"result","subtype":"success","is_error":false,"result":"Let me read. Done.","session_id":"s-1","total_cost_usd":0.01,"duration_ms":1200,"num_turns":2,"usage":{"input_tokens":30,"output_tokens":12}}"#,
];

fn settings(value: JsonValue) -> Settings {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected object, got {other:?}"),
    }
}

fn map_session(lines: &[&str]) -> (CliPartMapper, Vec<StreamPart>) {
    let mut mapper = CliPartMapper::new("sonnet", Vec::new());
    let mut parts = vec![mapper.start()];
    for line in lines {
        parts.extend(mapper.push_line(line));
    }
    (mapper, parts)
}

#[test]
fn stop_reasons_map_to_unified_tags() {
    assert_eq!(map_stop_reason("end_turn"), "stop");
    assert_eq!(map_stop_reason("stop_sequence"), "stop");
    assert_eq!(map_stop_reason("max_tokens"), "length");
    assert_eq!(map_stop_reason("tool_use"), "tool-calls");
    assert_eq!(map_stop_reason("refusal"), "content-filter");
    assert_eq!(map_stop_reason("pause_turn"), "other");
}

#[test]
fn settings_parse_known_keys_and_keep_the_rest() {
    let parsed = ClaudeCliSettings::from_settings(&settings(json!({
        "pathToClaudeCodeExecutable": "/usr/local/bin/claude",
        "systemPrompt": {"type": "preset", "preset": "claude_code"},
        "permissionMode": "default",
        "maxTurns": 4,
        "timeoutMs": 30000,
        "resume": "abc"
    })))
    .expect("settings");
    assert_eq!(parsed.executable(), "/usr/local/bin/claude");
    assert_eq!(parsed.system_prompt, Some(SystemPrompt::preset("claude_code")));
    assert_eq!(parsed.permission_mode.as_deref(), Some("default"));
    assert_eq!(parsed.max_turns, Some(4));
    assert_eq!(parsed.timeout_ms, Some(30000));
    assert!(!parsed.extra.contains_key("timeoutMs"));
    assert_eq!(parsed.extra["resume"], json!("abc"));

    let text = ClaudeCliSettings::from_settings(&settings(json!({"systemPrompt": "Be terse"})))
        .expect("settings");
    assert_eq!(text.system_prompt, Some(SystemPrompt::Text("Be terse".into())));
    assert_eq!(text.executable(), "claude");
}

#[test]
fn settings_with_wrong_types_are_rejected() {
    match ClaudeCliSettings::from_settings(&settings(json!({"maxTurns": "many"}))) {
        Err(SdkError::InvalidArgument { message }) => {
            assert!(message.contains("invalid Claude Code settings"), "{message}")
        }
        other => panic!("expected invalid argument, got {other:?}"),
    }
}

#[test]
fn invocation_uses_stream_json_and_settings_flags() {
    let parsed = ClaudeCliSettings::from_settings(&settings(json!({
        "pathToClaudeCodeExecutable": "/usr/local/bin/claude",
        "systemPrompt": {"type": "preset", "preset": "claude_code"},
        "permissionMode": "default",
        "maxTurns": 3,
        "allowedTools": ["Read", "Grep"],
        "disallowedTools": [],
        "cwd": "/work"
    })))
    .expect("settings");
    let invocation = build_invocation("sonnet", &parsed, &CallOptions::from_text("Hi", None));

    assert_eq!(invocation.program, "/usr/local/bin/claude");
    assert_eq!(
        invocation.args,
        vec![
            "-p",
            "--output-format",
            "stream-json",
            "--verbose",
            "--model",
            "sonnet",
            "--permission-mode",
            "default",
            "--max-turns",
            "3",
            "--allowedTools",
            "Read,Grep",
        ]
    );
    assert_eq!(invocation.cwd.as_deref(), Some("/work"));
    assert_eq!(invocation.stdin, "Hi");
    assert!(invocation.warnings.is_empty());
    assert_eq!(invocation.describe()["program"], json!("/usr/local/bin/claude"));
}

#[test]
fn system_prompt_sources() {
    let configured = ClaudeCliSettings {
        system_prompt: Some(SystemPrompt::Text("From settings".into())),
        ..Default::default()
    };
    let from_call = build_invocation(
        "opus",
        &configured,
        &CallOptions::from_text("Hi", Some("From call")),
    );
    assert!(from_call
        .args
        .windows(2)
        .any(|w| w == ["--system-prompt", "From call"]));
    assert!(!from_call.args.iter().any(|a| a == "From settings"));

    let from_settings = build_invocation("opus", &configured, &CallOptions::from_text("Hi", None));
    assert!(from_settings
        .args
        .windows(2)
        .any(|w| w == ["--system-prompt", "From settings"]));

    let appended = ClaudeCliSettings {
        system_prompt: Some(SystemPrompt::Preset {
            kind: "preset".into(),
            preset: "claude_code".into(),
            append: Some("Answer in French".into()),
        }),
        ..Default::default()
    };
    let invocation = build_invocation("opus", &appended, &CallOptions::from_text("Hi", None));
    assert!(invocation
        .args
        .windows(2)
        .any(|w| w == ["--append-system-prompt", "Answer in French"]));
    assert!(!invocation.args.iter().any(|a| a == "--system-prompt"));
}

#[test]
fn unsupported_call_settings_become_warnings() {
    let options = CallOptions::from_text("Hi", None)
        .with_temperature(0.2)
        .with_max_output_tokens(100);
    let invocation = build_invocation("haiku", &ClaudeCliSettings::default(), &options);
    assert_eq!(
        invocation.warnings,
        vec![
            json!({"type": "unsupported-setting", "setting": "temperature"}),
            json!({"type": "unsupported-setting", "setting": "maxOutputTokens"}),
        ]
    );
}

#[test]
fn multi_turn_prompt_is_rendered_as_transcript() {
    let prompt = vec![
        PromptMessage::system("ignored here"),
        PromptMessage::user("What is 2+2?"),
        PromptMessage::assistant("4"),
        PromptMessage::user("And 3+3?"),
    ];
    assert_eq!(
        render_prompt(&prompt),
        "User: What is 2+2?\n\nAssistant: 4\n\nUser: And 3+3?"
    );
    assert_eq!(render_prompt(&[PromptMessage::user("solo")]), "solo");
    assert_eq!(render_prompt(&[]), "");
}

#[test]
fn session_maps_to_ordered_parts() {
    let (mapper, parts) = map_session(SESSION);
    let kinds: Vec<&str> = parts.iter().map(StreamPart::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "stream-start",
            "response-metadata",
            "reasoning-start",
            "reasoning-delta",
            "reasoning-end",
            "text-start",
            "text-delta",
            "text-end",
            "tool-input-start",
            "tool-input-delta",
            "tool-input-end",
            "tool-call",
            "finish-step",
            "tool-result",
            "text-start",
            "text-delta",
            "text-end",
            "finish-step",
            "finish",
        ]
    );
    assert!(mapper.is_finished());
    assert_eq!(mapper.session_id(), Some("s-1"));

    match &parts[1] {
        StreamPart::ResponseMetadata(p) => {
            assert_eq!(p.extra["id"], json!("s-1"));
            assert_eq!(p.extra["modelId"], json!("claude-sonnet-4-5"));
            assert!(p.extra["timestamp"].is_string());
        }
        other => panic!("expected response-metadata, got {other:?}"),
    }
    match &parts[11] {
        StreamPart::ToolCall(p) => {
            assert_eq!(p.tool_call_id, "tu_1");
            assert_eq!(p.tool_name, "Read");
            assert_eq!(
                serde_json::from_str::<JsonValue>(&p.input).unwrap(),
                json!({"file_path": "a.txt"})
            );
            assert_eq!(p.extra["providerExecuted"], json!(true));
        }
        other => panic!("expected tool-call, got {other:?}"),
    }
    match &parts[12] {
        StreamPart::FinishStep(p) => assert_eq!(
            p.finish_reason,
            FinishReason::detailed("tool-calls", Some(json!("tool_use")))
        ),
        other => panic!("expected finish-step, got {other:?}"),
    }
    match &parts[13] {
        StreamPart::ToolResult(p) => {
            assert_eq!(p.tool_name, "Read");
            assert_eq!(p.result, json!("hello"));
        }
        other => panic!("expected tool-result, got {other:?}"),
    }
    match parts.last() {
        Some(StreamPart::Finish(p)) => {
            assert_eq!(
                p.finish_reason,
                FinishReason::detailed("stop", Some(json!("end_turn")))
            );
            assert_eq!(
                p.usage(),
                Some(&json!({"inputTokens": 30, "outputTokens": 12, "totalTokens": 42}))
            );
            assert_eq!(
                p.extra["providerMetadata"]["claude-code"]["sessionId"],
                json!("s-1")
            );
        }
        other => panic!("expected finish, got {other:?}"),
    }

    // Block ids pair up start, delta and end.
    let (start, delta, end) = (&parts[5], &parts[6], &parts[7]);
    match (start, delta, end) {
        (StreamPart::TextStart(s), StreamPart::TextDelta(d), StreamPart::TextEnd(e)) => {
            assert_eq!(s.id, d.id);
            assert_eq!(d.id, e.id);
        }
        other => panic!("expected a text block, got {other:?}"),
    }
}

#[test]
fn error_result_yields_error_part_and_error_finish() {
    let (_, parts) = map_session(&[
        r#"{"type":"result","subtype":"error_max_turns","is_error":true,"session_id":"s-2"}"#,
    ]);
    let kinds: Vec<&str> = parts.iter().map(StreamPart::kind).collect();
    assert_eq!(kinds, vec!["stream-start", "error", "finish"]);
    match &parts[2] {
        StreamPart::Finish(p) => assert_eq!(
            p.finish_reason,
            FinishReason::detailed("error", Some(json!("error_max_turns")))
        ),
        other => panic!("expected finish, got {other:?}"),
    }
}

#[test]
fn unknown_and_garbage_lines_are_skipped() {
    let (mapper, parts) = map_session(&[
        "not json at all",
        r#"{"type":"stream_event","event":{"type":"message_start"}}"#,
        r#"{"no_type": true}"#,
    ]);
    assert_eq!(parts.len(), 1);
    assert!(!mapper.is_finished());
}

#[test]
fn collected_result_has_content_steps_and_usage() {
    let (_, parts) = map_session(SESSION);
    let result = collect_generate_result(parts).expect("result");

    assert_eq!(result.text(), "Let me read. Done.");
    assert_eq!(
        result.finish_reason,
        Some(FinishReason::detailed("stop", Some(json!("end_turn"))))
    );
    assert_eq!(result.usage().unwrap()["totalTokens"], json!(42));

    let steps: Vec<_> = result.steps.as_ref().expect("steps").iter_steps().collect();
    assert_eq!(steps.len(), 2);
    assert_eq!(
        steps[0].finish_reason,
        Some(FinishReason::detailed("tool-calls", Some(json!("tool_use"))))
    );
    assert_eq!(
        steps[1].fields["usage"],
        json!({"inputTokens": 20, "outputTokens": 7, "totalTokens": 27, "cachedInputTokens": 4})
    );

    let types: Vec<&str> = result.fields["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec!["reasoning", "text", "tool-call", "tool-result", "text"]
    );
}

#[test]
fn collected_error_part_fails_the_call() {
    let (_, parts) = map_session(&[
        r#"{"type":"result","subtype":"error_during_execution","is_error":true,"result":"API Error: 401"}"#,
    ]);
    match collect_generate_result(parts) {
        Err(SdkError::Upstream { message }) => assert_eq!(message, "API Error: 401"),
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[test]
fn collected_login_failure_is_an_authentication_error() {
    let (_, parts) = map_session(&[
        r#"{"type":"result","subtype":"success","is_error":true,"result":"Invalid API key · Please run /login"}"#,
    ]);
    match collect_generate_result(parts) {
        Err(err) => {
            assert!(err.is_authentication_error(), "got {err:?}");
            assert_eq!(
                err.to_string(),
                "authentication failed: Invalid API key · Please run /login"
            );
        }
        Ok(result) => panic!("expected an error, got {result:?}"),
    }
}

#[test]
fn exit_failures_are_classified() {
    let err = exit_error("Error: not logged in\n".into(), Some(1));
    assert!(err.is_authentication_error());
    let metadata = err.metadata().expect("metadata");
    assert_eq!(metadata.exit_code, Some(1));
    assert_eq!(metadata.stderr.as_deref(), Some("Error: not logged in\n"));

    let err = exit_error("segmentation fault\n".into(), Some(139));
    match &err {
        SdkError::Process {
            message, exit_code, ..
        } => {
            assert_eq!(message, "segmentation fault");
            assert_eq!(*exit_code, Some(139));
        }
        other => panic!("expected process error, got {other:?}"),
    }

    let err = exit_error("  ".into(), Some(2));
    assert!(!err.is_authentication_error());
    assert_eq!(err.metadata().and_then(|m| m.stderr), None);
    assert!(is_auth_failure("OAuth token has expired"));
    assert!(!is_auth_failure("rate limited"));
}

#[test]
fn model_reports_v3_and_exposes_settings() {
    let model = ClaudeCliLanguageModel::new(
        "sonnet",
        settings(json!({"pathToClaudeCodeExecutable": "/bin/claude", "maxTurns": 2})),
    )
    .expect("model");
    assert_eq!(model.specification_version(), "v3");
    assert_eq!(model.provider_name(), "claude-code");
    assert_eq!(model.attribute("maxTurns"), Some(json!(2)));
    assert_eq!(model.attribute("missing"), None);
    assert_eq!(
        model.attribute("settings"),
        Some(json!({"pathToClaudeCodeExecutable": "/bin/claude", "maxTurns": 2}))
    );
    assert_eq!(model.settings().executable(), "/bin/claude");
}

#[tokio::test]
async fn missing_executable_is_a_process_error() {
    let model = ClaudeCliLanguageModel::new(
        "sonnet",
        settings(json!({"pathToClaudeCodeExecutable": "/nonexistent/dir/claude"})),
    )
    .expect("model");
    match model.do_stream(CallOptions::from_text("Hi", None)).await {
        Err(SdkError::Process {
            message, exit_code, ..
        }) => {
            assert!(message.contains("not found"), "{message}");
            assert_eq!(exit_code, None);
        }
        other => panic!("expected process error, got {other:?}"),
    }
}

#[cfg(unix)]
mod fake_cli {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Write an executable shell script standing in for the CLI.
    fn script(body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("claude-fake-{}.sh", uuid::Uuid::new_v4()));
        std::fs::write(&path, format!("#!/bin/sh\ncat > /dev/null\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn model_for(path: &Path) -> ClaudeCliLanguageModel {
        ClaudeCliLanguageModel::new(
            "sonnet",
            settings(json!({"pathToClaudeCodeExecutable": path.to_string_lossy()})),
        )
        .expect("model")
    }

    #[tokio::test]
    async fn runs_the_cli_and_normalizes_through_the_wrapper() {
        let path = script(
            r#"echo '{"type":"system","subtype":"init","session_id":"s-9"}'
echo '{"type":"assistant","message":{"content":[{"type":"text","text":"pong"}],"stop_reason":"end_turn"}}'
echo '{"type":"result","subtype":"success","is_error":false,"result":"pong","usage":{"input_tokens":1,"output_tokens":1}}'"#,
        );
        let model = wrap_language_model(Arc::new(model_for(&path)));

        let result = model
            .do_generate(CallOptions::from_text("ping", None))
            .await
            .expect("generate");
        assert_eq!(result.text(), "pong");
        assert_eq!(result.finish_reason, Some(FinishReason::unified("stop")));
        assert_eq!(
            result
                .steps
                .as_ref()
                .and_then(|steps| steps.iter_steps().next())
                .expect("step")
                .finish_reason,
            Some(FinishReason::unified("stop"))
        );

        let parts: Vec<StreamPart> = model
            .do_stream(CallOptions::from_text("ping", None))
            .await
            .expect("stream")
            .stream
            .try_collect()
            .await
            .expect("parts");
        match parts.last() {
            Some(StreamPart::Finish(p)) => {
                assert_eq!(p.finish_reason, FinishReason::unified("stop"))
            }
            other => panic!("expected finish, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failing_cli_surfaces_exit_code_and_stderr() {
        let path = script("echo 'disk full' >&2\nexit 3");
        let model = model_for(&path);

        let mut stream = model
            .do_stream(CallOptions::from_text("ping", None))
            .await
            .expect("stream")
            .stream;
        match stream.next().await {
            Some(Ok(StreamPart::StreamStart(_))) => {}
            other => panic!("expected stream-start, got {other:?}"),
        }
        match stream.next().await {
            Some(Err(SdkError::Process {
                message,
                exit_code,
                stderr,
            })) => {
                assert_eq!(message, "disk full");
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr.as_deref(), Some("disk full\n"));
            }
            other => panic!("expected process error, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn logged_out_cli_is_an_authentication_error() {
        let path = script("echo 'Invalid API key · Please run /login' >&2\nexit 1");
        let err = model_for(&path)
            .do_generate(CallOptions::from_text("ping", None))
            .await
            .expect_err("login failure");
        assert!(err.is_authentication_error(), "got {err:?}");
        assert_eq!(err.metadata().and_then(|m| m.exit_code), Some(1));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn silent_cli_times_out() {
        let path = script("sleep 5");
        let model = ClaudeCliLanguageModel::new(
            "sonnet",
            settings(json!({
                "pathToClaudeCodeExecutable": path.to_string_lossy(),
                "timeoutMs": 200
            })),
        )
        .expect("model");

        let mut stream = model
            .do_stream(CallOptions::from_text("ping", None))
            .await
            .expect("stream")
            .stream;
        assert!(matches!(stream.next().await, Some(Ok(StreamPart::StreamStart(_)))));
        match stream.next().await {
            Some(Err(err)) => assert!(err.is_timeout_error(), "got {err:?}"),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn clean_exit_without_result_finishes_as_other() {
        let path = script("exit 0");
        let result = model_for(&path)
            .do_generate(CallOptions::from_text("ping", None))
            .await
            .expect("generate");
        assert_eq!(
            result.finish_reason,
            Some(FinishReason::detailed("other", None))
        );
        assert_eq!(result.text(), "");
        let _ = std::fs::remove_file(path);
    }
}
