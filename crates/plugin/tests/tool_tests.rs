use crate::core::{LanguageModel, Provider, SdkError, StreamResponse};
use crate::plugin::config::ClaudeModel;
use crate::plugin::tool::{QueryArgs, QueryTool};
use crate::types::{CallOptions, FinishReason, GenerateResult, Settings};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Seen {
    model_ids: Vec<String>,
    options: Vec<CallOptions>,
}

struct EchoModel {
    id: String,
    seen: Arc<Mutex<Seen>>,
    fail: bool,
}

#[async_trait]
impl LanguageModel for EchoModel {
    fn specification_version(&self) -> &str {
        "v2"
    }
    fn provider_name(&self) -> &str {
        "claude-code"
    }
    fn model_id(&self) -> &str {
        &self.id
    }
    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResult, SdkError> {
        self.seen.lock().unwrap().options.push(options);
        if self.fail {
            return Err(SdkError::Process {
                message: "Invalid API key".into(),
                exit_code: Some(1),
                stderr: None,
            });
        }
        Ok(GenerateResult::new()
            .with_finish_reason(FinishReason::unified("stop"))
            .with_field("content", json!([{"type": "text", "text": "4"}]))
            .with_field("usage", json!({"inputTokens": 5, "outputTokens": 1})))
    }
    async fn do_stream(&self, _options: CallOptions) -> Result<StreamResponse, SdkError> {
        Err(SdkError::unsupported("do_stream"))
    }
}

struct EchoProvider {
    seen: Arc<Mutex<Seen>>,
    fail: bool,
}

impl Provider for EchoProvider {
    fn language_model(
        &self,
        model_id: &str,
        _settings: Option<Settings>,
    ) -> Result<Arc<dyn LanguageModel>, SdkError> {
        self.seen.lock().unwrap().model_ids.push(model_id.to_string());
        Ok(Arc::new(EchoModel {
            id: model_id.to_string(),
            seen: self.seen.clone(),
            fail: self.fail,
        }))
    }
}

fn tool(fail: bool) -> (QueryTool, Arc<Mutex<Seen>>) {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let provider = EchoProvider {
        seen: seen.clone(),
        fail,
    };
    (QueryTool::new(Arc::new(provider)), seen)
}

fn parse(output: &str) -> JsonValue {
    serde_json::from_str(output).expect("tool output is JSON")
}

#[tokio::test]
async fn successful_query_returns_text_and_usage() {
    let (tool, seen) = tool(false);
    let output = tool
        .execute(QueryArgs {
            model: ClaudeModel::Opus,
            prompt: "What is 2+2?".into(),
            system: Some("Answer with a digit".into()),
        })
        .await;

    assert_eq!(
        parse(&output),
        json!({
            "success": true,
            "text": "4",
            "usage": {"inputTokens": 5, "outputTokens": 1}
        })
    );
    let seen = seen.lock().unwrap();
    assert_eq!(seen.model_ids, vec!["opus".to_string()]);
    assert_eq!(
        seen.options[0],
        CallOptions::from_text("What is 2+2?", Some("Answer with a digit"))
    );
}

#[tokio::test]
async fn model_defaults_to_sonnet() {
    let (tool, seen) = tool(false);
    let output = tool.execute_json(json!({"prompt": "hi"})).await;
    assert_eq!(parse(&output)["success"], json!(true));
    assert_eq!(seen.lock().unwrap().model_ids, vec!["sonnet".to_string()]);
    assert_eq!(seen.lock().unwrap().options[0].system_text(), None);
}

#[tokio::test]
async fn model_failure_is_reported_not_raised() {
    let (tool, _) = tool(true);
    let output = tool
        .execute(QueryArgs {
            model: ClaudeModel::Haiku,
            prompt: "hi".into(),
            system: None,
        })
        .await;
    let value = parse(&output);
    assert_eq!(value["success"], json!(false));
    let error = value["error"].as_str().expect("error message");
    assert!(error.contains("Invalid API key"), "{error}");
    assert!(error.contains("exit code 1"), "{error}");
    assert!(value.get("text").is_none());
}

#[tokio::test]
async fn invalid_arguments_are_reported() {
    let (tool, seen) = tool(false);
    for args in [json!({}), json!({"prompt": "hi", "model": "gpt-4"})] {
        let value = parse(&tool.execute_json(args).await);
        assert_eq!(value["success"], json!(false));
        assert!(value["error"].is_string());
    }
    assert!(seen.lock().unwrap().model_ids.is_empty());
}

#[test]
fn describes_its_parameters() {
    let (tool, _) = tool(false);
    assert_eq!(tool.name(), "claude-code-query");
    assert!(tool.description().starts_with("Execute a direct query"));
    let schema = tool.parameters();
    assert_eq!(schema["required"], json!(["prompt"]));
    assert_eq!(
        schema["properties"]["model"]["enum"],
        json!(["sonnet", "opus", "haiku"])
    );
    assert_eq!(schema["properties"]["model"]["default"], json!("sonnet"));
}
