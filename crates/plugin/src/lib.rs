//! Host plugin glue for the Claude Code provider.
//!
//! - config.rs: provider registration inserted by the `config` hook
//! - auth.rs: credential probe and the `auth` hook
//! - tool.rs: the `claude-code-query` tool

pub mod auth;
pub mod config;
pub mod tool;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::{Provider, SdkError};
use crate::plugin::auth::{AuthHook, CredentialProbe};
use crate::plugin::config::{register_provider, ClaudeModel, HostConfig, PROVIDER_ID};
use crate::plugin::tool::QueryTool;
use crate::provider_claude_code::{create_claude_code, ClaudeCodeOptions};
use crate::types::JsonMap;

pub use auth::{AuthMethod, AuthOutcome, AuthPrompt, ProviderInfo};
pub use config::provider_registration;
pub use tool::QueryArgs;

const TRACE_PREFIX: &str = "[CLAUDE_CODE]";

/// System prompt preset of the Claude Code CLI.
pub const CLAUDE_CODE_PRESET: &str = "claude_code";

/// Host event as delivered to the `event` hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub properties: JsonMap,
}

impl HostEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: JsonMap::new(),
        }
    }
}

/// Event after which the plugin announces its models.
pub const SERVER_CONNECTED: &str = "server.connected";

/// The plugin: one provider shared by all hooks.
pub struct ClaudeCodePlugin {
    provider: Arc<dyn Provider>,
    probe: CredentialProbe,
}

impl ClaudeCodePlugin {
    /// Plugin over the real CLI, using the CLI's own system prompt preset
    /// and default permission mode.
    pub fn new() -> Self {
        let options = ClaudeCodeOptions::default()
            .with_default_setting(
                "systemPrompt",
                json!({"type": "preset", "preset": CLAUDE_CODE_PRESET}),
            )
            .with_default_setting("permissionMode", json!("default"));
        Self::with_parts(Arc::new(create_claude_code(options)), CredentialProbe::from_env())
    }

    pub fn with_parts(provider: Arc<dyn Provider>, probe: CredentialProbe) -> Self {
        Self { provider, probe }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// `config` hook.
    pub fn config(&self, config: &mut HostConfig) -> Result<(), SdkError> {
        register_provider(config)?;
        tracing::info!(
            "{}: registered provider with models: {}",
            TRACE_PREFIX,
            model_ids().join(", ")
        );
        Ok(())
    }

    /// `auth` hook.
    pub fn auth(&self) -> AuthHook {
        AuthHook::new(self.probe.clone())
    }

    /// Tools contributed by the plugin.
    pub fn tools(&self) -> Vec<QueryTool> {
        vec![QueryTool::new(self.provider.clone())]
    }

    /// `event` hook.
    pub fn event(&self, event: &HostEvent) {
        if event.kind == SERVER_CONNECTED {
            tracing::info!("{}: plugin loaded", TRACE_PREFIX);
            let qualified: Vec<String> = model_ids()
                .iter()
                .map(|id| format!("{PROVIDER_ID}/{id}"))
                .collect();
            tracing::info!(
                "{}: available models: {}",
                TRACE_PREFIX,
                qualified.join(", ")
            );
        }
    }
}

impl Default for ClaudeCodePlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn model_ids() -> Vec<&'static str> {
    ClaudeModel::ALL.iter().map(ClaudeModel::as_str).collect()
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;

#[cfg(test)]
#[path = "../tests/auth_tests.rs"]
mod auth_tests;

#[cfg(test)]
#[path = "../tests/tool_tests.rs"]
mod tool_tests;
