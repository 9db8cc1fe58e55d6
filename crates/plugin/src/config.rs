use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::SdkError;
use crate::types::catalog::{
    ModelCapabilities, ModelCost, ModelInfo, ModelLimits, ProviderRegistration,
};
use crate::types::JsonMap;

/// Provider id the plugin registers under.
pub const PROVIDER_ID: &str = "claude-code";
pub const PROVIDER_NAME: &str = "Claude Code";
pub const PROVIDER_API: &str = "local://claude-code";

const CONTEXT_LIMIT: u64 = 200_000;
const OUTPUT_LIMIT: u64 = 16_384;

/// Model aliases accepted by the Claude Code CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaudeModel {
    #[default]
    Sonnet,
    Opus,
    Haiku,
}

impl ClaudeModel {
    pub const ALL: [ClaudeModel; 3] = [ClaudeModel::Sonnet, ClaudeModel::Opus, ClaudeModel::Haiku];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaudeModel::Sonnet => "sonnet",
            ClaudeModel::Opus => "opus",
            ClaudeModel::Haiku => "haiku",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClaudeModel::Sonnet => "Sonnet",
            ClaudeModel::Opus => "Opus",
            ClaudeModel::Haiku => "Haiku",
        }
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            id: self.as_str().to_string(),
            name: self.display_name().to_string(),
            capabilities: ModelCapabilities {
                attachment: true,
                reasoning: !matches!(self, ClaudeModel::Haiku),
                temperature: false,
                tool_call: true,
            },
            cost: ModelCost::free(),
            limit: ModelLimits {
                context: CONTEXT_LIMIT,
                output: OUTPUT_LIMIT,
            },
        }
    }
}

/// The host configuration, as far as the plugin touches it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<JsonMap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Registration record for the `claude-code` provider.
pub fn provider_registration() -> ProviderRegistration {
    ProviderRegistration {
        name: PROVIDER_NAME.to_string(),
        api: PROVIDER_API.to_string(),
        models: ClaudeModel::ALL
            .iter()
            .map(|m| (m.as_str().to_string(), m.info()))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Insert (or replace) the provider entry, creating the provider table when
/// the host config has none. Other providers are left alone.
pub fn register_provider(config: &mut HostConfig) -> Result<(), SdkError> {
    let registration = serde_json::to_value(provider_registration())?;
    config
        .provider
        .get_or_insert_with(JsonMap::new)
        .insert(PROVIDER_ID.to_string(), registration);
    Ok(())
}
