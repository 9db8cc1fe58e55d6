use std::sync::Arc;

use crate::core::{LanguageModel, Provider, SdkError};
use crate::provider_claude_code::cli::language_model::ClaudeCliLanguageModel;
use crate::provider_claude_code::settings::merge_settings;
use crate::types::Settings;

/// Provider handing out CLI-backed models. Per-model settings are merged
/// over `default_settings`.
#[derive(Debug, Clone, Default)]
pub struct ClaudeCliProvider {
    default_settings: Settings,
}

impl ClaudeCliProvider {
    pub fn new(default_settings: Settings) -> Self {
        Self { default_settings }
    }

    pub fn default_settings(&self) -> &Settings {
        &self.default_settings
    }

    pub fn cli_model(
        &self,
        model_id: &str,
        settings: Option<Settings>,
    ) -> Result<ClaudeCliLanguageModel, SdkError> {
        if model_id.trim().is_empty() {
            return Err(SdkError::InvalidArgument {
                message: "model id must not be empty".into(),
            });
        }
        ClaudeCliLanguageModel::new(model_id, merge_settings(&self.default_settings, settings))
    }
}

impl Provider for ClaudeCliProvider {
    fn language_model(
        &self,
        model_id: &str,
        settings: Option<Settings>,
    ) -> Result<Arc<dyn LanguageModel>, SdkError> {
        Ok(Arc::new(self.cli_model(model_id, settings)?))
    }
}
