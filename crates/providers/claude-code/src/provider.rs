use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::compat::wrap_language_model;
use crate::core::{LanguageModel, Provider, SdkError};
use crate::provider_claude_code::cli::provider::ClaudeCliProvider;
use crate::provider_claude_code::discovery::{ExecutableLocator, FileSystem, RealFileSystem};
use crate::provider_claude_code::settings::{SettingsFilter, EXECUTABLE_PATH_KEY};
use crate::types::Settings;

const TRACE_PREFIX: &str = "[CLAUDE_CODE]";

/// Construction options for [`create_claude_code`].
#[derive(Debug, Clone, Default)]
pub struct ClaudeCodeOptions {
    /// Settings applied to every model; per-model settings win.
    pub default_settings: Settings,
    pub filter: SettingsFilter,
    pub locator: ExecutableLocator,
}

impl ClaudeCodeOptions {
    pub fn with_default_setting(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.default_settings.insert(key.into(), value);
        self
    }

    pub fn with_filter(mut self, filter: SettingsFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_locator(mut self, locator: ExecutableLocator) -> Self {
        self.locator = locator;
        self
    }
}

/// Host-facing provider: filters per-model settings, delegates to the
/// underlying provider and presents every model on the v2 interface.
pub struct ClaudeCodeProvider {
    upstream: Arc<dyn Provider>,
    filter: SettingsFilter,
}

impl ClaudeCodeProvider {
    pub fn new(upstream: Arc<dyn Provider>, filter: SettingsFilter) -> Self {
        Self { upstream, filter }
    }

    pub fn upstream(&self) -> &Arc<dyn Provider> {
        &self.upstream
    }

    pub fn filter(&self) -> &SettingsFilter {
        &self.filter
    }
}

impl Provider for ClaudeCodeProvider {
    fn language_model(
        &self,
        model_id: &str,
        settings: Option<Settings>,
    ) -> Result<Arc<dyn LanguageModel>, SdkError> {
        let model = self
            .upstream
            .language_model(model_id, self.filter.apply(settings))?;
        Ok(wrap_language_model(model))
    }

    fn chat(
        &self,
        model_id: &str,
        settings: Option<Settings>,
    ) -> Result<Arc<dyn LanguageModel>, SdkError> {
        let model = self.upstream.chat(model_id, self.filter.apply(settings))?;
        Ok(wrap_language_model(model))
    }
}

/// Create the provider against the real filesystem.
pub fn create_claude_code(options: ClaudeCodeOptions) -> ClaudeCodeProvider {
    create_claude_code_with(options, &RealFileSystem)
}

/// Create the provider, resolving the CLI executable once through `fs`.
///
/// The resolved path becomes a default setting of every model unless the
/// options or the per-model settings set `pathToClaudeCodeExecutable`.
pub fn create_claude_code_with(options: ClaudeCodeOptions, fs: &dyn FileSystem) -> ClaudeCodeProvider {
    let ClaudeCodeOptions {
        default_settings,
        filter,
        locator,
    } = options;

    let mut defaults = Settings::new();
    if !default_settings.contains_key(EXECUTABLE_PATH_KEY) {
        let path = locator.locate(fs);
        tracing::info!("{}: using executable {}", TRACE_PREFIX, path.display());
        defaults.insert(
            EXECUTABLE_PATH_KEY.to_string(),
            JsonValue::String(path.to_string_lossy().into_owned()),
        );
    }
    defaults.extend(default_settings);

    ClaudeCodeProvider::new(Arc::new(ClaudeCliProvider::new(defaults)), filter)
}
