//! Login detection and the host's auth hook.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::plugin::config::PROVIDER_ID;
use crate::provider_claude_code::discovery::{FileSystem, RealFileSystem};
use crate::types::JsonMap;

const TRACE_PREFIX: &str = "[CLAUDE_CODE_AUTH]";

/// Environment variable overriding the CLI's configuration directory.
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";
pub const CREDENTIALS_FILE: &str = "credentials.json";
/// Opaque key handed to the host on successful activation.
pub const ACTIVE_KEY: &str = "claude-code-active";

pub const LABEL_LOGGED_IN: &str = "Activate (Claude CLI detected)";
pub const LABEL_LOGGED_OUT: &str = "Activate (requires `claude login` first)";

/// "Logged in" means the CLI's credentials file exists. Its contents are
/// never read.
#[derive(Clone)]
pub struct CredentialProbe {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl CredentialProbe {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    /// Credentials path for a config-dir override and a home directory.
    /// An unset or empty override falls back to `<home>/.claude`.
    pub fn resolve(config_dir: Option<OsString>, home: Option<&Path>) -> PathBuf {
        let dir = match config_dir.filter(|d| !d.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => home
                .map(|h| h.join(".claude"))
                .unwrap_or_else(|| PathBuf::from(".claude")),
        };
        dir.join(CREDENTIALS_FILE)
    }

    /// Probe configured from the process environment.
    pub fn from_env() -> Self {
        let home = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());
        let path = Self::resolve(std::env::var_os(CONFIG_DIR_ENV), home.as_deref());
        Self::new(path, Arc::new(RealFileSystem))
    }

    pub fn credentials_path(&self) -> &Path {
        &self.path
    }

    pub fn is_logged_in(&self) -> bool {
        self.fs.exists(&self.path)
    }
}

impl std::fmt::Debug for CredentialProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProbe")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthPrompt {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub key: &'static str,
    pub message: &'static str,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthMethod {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: &'static str,
    pub prompts: Vec<AuthPrompt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthOutcome {
    Success { key: String },
    Failed,
}

/// Provider description the host passes to the auth loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<JsonMap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// The `auth` hook for the `claude-code` provider.
#[derive(Debug, Clone)]
pub struct AuthHook {
    probe: CredentialProbe,
}

impl AuthHook {
    pub fn new(probe: CredentialProbe) -> Self {
        Self { probe }
    }

    pub fn provider(&self) -> &'static str {
        PROVIDER_ID
    }

    /// One API-style method whose label and prompts follow the login state
    /// at the time of the call.
    pub fn methods(&self) -> Vec<AuthMethod> {
        let logged_in = self.probe.is_logged_in();
        let prompts = if logged_in {
            Vec::new()
        } else {
            vec![AuthPrompt {
                kind: "text",
                key: "confirmation",
                message: "Run `claude login` first, then type 'ok' to continue",
                placeholder: "ok",
            }]
        };
        vec![AuthMethod {
            kind: "api",
            label: if logged_in {
                LABEL_LOGGED_IN
            } else {
                LABEL_LOGGED_OUT
            },
            prompts,
        }]
    }

    /// Prompt inputs are not inspected; only the credential probe decides.
    pub fn authorize(&self, _inputs: &HashMap<String, String>) -> AuthOutcome {
        if self.probe.is_logged_in() {
            AuthOutcome::Success {
                key: ACTIVE_KEY.to_string(),
            }
        } else {
            tracing::info!(
                "{}: no credentials at {}",
                TRACE_PREFIX,
                self.probe.credentials_path().display()
            );
            AuthOutcome::Failed
        }
    }

    /// Zero the cost of every model (usage is billed by the subscription)
    /// and return no extra provider options.
    pub fn load(&self, provider: Option<&mut ProviderInfo>) -> JsonMap {
        let models = provider.and_then(|p| p.models.as_mut());
        for model in models.into_iter().flat_map(|m| m.values_mut()) {
            if let JsonValue::Object(model) = model {
                model.insert(
                    "cost".into(),
                    json!({
                        "input": 0,
                        "output": 0,
                        "cache": {"read": 0, "write": 0}
                    }),
                );
            }
        }
        JsonMap::new()
    }
}
