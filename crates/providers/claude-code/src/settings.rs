use std::collections::BTreeSet;

use crate::types::Settings;

/// Settings key the CLI provider reads the executable path from.
pub const EXECUTABLE_PATH_KEY: &str = "pathToClaudeCodeExecutable";

/// Deny-list of per-model settings keys that belong to the host's provider
/// contract (credentials, transport, display) and must not reach the
/// underlying Claude Code provider.
///
/// The list is tied to the underlying provider version; newer versions that
/// grow transport-only keys get a new constant or an extended filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFilter {
    denied: BTreeSet<String>,
}

impl SettingsFilter {
    /// Keys dropped for the first supported provider version.
    pub const V1_KEYS: [&'static str; 6] =
        ["apiKey", "baseURL", "headers", "fetch", "name", "includeUsage"];

    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denied: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn v1() -> Self {
        Self::new(Self::V1_KEYS)
    }

    /// Extend the deny-list by one key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.denied.insert(key.into());
        self
    }

    pub fn is_denied(&self, key: &str) -> bool {
        self.denied.contains(key)
    }

    /// Drop denied keys. Returns `None` when nothing was supplied or nothing
    /// is left, so the underlying provider sees "no settings" rather than an
    /// empty map.
    pub fn apply(&self, settings: Option<Settings>) -> Option<Settings> {
        let filtered: Settings = settings?
            .into_iter()
            .filter(|(key, _)| !self.is_denied(key))
            .collect();
        if filtered.is_empty() {
            None
        } else {
            Some(filtered)
        }
    }
}

impl Default for SettingsFilter {
    fn default() -> Self {
        Self::v1()
    }
}

/// Shallow merge: keys in `overrides` replace those in `defaults`.
pub fn merge_settings(defaults: &Settings, overrides: Option<Settings>) -> Settings {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key, value);
        }
    }
    merged
}
