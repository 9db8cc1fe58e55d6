//! Model catalog records handed to the host when registering a provider.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capability flags for a model as the host's registry describes them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelCapabilities {
    #[serde(default)]
    pub attachment: bool,
    #[serde(default)]
    pub reasoning: bool,
    #[serde(default)]
    pub temperature: bool,
    #[serde(default)]
    pub tool_call: bool,
}

/// Pricing metadata for a model, per million tokens.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelCost {
    #[serde(default)]
    pub input: f64,
    #[serde(default)]
    pub output: f64,
    #[serde(default)]
    pub cache_read: f64,
    #[serde(default)]
    pub cache_write: f64,
}

impl ModelCost {
    /// Subscription-backed models are billed outside the host.
    pub fn free() -> Self {
        Self::default()
    }
}

/// Token limits communicated to the host.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelLimits {
    pub context: u64,
    pub output: u64,
}

/// A single catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    /// Human-readable display name
    pub name: String,
    #[serde(flatten)]
    pub capabilities: ModelCapabilities,
    pub cost: ModelCost,
    pub limit: ModelLimits,
}

/// Provider registration record inserted into the host configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRegistration {
    pub name: String,
    /// Opaque API identifier; local providers use a `local://` scheme.
    pub api: String,
    pub models: BTreeMap<String, ModelInfo>,
}

impl ProviderRegistration {
    pub fn model_ids(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }
}
