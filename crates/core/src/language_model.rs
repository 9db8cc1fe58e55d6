//! Language model interface shared by the adapter and concrete providers.

use crate::core::SdkError;
use crate::types::{CallOptions, GenerateResult, JsonMap, StreamPart};
use futures_core::Stream;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Stream of structured parts from the model.
pub type PartStream = Pin<Box<dyn Stream<Item = Result<StreamPart, SdkError>> + Send>>;

/// Stream-open envelope.
pub struct StreamResponse {
    pub stream: PartStream,
    /// Request as sent to the model, when the provider records it.
    pub request: Option<JsonValue>,
    /// Response metadata (headers, process info), when available.
    pub response: Option<JsonValue>,
    /// Envelope fields this crate does not interpret.
    pub extra: JsonMap,
}

impl StreamResponse {
    pub fn new(stream: PartStream) -> Self {
        Self {
            stream,
            request: None,
            response: None,
            extra: JsonMap::new(),
        }
    }
}

impl std::fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResponse")
            .field("request", &self.request)
            .field("response", &self.response)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// Language model capability set.
///
/// Anything beyond the named operations is reachable through [`attribute`],
/// a read-only key/value channel that wrappers forward untouched.
///
/// [`attribute`]: LanguageModel::attribute
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Interface version the model's results follow, e.g. "v2" or "v3".
    fn specification_version(&self) -> &str;
    /// Provider name for logging/telemetry.
    fn provider_name(&self) -> &str;
    /// Provider-specific model identifier.
    fn model_id(&self) -> &str;
    /// Supported URL regex patterns by media type, lower-case URLs.
    fn supported_urls(&self) -> HashMap<String, Vec<String>> {
        Default::default()
    }
    /// Whether `do_generate` is implemented. Models that keep the default
    /// `do_generate` must return false.
    fn supports_generate(&self) -> bool {
        true
    }
    /// Model-specific property not covered by the methods above.
    fn attribute(&self, _name: &str) -> Option<JsonValue> {
        None
    }

    async fn do_generate(&self, _options: CallOptions) -> Result<GenerateResult, SdkError> {
        Err(SdkError::unsupported("do_generate"))
    }
    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, SdkError>;
}
