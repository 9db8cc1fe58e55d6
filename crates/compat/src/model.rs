use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::compat::result::normalize_generate_result;
use crate::compat::stream::V2CompatStream;
use crate::core::{LanguageModel, SdkError, StreamResponse};
use crate::types::{CallOptions, GenerateResult};

/// Version reported by every wrapped model.
pub const V2_SPECIFICATION_VERSION: &str = "v2";

/// Presents a v3-shaped model to v2 callers.
///
/// `do_generate` and `do_stream` are forwarded and their output normalized;
/// everything else is forwarded verbatim, including whether `do_generate`
/// exists at all. Errors from the wrapped model are returned unchanged.
///
/// Capabilities outside [`LanguageModel`] are not visible through the
/// wrapper; reach them through [`attribute`](LanguageModel::attribute) or
/// [`inner`](Self::inner).
pub struct V2CompatModel {
    inner: Arc<dyn LanguageModel>,
}

impl V2CompatModel {
    pub fn new(inner: Arc<dyn LanguageModel>) -> Self {
        Self { inner }
    }

    /// The wrapped model.
    pub fn inner(&self) -> &Arc<dyn LanguageModel> {
        &self.inner
    }
}

/// Wrap `model` so that its results follow the v2 shape.
pub fn wrap_language_model(model: Arc<dyn LanguageModel>) -> Arc<dyn LanguageModel> {
    Arc::new(V2CompatModel::new(model))
}

#[async_trait::async_trait]
impl LanguageModel for V2CompatModel {
    fn specification_version(&self) -> &str {
        V2_SPECIFICATION_VERSION
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn supported_urls(&self) -> HashMap<String, Vec<String>> {
        self.inner.supported_urls()
    }

    fn supports_generate(&self) -> bool {
        self.inner.supports_generate()
    }

    fn attribute(&self, name: &str) -> Option<JsonValue> {
        self.inner.attribute(name)
    }

    #[instrument(name = "v2_compat.do_generate", skip_all, fields(model = %self.inner.model_id()))]
    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResult, SdkError> {
        let result = self.inner.do_generate(options).await?;
        Ok(normalize_generate_result(result))
    }

    #[instrument(name = "v2_compat.do_stream", skip_all, fields(model = %self.inner.model_id()))]
    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, SdkError> {
        let StreamResponse {
            stream,
            request,
            response,
            extra,
        } = self.inner.do_stream(options).await?;
        Ok(StreamResponse {
            stream: V2CompatStream::new(stream).into_part_stream(),
            request,
            response,
            extra,
        })
    }
}
