use std::sync::Arc;

use crate::core::{LanguageModel, SdkError};
use crate::types::Settings;

/// Something that hands out language models by id.
///
/// `settings` is `None` when the caller supplied no per-model settings at all,
/// which providers may treat differently from an empty map.
pub trait Provider: Send + Sync {
    fn language_model(
        &self,
        model_id: &str,
        settings: Option<Settings>,
    ) -> Result<Arc<dyn LanguageModel>, SdkError>;

    fn chat(
        &self,
        model_id: &str,
        settings: Option<Settings>,
    ) -> Result<Arc<dyn LanguageModel>, SdkError> {
        self.language_model(model_id, settings)
    }
}
