pub mod error;
pub mod language_model;
pub mod provider;

pub use crate::core::error::{ErrorMetadata, SdkError};
pub use crate::core::language_model::{LanguageModel, PartStream, StreamResponse};
pub use crate::core::provider::Provider;

// Convenience re-exports of common types
pub use crate::types::{CallOptions, FinishReason, GenerateResult, Settings, StreamPart};

#[cfg(test)]
#[path = "../tests/error_tests.rs"]
mod error_tests;
