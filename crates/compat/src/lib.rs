//! Version adapter between a v3-shaped language model and v2-shaped callers.
//!
//! - finish_reason.rs: finish reason normalization
//! - result.rs: generate result normalization (one level into `steps`)
//! - stream.rs: element-wise stream normalization with cancellation
//! - model.rs: the wrapping `LanguageModel`

pub mod finish_reason;
pub mod model;
pub mod result;
pub mod stream;

pub use finish_reason::{normalize_finish_reason, normalize_finish_reason_value};
pub use model::{wrap_language_model, V2CompatModel, V2_SPECIFICATION_VERSION};
pub use result::normalize_generate_result;
pub use stream::{normalize_stream_part, V2CompatStream};

#[cfg(test)]
#[path = "../tests/normalize_tests.rs"]
mod normalize_tests;

#[cfg(test)]
#[path = "../tests/stream_tests.rs"]
mod stream_tests;

#[cfg(test)]
#[path = "../tests/model_tests.rs"]
mod model_tests;
