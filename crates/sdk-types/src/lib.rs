//! Wire shapes shared by the adapter, the Claude Code provider and the host plugin.
//!
//! The model-facing types are deliberately loose: only the fields the adapter
//! interprets are typed, everything else rides along in flattened JSON maps so
//! that newer provider output is carried through instead of dropped.

pub mod catalog;
pub mod finish;
pub mod generate;
pub mod json;
pub mod prompt;
pub mod stream;

pub use finish::FinishReason;
pub use generate::{GenerateResult, GenerateStep, StepEntry, Steps};
pub use json::{JsonMap, Settings};
pub use prompt::{CallOptions, PromptMessage, PromptPart};
pub use stream::StreamPart;

#[cfg(test)]
#[path = "../tests/wire_tests.rs"]
mod wire_tests;
