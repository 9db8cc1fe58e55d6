//! Claude Code provider.
//!
//! - settings.rs: per-model settings deny-list and merging
//! - discovery.rs: CLI executable discovery over an injectable filesystem
//! - provider.rs: host-facing provider factory (filter, delegate, wrap as v2)
//! - cli/: the underlying provider, one `claude -p` process per call

pub mod cli {
    pub mod errors;
    pub mod events;
    pub mod invocation;
    pub mod language_model;
    pub mod mapper;
    pub mod options;
    pub mod provider;
}
pub mod discovery;
pub mod provider;
pub mod settings;

pub use cli::language_model::ClaudeCliLanguageModel;
pub use cli::provider::ClaudeCliProvider;
pub use discovery::{ExecutableLocator, FileSystem, RealFileSystem};
pub use provider::{create_claude_code, create_claude_code_with, ClaudeCodeOptions, ClaudeCodeProvider};
pub use settings::{merge_settings, SettingsFilter};

#[cfg(test)]
#[path = "../tests/settings_tests.rs"]
mod settings_tests;

#[cfg(test)]
#[path = "../tests/discovery_tests.rs"]
mod discovery_tests;

#[cfg(test)]
#[path = "../tests/provider_tests.rs"]
mod provider_tests;

#[cfg(test)]
#[path = "../tests/cli_tests.rs"]
mod cli_tests;
