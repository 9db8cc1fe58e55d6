#[path = "../crates/sdk-types/src/lib.rs"]
pub mod types;
#[path = "../crates/core/src/lib.rs"]
pub mod core;
#[path = "../crates/compat/src/lib.rs"]
pub mod compat;

#[path = "../crates/providers/claude-code/src/lib.rs"]
pub mod provider_claude_code;

#[path = "../crates/plugin/src/lib.rs"]
pub mod plugin;

pub mod providers {
    pub use crate::provider_claude_code as claude_code;
}

pub use crate::compat::{wrap_language_model, V2CompatModel};
pub use crate::plugin::ClaudeCodePlugin;
pub use crate::provider_claude_code::{create_claude_code, ClaudeCodeOptions, ClaudeCodeProvider};
