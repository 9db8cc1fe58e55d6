//! Claude Code executable discovery.

use std::path::{Path, PathBuf};

/// Command name used when no candidate path exists; resolved through `PATH`
/// at spawn time.
pub const FALLBACK_EXECUTABLE: &str = "claude";

/// Read-only view of the filesystem used by discovery and credential probing.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Ordered candidate list plus a bare-name fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableLocator {
    candidates: Vec<PathBuf>,
    fallback: PathBuf,
}

impl ExecutableLocator {
    pub fn new(candidates: Vec<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            candidates,
            fallback: fallback.into(),
        }
    }

    /// Standard install locations for the `claude` CLI, relative to the
    /// current user's home directory.
    pub fn claude_default() -> Self {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::for_home(home.as_deref())
    }

    /// Standard install locations for a given home directory. Without a home
    /// directory the per-user location is skipped.
    pub fn for_home(home: Option<&Path>) -> Self {
        let mut candidates = Vec::with_capacity(3);
        if let Some(home) = home {
            candidates.push(home.join(".local").join("bin").join("claude"));
        }
        candidates.push(PathBuf::from("/usr/local/bin/claude"));
        candidates.push(PathBuf::from("/opt/homebrew/bin/claude"));
        Self::new(candidates, FALLBACK_EXECUTABLE)
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First existing candidate, else the fallback name.
    pub fn locate(&self, fs: &dyn FileSystem) -> PathBuf {
        match self.candidates.iter().find(|path| fs.exists(path)) {
            Some(path) => {
                tracing::debug!("[CLAUDE_CODE]: found executable at {}", path.display());
                path.clone()
            }
            None => {
                tracing::debug!(
                    "[CLAUDE_CODE]: no executable in standard locations, using `{}`",
                    self.fallback.display()
                );
                self.fallback.clone()
            }
        }
    }
}

impl Default for ExecutableLocator {
    fn default() -> Self {
        Self::claude_default()
    }
}
