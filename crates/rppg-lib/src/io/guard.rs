use crate::error::{ProcessError, Result};
use std::path::{Component, Path, PathBuf};

/// Confines caller-supplied media paths to one directory tree.
#[derive(Debug, Clone)]
pub struct SourceGuard {
    root: PathBuf,
}

impl SourceGuard {
    pub fn new(root: &Path) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| {
            ProcessError::SourceUnavailable(format!("media root {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `query` against the root. Absolute paths and anything that
    /// lands outside the root after symlink resolution are rejected.
    pub fn resolve(&self, query: &str) -> Result<PathBuf> {
        let requested = Path::new(query);
        if query.is_empty()
            || requested.is_absolute()
            || requested
                .components()
                .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        {
            return Err(ProcessError::SourceRejected(query.to_string()));
        }
        let joined = self.root.join(requested);
        let resolved = match joined.canonicalize() {
            Ok(path) => path,
            Err(err) => {
                // A missing target may still be an escape attempt; report that first.
                if requested
                    .components()
                    .any(|c| matches!(c, Component::ParentDir))
                {
                    return Err(ProcessError::SourceRejected(query.to_string()));
                }
                return Err(ProcessError::SourceUnavailable(format!("{query}: {err}")));
            }
        };
        if !resolved.starts_with(&self.root) {
            return Err(ProcessError::SourceRejected(query.to_string()));
        }
        Ok(resolved)
    }
}
