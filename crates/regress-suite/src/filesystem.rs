//! Filesystem-based baseline storage implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::store::{BaselineError, BaselineStore};
use crate::Suite;

/// Filesystem implementation of the BaselineStore trait.
///
/// Stores the baseline as a single pretty-printed JSON document.
pub struct FilesystemStore {
    path: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the baseline file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encode a suite as the on-disk baseline document.
///
/// Two-space indentation and a trailing newline, so regenerated baselines diff
/// cleanly under version control.
pub(crate) fn encode_suite(suite: &Suite) -> Result<String, BaselineError> {
    let mut stripped = suite.clone();
    stripped.strip_ids();
    let mut encoded = serde_json::to_string_pretty(&stripped)?;
    encoded.push('\n');
    Ok(encoded)
}

#[async_trait]
impl BaselineStore for FilesystemStore {
    async fn save(&self, suite: &Suite) -> Result<(), BaselineError> {
        let encoded = encode_suite(suite)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| BaselineError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&self.path, encoded).map_err(|source| BaselineError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(
            "Stored baseline with {} queries to {}",
            suite.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn load(&self) -> Result<Suite, BaselineError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BaselineError::NotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(BaselineError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let suite: Suite = serde_json::from_str(&content).map_err(|source| BaselineError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            "Loaded baseline with {} queries from {}",
            suite.len(),
            self.path.display()
        );
        Ok(suite)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
