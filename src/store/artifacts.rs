use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{ArtifactError, ArtifactStore};

/// Keeps rendered slips as files in one directory. Locators are full file paths.
pub struct FsArtifactStore {
    root: PathBuf,
    url_prefix: String,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Maps a bare file name to its path under the root.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        resolve_in(&self.root, file_name)
    }
}

/// Joins `file_name` onto `root`, refusing names with separators, parent references
/// or a leading dot.
pub fn resolve_in(root: &Path, file_name: &str) -> Option<PathBuf> {
    let invalid = file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\'])
        || file_name.contains("..");
    if invalid {
        None
    } else {
        Some(root.join(file_name))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, ArtifactError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| ArtifactError(format!("refusing to write artifact named {name:?}")))?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            ArtifactError(format!("cannot create {}: {e}", self.root.display()))
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ArtifactError(format!("cannot write {}: {e}", path.display())))?;

        debug!(path = %path.display(), "Artifact written");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, locator: &str) -> Result<(), ArtifactError> {
        match tokio::fs::remove_file(locator).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ArtifactError(format!("cannot remove {locator}: {e}"))),
        }
    }

    fn public_url(&self, locator: &str) -> String {
        match Path::new(locator).file_name() {
            Some(name) => format!("{}/{}", self.url_prefix, name.to_string_lossy()),
            None => self.url_prefix.clone(),
        }
    }
}
