//! Object storage backends for mirrored card images.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageError;

/// A place to publish image bytes under a key, yielding a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<String, StorageError>;
}

/// Stores objects as files under a directory that is served at
/// `public_base_url` by something else (a static file server or CDN origin).
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Filesystem path for a key. Keys must be relative and stay inside the root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write beside the target and rename so readers never see a partial file.
        let tmp = path.with_extension("part");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(self.url_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_must_stay_inside_root() {
        let store = LocalObjectStore::new("/srv/images", "https://cdn.example/");
        assert!(store.path_for("cards/normal/abc.jpg").is_ok());
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("/abs/path.jpg").is_err());
        assert!(store.path_for("").is_err());
        assert_eq!(
            store.url_for("cards/normal/abc.jpg"),
            "https://cdn.example/cards/normal/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://localhost:8080/img");
        let url = store
            .put("cards-back/large/x.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/img/cards-back/large/x.jpg");
        let written = std::fs::read(dir.path().join("cards-back/large/x.jpg")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
        assert!(!dir.path().join("cards-back/large/x.part").exists());
    }
}
