use crate::domain::model::StorageLocation;
use crate::domain::ports::Storage;
use crate::utils::error::{ModelStoreError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Blob storage in a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root_dir: PathBuf,
}

impl FileSystemStorage {
    pub fn new<P: Into<PathBuf>>(root_dir: P) -> Self {
        let root_dir = root_dir.into();
        let root_dir = std::path::absolute(&root_dir).unwrap_or(root_dir);
        Self { root_dir }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn full_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root_dir.clone(), |path, segment| path.join(segment))
    }

    fn key_from_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root_dir).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }
}

impl Storage for FileSystemStorage {
    async fn read_file(&self, key: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.full_path(key)).await?;
        Ok(data)
    }

    async fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    async fn remove_file(&self, key: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.full_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.full_path(key)).await?)
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.full_path(prefix);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(key) = self.key_from_path(&entry.path()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn location(&self, key: &str) -> StorageLocation {
        StorageLocation::FileSystem {
            path: self.full_path(key).display().to_string(),
        }
    }

    fn key_for(&self, location: &StorageLocation) -> Result<String> {
        match location {
            StorageLocation::FileSystem { path } => self
                .key_from_path(Path::new(path))
                .ok_or_else(|| ModelStoreError::StorageError {
                    message: format!(
                        "Path {} is outside of {}",
                        path,
                        self.root_dir.display()
                    ),
                }),
            other => Err(ModelStoreError::StorageError {
                message: format!("File system storage cannot read location {:?}", other),
            }),
        }
    }
}
