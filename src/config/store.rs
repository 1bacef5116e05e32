use crate::adapters::FileSystemStorage;
#[cfg(feature = "aws")]
use crate::adapters::S3Storage;
use crate::core::blob_storage::BlobStorage;
use crate::domain::model::StorageLocation;
use crate::domain::ports::Storage;
use crate::utils::error::{ModelStoreError, Result};
use std::path::PathBuf;

pub const AWS_BUCKET_ENV_KEY: &str = "MODEL_STORE_AWS_BUCKET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Backend {
    Filesystem,
    Aws,
}

impl std::str::FromStr for Backend {
    type Err = ModelStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "filesystem" => Ok(Backend::Filesystem),
            "aws" => Ok(Backend::Aws),
            other => Err(ModelStoreError::InvalidConfigValueError {
                field: "backend".to_string(),
                value: other.to_string(),
                reason: "Supported backends: filesystem, aws".to_string(),
            }),
        }
    }
}

/// Where a store lives.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct StoreOptions {
    /// Storage backend
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value = "filesystem"))]
    pub backend: Option<Backend>,

    /// Root directory of a file system store (defaults to the home directory)
    #[cfg_attr(feature = "cli", arg(long))]
    pub root: Option<PathBuf>,

    /// S3 bucket of an aws store
    #[cfg_attr(feature = "cli", arg(long, env = "MODEL_STORE_AWS_BUCKET"))]
    pub bucket: Option<String>,

    /// AWS region override
    #[cfg_attr(feature = "cli", arg(long))]
    pub region: Option<String>,

    /// Key prefix for every object in the store
    #[cfg_attr(feature = "cli", arg(long, env = "MODEL_STORE_ROOT_PREFIX"))]
    pub root_prefix: Option<String>,
}

/// Storage chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyStorage {
    FileSystem(FileSystemStorage),
    #[cfg(feature = "aws")]
    S3(S3Storage),
}

impl Storage for AnyStorage {
    async fn read_file(&self, key: &str) -> Result<Vec<u8>> {
        match self {
            AnyStorage::FileSystem(s) => s.read_file(key).await,
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.read_file(key).await,
        }
    }

    async fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
        match self {
            AnyStorage::FileSystem(s) => s.write_file(key, data).await,
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.write_file(key, data).await,
        }
    }

    async fn remove_file(&self, key: &str) -> Result<bool> {
        match self {
            AnyStorage::FileSystem(s) => s.remove_file(key).await,
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.remove_file(key).await,
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self {
            AnyStorage::FileSystem(s) => s.exists(key).await,
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.exists(key).await,
        }
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        match self {
            AnyStorage::FileSystem(s) => s.list_files(prefix).await,
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.list_files(prefix).await,
        }
    }

    fn location(&self, key: &str) -> StorageLocation {
        match self {
            AnyStorage::FileSystem(s) => s.location(key),
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.location(key),
        }
    }

    fn key_for(&self, location: &StorageLocation) -> Result<String> {
        match self {
            AnyStorage::FileSystem(s) => s.key_for(location),
            #[cfg(feature = "aws")]
            AnyStorage::S3(s) => s.key_for(location),
        }
    }
}

impl StoreOptions {
    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or(Backend::Filesystem)
    }

    fn file_system_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::home_dir().ok_or_else(|| ModelStoreError::ConfigError {
                message: "Cannot find the home directory; pass --root".to_string(),
            }),
        }
    }

    /// Builds the store these options describe.
    pub async fn open(&self) -> Result<BlobStorage<AnyStorage>> {
        let storage = match self.backend() {
            Backend::Filesystem => {
                let root = self.file_system_root()?;
                tracing::info!("🏦 Using store in: {}", root.display());
                AnyStorage::FileSystem(FileSystemStorage::new(root))
            }
            Backend::Aws => self.open_s3().await?,
        };
        Ok(BlobStorage::new(storage, self.root_prefix.clone()))
    }

    #[cfg(feature = "aws")]
    async fn open_s3(&self) -> Result<AnyStorage> {
        let bucket = self
            .bucket
            .clone()
            .or_else(|| std::env::var(AWS_BUCKET_ENV_KEY).ok())
            .ok_or_else(|| ModelStoreError::ConfigError {
                message: format!("{} environment variable or --bucket is required", AWS_BUCKET_ENV_KEY),
            })?;
        tracing::info!("🏦 Using store in bucket: {}", bucket);
        Ok(AnyStorage::S3(
            S3Storage::from_env(bucket, self.region.clone()).await,
        ))
    }

    #[cfg(not(feature = "aws"))]
    async fn open_s3(&self) -> Result<AnyStorage> {
        Err(ModelStoreError::ConfigError {
            message: "This build has no aws support; rebuild with --features aws".to_string(),
        })
    }
}
