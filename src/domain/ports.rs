use crate::domain::model::{Invocation, Outcome, StorageLocation};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A flat key/value blob store. Keys use `/` separators.
pub trait Storage: Send + Sync {
    fn read_file(&self, key: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Returns `false` when there was nothing to remove.
    fn remove_file(&self, key: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn exists(&self, key: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// Keys of the objects directly under `prefix`, not recursing into
    /// deeper levels. A missing prefix lists as empty.
    fn list_files(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    fn location(&self, key: &str) -> StorageLocation;
    fn key_for(&self, location: &StorageLocation) -> Result<String>;
}

/// Runs one external command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome>;
}
