use crate::domain::model::StorageLocation;
use crate::domain::ports::Storage;
use crate::utils::error::{ModelStoreError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;

/// Blob storage in an AWS S3 bucket. The bucket must already exist.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Builds a client from the default credential chain, optionally pinned
    /// to a region.
    pub async fn from_env(bucket: String, region: Option<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&config);
        if let Some(region) = region {
            builder = builder.region(aws_sdk_s3::config::Region::new(region));
        }
        Self::new(S3Client::from_conf(builder.build()), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn storage_error(action: &str, key: &str, err: impl std::fmt::Display) -> ModelStoreError {
        ModelStoreError::StorageError {
            message: format!("Failed to {} s3://{}: {}", action, key, err),
        }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::storage_error("read", key, e.into_service_error()))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| Self::storage_error("collect", key, e))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| Self::storage_error("write", key, e.into_service_error()))?;
        Ok(())
    }

    async fn remove_file(&self, key: &str) -> Result<bool> {
        if !self.exists(key).await? {
            return Ok(false);
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::storage_error("delete", key, e.into_service_error()))?;
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(Self::storage_error(
                        "stat",
                        key,
                        service_error.message().unwrap_or("unknown error"),
                    ))
                }
            }
        }
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .delimiter("/")
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| Self::storage_error("list", &prefix, e.into_service_error()))?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn location(&self, key: &str) -> StorageLocation {
        StorageLocation::AwsS3 {
            bucket: self.bucket.clone(),
            prefix: key.to_string(),
        }
    }

    fn key_for(&self, location: &StorageLocation) -> Result<String> {
        match location {
            StorageLocation::AwsS3 { bucket, prefix } if *bucket == self.bucket => {
                Ok(prefix.clone())
            }
            other => Err(ModelStoreError::StorageError {
                message: format!(
                    "Bucket {} cannot read location {:?}",
                    self.bucket, other
                ),
            }),
        }
    }
}
