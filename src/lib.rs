pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{FileSystemStorage, ProcessRunner};
#[cfg(feature = "aws")]
pub use adapters::S3Storage;
pub use app::{Bootstrap, MatrixRunner};
pub use config::bootstrap_config::BootstrapConfig;
pub use config::matrix_config::MatrixConfig;
pub use config::store::{AnyStorage, Backend, StoreOptions};
pub use core::blob_storage::BlobStorage;
pub use utils::error::{ModelStoreError, Result};
