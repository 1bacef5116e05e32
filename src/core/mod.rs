pub mod blob_storage;
pub mod manifest;
pub mod paths;
pub mod states;

pub use crate::domain::model::{ModelMeta, StorageLocation};
pub use crate::domain::ports::{CommandRunner, Storage};
pub use crate::utils::error::Result;
