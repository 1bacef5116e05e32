// Adapters layer: concrete implementations of the domain ports.

pub mod local;
pub mod process;
#[cfg(feature = "aws")]
pub mod s3;

pub use local::FileSystemStorage;
pub use process::ProcessRunner;
#[cfg(feature = "aws")]
pub use s3::S3Storage;
