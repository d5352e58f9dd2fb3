pub mod blob;
pub mod dispatch;
pub mod error;
pub mod fs;
pub mod s3;

pub use blob::{Blob, WaitPolicy};
pub use dispatch::BlobBackend;
pub use error::Error;
pub use fs::FileSystemBackend;
pub use s3::S3Backend;
