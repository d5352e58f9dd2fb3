use crate::blob::{Blob, WaitPolicy};
use crate::error::Error;
use crate::fs::FileSystemBackend;
use crate::s3::S3Backend;
use bytes::Bytes;
use serde::Serialize;
use time::OffsetDateTime;

/// A common backend, dispatching to the ones we support.
///
/// `Blob` returns `impl Future` from its methods, which is not object-safe — there is no
/// `dyn Blob`. Rather than propagate a generic backend type parameter through every caller
/// (extractor, manifest writer, CLI wiring), we dispatch on a closed enum instead.
#[derive(Clone)]
pub enum BlobBackend {
    S3(S3Backend),
    Filesystem(FileSystemBackend),
}

impl From<S3Backend> for BlobBackend {
    fn from(value: S3Backend) -> Self {
        Self::S3(value)
    }
}

impl From<FileSystemBackend> for BlobBackend {
    fn from(value: FileSystemBackend) -> Self {
        Self::Filesystem(value)
    }
}

impl Blob for BlobBackend {
    async fn get_last_modified(
        &self,
        bucket: &str,
        key: &str,
        wait: Option<WaitPolicy>,
    ) -> Result<Option<OffsetDateTime>, Error> {
        match self {
            Self::S3(backend) => backend.get_last_modified(bucket, key, wait).await,
            Self::Filesystem(backend) => backend.get_last_modified(bucket, key, wait).await,
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, Error> {
        match self {
            Self::S3(backend) => backend.list(bucket, prefix).await,
            Self::Filesystem(backend) => backend.list(bucket, prefix).await,
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, Error> {
        match self {
            Self::S3(backend) => backend.get(bucket, key).await,
            Self::Filesystem(backend) => backend.get(bucket, key).await,
        }
    }

    async fn put_json<T: Serialize + Sync>(&self, bucket: &str, key: &str, doc: &T) -> Result<(), Error> {
        match self {
            Self::S3(backend) => backend.put_json(bucket, key, doc).await,
            Self::Filesystem(backend) => backend.put_json(bucket, key, doc).await,
        }
    }

    async fn delete(&self, bucket: &str, keys: &[String]) -> Result<(), Error> {
        match self {
            Self::S3(backend) => backend.delete(bucket, keys).await,
            Self::Filesystem(backend) => backend.delete(bucket, keys).await,
        }
    }
}
