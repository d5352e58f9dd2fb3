use crate::blob::{Blob, WaitPolicy};
use crate::error::Error;
use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::time::{Instant, sleep};

/// An object store emulated on the local filesystem, `bucket` mapping to a subdirectory of
/// `root`. Used for local development and tests; never for production extraction runs.
#[derive(Clone)]
pub struct FileSystemBackend {
    root: PathBuf,
}

impl FileSystemBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[cfg(any(test, feature = "_test-s3"))]
    pub async fn for_test() -> anyhow::Result<(Self, tempfile::TempDir)> {
        let tmp = tempfile::tempdir()?;
        Ok((Self::new(tmp.path()), tmp))
    }

    fn path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }

    async fn modified(path: &Path) -> Result<Option<OffsetDateTime>, Error> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(Some(OffsetDateTime::from(meta.modified()?))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl Blob for FileSystemBackend {
    async fn get_last_modified(
        &self,
        bucket: &str,
        key: &str,
        wait: Option<WaitPolicy>,
    ) -> Result<Option<OffsetDateTime>, Error> {
        let path = self.path(bucket, key);
        match wait {
            None => Self::modified(&path).await,
            Some(policy) => {
                let deadline = Instant::now() + policy.timeout;
                loop {
                    if let Some(found) = Self::modified(&path).await? {
                        return Ok(Some(found));
                    }
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    sleep(policy.poll_interval).await;
                }
            }
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, Error> {
        let dir = self.path(bucket, prefix);
        let mut keys = Vec::new();
        let mut stack = vec![dir.clone()];
        while let Some(current) = stack.pop() {
            let mut entries = match tokio::fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Ok(rel) = path.strip_prefix(&self.root.join(bucket)) {
                    keys.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, Error> {
        let path = self.path(bucket, key);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|_| Error::NotFound(format!("{bucket}/{key}")))?;
        Ok(Bytes::from(data))
    }

    async fn put_json<T: Serialize + Sync>(&self, bucket: &str, key: &str, doc: &T) -> Result<(), Error> {
        let path = self.path(bucket, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, keys: &[String]) -> Result<(), Error> {
        for key in keys {
            let path = self.path(bucket, key);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
