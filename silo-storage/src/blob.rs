use crate::error::Error;
use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;

/// How long, and how often, [`Blob::get_last_modified`] should poll for a key that doesn't
/// exist yet before giving up.
#[derive(Clone, Copy, Debug)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// The object-store collaborator.
///
/// Implementations must be cheap to clone (connection pools, not fresh sessions per call).
pub trait Blob: Send + Sync {
    /// The object's last-modified timestamp, or `None` if it doesn't exist. When `wait` is
    /// `Some`, polls until the object appears or the policy's timeout elapses.
    fn get_last_modified(
        &self,
        bucket: &str,
        key: &str,
        wait: Option<WaitPolicy>,
    ) -> impl Future<Output = Result<Option<OffsetDateTime>, Error>> + Send;

    fn list(&self, bucket: &str, prefix: &str) -> impl Future<Output = Result<Vec<String>, Error>> + Send;

    fn get(&self, bucket: &str, key: &str) -> impl Future<Output = Result<Bytes, Error>> + Send;

    fn put_json<T: Serialize + Sync>(
        &self,
        bucket: &str,
        key: &str,
        doc: &T,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn delete(&self, bucket: &str, keys: &[String]) -> impl Future<Output = Result<(), Error>> + Send;
}
