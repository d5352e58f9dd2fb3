use crate::blob::{Blob, WaitPolicy};
use crate::error::Error;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::{Instant, sleep};

#[derive(Clone)]
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    async fn head(&self, bucket: &str, key: &str) -> Result<Option<OffsetDateTime>, Error> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => Ok(output
                .last_modified
                .and_then(|dt| OffsetDateTime::from_unix_timestamp(dt.secs()).ok())),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(None)
                } else {
                    Err(Error::S3(anyhow::Error::new(service_err)))
                }
            }
        }
    }
}

impl Blob for S3Backend {
    async fn get_last_modified(
        &self,
        bucket: &str,
        key: &str,
        wait: Option<WaitPolicy>,
    ) -> Result<Option<OffsetDateTime>, Error> {
        match wait {
            None => self.head(bucket, key).await,
            Some(policy) => {
                let deadline = Instant::now() + policy.timeout;
                loop {
                    if let Some(found) = self.head(bucket, key).await? {
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
        let mut keys = Vec::new();
        let mut continuation_token = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }
            let output = request
                .send()
                .await
                .map_err(|err| Error::S3(anyhow::Error::new(err.into_service_error())))?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }
        Ok(keys)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, Error> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Error::S3(anyhow::Error::new(err.into_service_error())))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| Error::S3(anyhow::Error::new(err)))?
            .into_bytes();
        Ok(bytes)
    }

    async fn put_json<T: Serialize + Sync>(&self, bucket: &str, key: &str, doc: &T) -> Result<(), Error> {
        let body = serde_json::to_vec(doc)?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| Error::S3(anyhow::Error::new(err.into_service_error())))?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, keys: &[String]) -> Result<(), Error> {
        for key in keys {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| Error::S3(anyhow::Error::new(err.into_service_error())))?;
        }
        Ok(())
    }
}
