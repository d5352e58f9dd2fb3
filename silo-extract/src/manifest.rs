use crate::error::RuntimeError;
use serde::{Deserialize, Serialize};
use silo_relation::RelationDescription;
use silo_storage::{Blob, BlobBackend, WaitPolicy};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub url: String,
    pub mandatory: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadManifest {
    pub entries: Vec<ManifestEntry>,
}

/// Waits for the upstream `_SUCCESS` sentinel, collects the produced CSV part files, and
/// uploads the load manifest for one relation.
pub struct ManifestWriter {
    pub needs_to_wait: bool,
    pub dry_run: bool,
    pub wait_policy: WaitPolicy,
}

impl ManifestWriter {
    pub fn new(needs_to_wait: bool, dry_run: bool) -> Self {
        Self {
            needs_to_wait,
            dry_run,
            wait_policy: WaitPolicy::default(),
        }
    }

    pub async fn write(
        &self,
        blob: &BlobBackend,
        relation: &RelationDescription,
        source_bucket: &str,
        source_prefix: &str,
    ) -> Result<(), RuntimeError> {
        let success_key = format!("{source_prefix}/_SUCCESS");
        let wait = (self.needs_to_wait && !self.dry_run).then_some(self.wait_policy);

        let found = blob.get_last_modified(source_bucket, &success_key, wait).await?;
        if found.is_none() {
            if self.dry_run {
                log::warn!("dry-run: proceeding without '_SUCCESS' sentinel at '{success_key}'");
            } else {
                return Err(RuntimeError::MissingCsvFiles(relation.identifier()));
            }
        }

        let mut files: Vec<String> = blob
            .list(source_bucket, source_prefix)
            .await?
            .into_iter()
            .filter(|key| key.contains("part") && key.ends_with(".gz"))
            .collect();
        files.sort();

        if files.is_empty() {
            if self.dry_run {
                log::warn!("dry-run: no data files found under 's3://{source_bucket}/{source_prefix}'");
            } else {
                return Err(RuntimeError::MissingCsvFiles(relation.identifier()));
            }
        }

        let manifest = LoadManifest {
            entries: files
                .into_iter()
                .map(|key| ManifestEntry {
                    url: format!("s3://{source_bucket}/{key}"),
                    mandatory: true,
                })
                .collect(),
        };

        if self.dry_run {
            log::info!("dry-run: skipping upload of manifest for '{}'", relation.identifier());
            return Ok(());
        }

        blob.put_json(relation.bucket_name(), &relation.manifest_file_name(), &manifest)
            .await?;
        Ok(())
    }
}
