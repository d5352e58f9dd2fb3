use crate::sqoop::SqoopStrategy;
use async_trait::async_trait;
use silo_common::DataWarehouseSchema;
use silo_extract::{ExtractStrategy, Process, RuntimeError};
use silo_relation::RelationDescription;
use silo_storage::BlobBackend;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs `/usr/bin/false` in place of the real Sqoop binary, so extraction always fails without
/// needing a cluster. Useful for exercising keep-going/fail-fast policy off-cluster.
pub struct FakeStrategy {
    inner: SqoopStrategy,
}

impl FakeStrategy {
    pub fn new(blob: BlobBackend, process: Arc<dyn Process>, scratch_dir: PathBuf, max_partitions: u32, dry_run: bool) -> Self {
        let mut inner = SqoopStrategy::new(blob, process, scratch_dir, max_partitions, dry_run);
        inner.sqoop_executable = "/usr/bin/false".to_string();
        Self { inner }
    }
}

#[async_trait]
impl ExtractStrategy for FakeStrategy {
    async fn extract_table(&self, source: &DataWarehouseSchema, relation: &RelationDescription) -> Result<(), RuntimeError> {
        self.inner.extract_table(source, relation).await
    }

    fn options_info(&self) -> String {
        self.inner.options_info()
    }
}
