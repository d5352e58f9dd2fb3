pub mod error;
pub mod fake;
pub mod partition;
pub mod sqoop;

pub use error::Error;
pub use fake::FakeStrategy;
pub use partition::determine_partitioning;
pub use sqoop::SqoopStrategy;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use silo_common::{DataWarehouseSchema, Dsn, TableName};
    use silo_extract::{Process, ProcessOutput, RuntimeError};
    use silo_relation::{RelationDescription, Scheme, TableFileSet};
    use silo_storage::{BlobBackend, FileSystemBackend};
    use std::sync::Arc;

    struct FailingProcess;

    #[async_trait]
    impl Process for FailingProcess {
        async fn run(&self, _program: &str, _args: &[String]) -> Result<ProcessOutput, std::io::Error> {
            Ok(ProcessOutput {
                status: 1,
                stdout: String::new(),
                stderr: "boom".to_string(),
            })
        }
    }

    async fn relation_with_design(tmp: &std::path::Path, design: &str) -> RelationDescription {
        let file_set = TableFileSet {
            scheme: Scheme::File,
            netloc: String::new(),
            path: tmp.to_string_lossy().into_owned(),
            design_file_name: Some("orders.yaml".into()),
            sql_file_name: None,
            manifest_file_name: None,
            source_path_name: "www/orders".into(),
            target_table_name: TableName::new("www", "orders"),
            source_name: "www".into(),
            files: vec!["orders.yaml".into()],
        };
        tokio::fs::write(tmp.join("orders.yaml"), design).await.unwrap();
        let relation = RelationDescription::new(file_set, "bucket", "rs_environment");
        let (fs_backend, _tmp) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();
        relation.table_design(&blob).await.unwrap();
        relation
    }

    #[tokio::test]
    async fn sqoop_execution_failure_surfaces_as_strategy_error() {
        use silo_extract::ExtractStrategy;

        let tmp = tempfile::tempdir().unwrap();
        // No primary key declared: partitioning stays at a single mapper and never opens a
        // connection to the (nonexistent, in this test) upstream source.
        let relation = relation_with_design(tmp.path(), "source_name: www\ncolumns:\n  - name: id\n  - name: total\n").await;

        let (fs_backend, _store_tmp) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();
        let scratch = tempfile::tempdir().unwrap();

        let strategy = SqoopStrategy::new(blob, Arc::new(FailingProcess), scratch.path().to_path_buf(), 4, false);
        let source = DataWarehouseSchema::new("www", Dsn::new("localhost", 5432, "www", "etl", "pw"));

        let result = strategy.extract_table(&source, &relation).await;
        assert!(matches!(result, Err(RuntimeError::Strategy(_))));
    }

    #[tokio::test]
    async fn dry_run_elides_subprocess_and_side_effects() {
        use silo_extract::ExtractStrategy;

        let tmp = tempfile::tempdir().unwrap();
        let relation = relation_with_design(tmp.path(), "source_name: www\ncolumns:\n  - name: id\n").await;

        let (fs_backend, _store_tmp) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();
        let scratch = tempfile::tempdir().unwrap();

        let strategy = SqoopStrategy::new(blob, Arc::new(FailingProcess), scratch.path().to_path_buf(), 4, true);
        let source = DataWarehouseSchema::new("www", Dsn::new("localhost", 5432, "www", "etl", "pw"));

        let result = strategy.extract_table(&source, &relation).await;
        assert!(result.is_ok());
    }
}
