pub mod error;
pub mod extractor;
pub mod manifest;
pub mod monitor;
pub mod process;
pub mod strategy;

pub use error::{Error, RuntimeError};
pub use extractor::ExtractorBase;
pub use manifest::{LoadManifest, ManifestEntry, ManifestWriter};
pub use monitor::{Monitor, MonitorContext, TracingMonitor, monitored};
pub use process::{Process, ProcessOutput, TokioProcess};
pub use strategy::ExtractStrategy;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use silo_common::{DataWarehouseSchema, Dsn, TableName};
    use silo_relation::{RelationDescription, Scheme, TableFileSet};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn relation(source: &str, table: &str, required: bool) -> RelationDescription {
        let file_set = TableFileSet {
            scheme: Scheme::File,
            netloc: String::new(),
            path: "/tmp/unused".into(),
            design_file_name: Some(format!("{table}.yaml")),
            sql_file_name: None,
            manifest_file_name: None,
            source_path_name: format!("{source}/{table}"),
            target_table_name: TableName::new(source, table),
            source_name: source.to_string(),
            files: vec![],
        };
        let relation = RelationDescription::new(file_set, "bucket", "rs_environment");
        relation.set_is_required(required);
        relation
    }

    fn schema(name: &str) -> DataWarehouseSchema {
        DataWarehouseSchema::new(name, Dsn::new("localhost", 5432, "db", "user", "pw"))
    }

    /// Fails extraction for a fixed set of relation identifiers, records every attempt.
    struct SelectiveFailureStrategy {
        fails: Vec<String>,
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExtractStrategy for SelectiveFailureStrategy {
        async fn extract_table(
            &self,
            _source: &DataWarehouseSchema,
            relation: &RelationDescription,
        ) -> Result<(), RuntimeError> {
            self.attempts.lock().push(relation.identifier());
            if self.fails.contains(&relation.identifier()) {
                return Err(RuntimeError::Strategy(anyhow::anyhow!("sqoop exited non-zero")));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn non_required_failure_does_not_abort_the_source() {
        let r1 = relation("s1", "r1", false);
        let r2 = relation("s1", "r2", false);
        let r3 = relation("s2", "r3", true);

        let strategy = Arc::new(SelectiveFailureStrategy {
            fails: vec![r1.identifier()],
            attempts: Mutex::new(Vec::new()),
        });

        let mut schemas = HashMap::new();
        schemas.insert("s1".to_string(), schema("s1"));
        schemas.insert("s2".to_string(), schema("s2"));

        let extractor = ExtractorBase {
            name: "test-run".into(),
            schemas,
            relations: vec![r1, r2, r3],
            keep_going: false,
            needs_to_wait: false,
            dry_run: false,
            strategy: strategy.clone(),
            monitor: Arc::new(TracingMonitor),
        };

        extractor.extract_sources().await.unwrap();
        let attempted = strategy.attempts.lock().clone();
        assert!(attempted.contains(&"s1.r1".to_string()));
        assert!(attempted.contains(&"s1.r2".to_string()));
        assert!(attempted.contains(&"s2.r3".to_string()));
    }

    #[tokio::test]
    async fn required_failure_aborts_in_fail_fast_mode() {
        let r1 = relation("s1", "r1", true);
        let r2 = relation("s1", "r2", true);

        let strategy = Arc::new(SelectiveFailureStrategy {
            fails: vec![r1.identifier()],
            attempts: Mutex::new(Vec::new()),
        });

        let mut schemas = HashMap::new();
        schemas.insert("s1".to_string(), schema("s1"));

        let extractor = ExtractorBase {
            name: "test-run".into(),
            schemas,
            relations: vec![r1, r2],
            keep_going: false,
            needs_to_wait: false,
            dry_run: false,
            strategy: strategy.clone(),
            monitor: Arc::new(TracingMonitor),
        };

        let result = extractor.extract_sources().await;
        assert!(matches!(result, Err(Error::DataExtract(1))));
        assert!(!strategy.attempts.lock().contains(&"s1.r2".to_string()));
    }

    #[tokio::test]
    async fn keep_going_runs_every_relation_despite_required_failures() {
        let r1 = relation("s1", "r1", true);
        let r2 = relation("s1", "r2", true);

        let strategy = Arc::new(SelectiveFailureStrategy {
            fails: vec![r1.identifier()],
            attempts: Mutex::new(Vec::new()),
        });

        let mut schemas = HashMap::new();
        schemas.insert("s1".to_string(), schema("s1"));

        let extractor = ExtractorBase {
            name: "test-run".into(),
            schemas,
            relations: vec![r1, r2],
            keep_going: true,
            needs_to_wait: false,
            dry_run: false,
            strategy: strategy.clone(),
            monitor: Arc::new(TracingMonitor),
        };

        extractor.extract_sources().await.unwrap();
        assert!(strategy.attempts.lock().contains(&"s1.r2".to_string()));
    }
}
