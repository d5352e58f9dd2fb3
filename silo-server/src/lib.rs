pub mod config;
pub mod pipeline;

pub use config::{CliOverrides, Config, FileConfig};
pub use pipeline::{apply_required_selection, blob_backend, ordered_relations, run_extract};

#[cfg(test)]
mod tests {
    use super::*;
    use silo_common::TableName;
    use silo_relation::{RelationDescription, Scheme, TableFileSet};

    fn relation(source: &str, table: &str) -> RelationDescription {
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
        RelationDescription::new(file_set, "bucket", "rs_environment")
    }

    #[test]
    fn config_load_merges_cli_overrides_over_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("silo.yaml");
        std::fs::write(
            &config_path,
            r#"
design_root: /data/designs
bucket: warehouse-bucket
sources:
  - name: www
    dsn:
      host: localhost
      port: 5432
      dbname: www
      user: etl
      password: secret
"#,
        )
        .unwrap();

        let cli = CliOverrides {
            config_file: config_path,
            design_root: None,
            bucket: None,
            prefix: Some("overridden_prefix".to_string()),
            scratch_dir: None,
            max_partitions: None,
            keep_going: true,
            dry_run: false,
            manifest_wait_timeout: None,
            manifest_poll_interval: None,
        };

        let config = Config::load(cli).unwrap();
        assert_eq!(config.bucket, "warehouse-bucket");
        assert_eq!(config.prefix, "overridden_prefix");
        assert!(config.keep_going);
        assert_eq!(config.max_partitions, 4);
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn apply_required_selection_marks_transitive_closure() {
        let a = relation("www", "a");
        let b = relation("www", "b");
        let ordered = vec![a, b];

        apply_required_selection(&ordered, |name| name.identifier() == "www.b");

        assert!(!ordered[0].is_required().unwrap_or(false));
        assert!(ordered[1].is_required().unwrap());
    }
}
