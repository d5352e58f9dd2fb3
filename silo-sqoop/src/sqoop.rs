use crate::error::Error;
use crate::partition::determine_partitioning;
use async_trait::async_trait;
use silo_common::DataWarehouseSchema;
use silo_db::{ConnectOptions, connect, fetch_table_size};
use silo_extract::{ExtractStrategy, ManifestWriter, Process, RuntimeError};
use silo_relation::RelationDescription;
use silo_storage::{Blob, BlobBackend, WaitPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

fn quote(s: &str) -> String {
    format!("\"{s}\"")
}

/// Extracts one relation from an upstream Postgres-compatible source via the Sqoop
/// command-line tool, writing CSV parts to the object store and finalizing with a manifest.
pub struct SqoopStrategy {
    blob: BlobBackend,
    process: Arc<dyn Process>,
    pub(crate) sqoop_executable: String,
    scratch_dir: PathBuf,
    max_partitions: u32,
    dry_run: bool,
    manifest: ManifestWriter,
}

impl SqoopStrategy {
    pub fn new(
        blob: BlobBackend,
        process: Arc<dyn Process>,
        scratch_dir: PathBuf,
        max_partitions: u32,
        dry_run: bool,
    ) -> Self {
        Self::with_wait_policy(blob, process, scratch_dir, max_partitions, dry_run, WaitPolicy::default())
    }

    pub fn with_wait_policy(
        blob: BlobBackend,
        process: Arc<dyn Process>,
        scratch_dir: PathBuf,
        max_partitions: u32,
        dry_run: bool,
        wait_policy: WaitPolicy,
    ) -> Self {
        let mut manifest = ManifestWriter::new(true, dry_run);
        manifest.wait_policy = wait_policy;
        Self {
            blob,
            process,
            sqoop_executable: "sqoop".to_string(),
            scratch_dir,
            max_partitions,
            dry_run,
            manifest,
        }
    }

    async fn write_side_file(&self, prefix: &str, contents: &str) -> Result<PathBuf, Error> {
        if self.dry_run {
            tracing::info!(prefix, "dry-run: skipping side-file creation");
            return Ok(PathBuf::from("/tmp/never_used"));
        }
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.scratch_dir, std::fs::Permissions::from_mode(0o750)).await?;
        }
        let path = self.scratch_dir.join(format!("{prefix}_{}", uuid_like()));
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(path)
    }

    async fn determine_partitioning(&self, source: &DataWarehouseSchema, relation: &RelationDescription) -> Result<u32, Error> {
        let Some(source_table_name) = relation.source_table_name() else {
            return Ok(1);
        };
        let mut conn = connect(&source.dsn, ConnectOptions::readonly()).await?;
        let size = fetch_table_size(&mut conn, &source_table_name.identifier()).await?;
        drop(conn);
        Ok(determine_partitioning(size, self.max_partitions))
    }

    async fn build_partition_args(&self, source: &DataWarehouseSchema, relation: &RelationDescription) -> Result<Vec<String>, Error> {
        match relation.find_primary_key() {
            Some(key) => {
                let num_mappers = self.determine_partitioning(source, relation).await?;
                Ok(vec![
                    "--split-by".to_string(),
                    quote(key),
                    "--num-mappers".to_string(),
                    num_mappers.to_string(),
                ])
            }
            None => Ok(vec!["--num-mappers".to_string(), "1".to_string()]),
        }
    }

    async fn build_options(&self, source: &DataWarehouseSchema, relation: &RelationDescription) -> Result<Vec<String>, Error> {
        let password_file = self.write_side_file("pw", source.dsn.password()).await?;
        let params_file = self
            .write_side_file(
                "cp",
                "ssl = true\nsslfactory = org.postgresql.ssl.NonValidatingFactory\n",
            )
            .await?;

        let source_table_name = relation
            .source_table_name()
            .map(|name| name.identifier())
            .unwrap_or_default();
        let columns = relation.get_columns_with_casts().join(", ");
        let select_statement = format!("SELECT {columns} FROM {source_table_name} WHERE $CONDITIONS");

        let mut args = vec![
            "import".to_string(),
            "--connect".to_string(),
            quote(&source.dsn.to_jdbc_url()),
            "--driver".to_string(),
            quote("org.postgresql.Driver"),
            "--connection-param-file".to_string(),
            quote(&params_file.to_string_lossy()),
            "--username".to_string(),
            quote(&source.dsn.user),
            "--password-file".to_string(),
            format!("\"file://{}\"", password_file.to_string_lossy()),
            "--verbose".to_string(),
            "--fields-terminated-by".to_string(),
            quote(","),
            "--lines-terminated-by".to_string(),
            r"'\n'".to_string(),
            "--enclosed-by".to_string(),
            "'\"'".to_string(),
            "--escaped-by".to_string(),
            r"'\\'".to_string(),
            "--null-string".to_string(),
            r"'\\N'".to_string(),
            "--null-non-string".to_string(),
            r"'\\N'".to_string(),
            "--target-dir".to_string(),
            format!(
                "\"s3n://{}/{}/{}\"",
                relation.bucket_name(),
                relation.prefix(),
                relation.csv_path_name()
            ),
            "--query".to_string(),
            select_statement,
            "--hive-drop-import-delims".to_string(),
            "--compress".to_string(),
        ];

        args.extend(self.build_partition_args(source, relation).await?);
        Ok(args)
    }

    async fn write_options_file(&self, args: &[String]) -> Result<PathBuf, Error> {
        self.write_side_file("so", &format!("{}\n", args.join("\n"))).await
    }

    async fn delete_existing_csvs(&self, relation: &RelationDescription) -> Result<(), Error> {
        let prefix = format!("{}/{}", relation.prefix(), relation.csv_path_name());
        let mut deletable = self.blob.list(relation.bucket_name(), &prefix).await?;
        deletable.sort();
        if deletable.is_empty() {
            return Ok(());
        }
        if self.dry_run {
            tracing::info!(bucket = relation.bucket_name(), prefix, "dry-run: skipping deletion of existing CSV files");
            return Ok(());
        }
        self.blob.delete(relation.bucket_name(), &deletable).await?;
        Ok(())
    }

    async fn run_sqoop(&self, options_file: &PathBuf) -> Result<(), Error> {
        let args = vec!["--options-file".to_string(), options_file.to_string_lossy().into_owned()];
        let cmdline = std::iter::once(self.sqoop_executable.as_str())
            .chain(args.iter().map(String::as_str))
            .map(|token| shlex::try_quote(token).unwrap_or_default().into_owned())
            .collect::<Vec<_>>()
            .join(" ");

        if self.dry_run {
            tracing::info!(cmdline, "dry-run: skipping sqoop run");
            return Ok(());
        }
        tracing::debug!(cmdline, "starting sqoop");
        let output = self.process.run(&self.sqoop_executable, &args).await?;
        tracing::debug!(status = output.status, stdout = %output.stdout, stderr = %output.stderr, "sqoop finished");
        if !output.success() {
            return Err(Error::SqoopExecution(output.status));
        }
        Ok(())
    }
}

#[async_trait]
impl ExtractStrategy for SqoopStrategy {
    async fn extract_table(&self, source: &DataWarehouseSchema, relation: &RelationDescription) -> Result<(), RuntimeError> {
        let args = self.build_options(source, relation).await?;
        tracing::debug!(args = args.join(" "), "sqoop options");
        let options_file = self.write_options_file(&args).await?;

        self.delete_existing_csvs(relation).await?;
        self.run_sqoop(&options_file).await?;

        let prefix = format!("{}/{}", relation.prefix(), relation.csv_path_name());
        if !self.dry_run {
            self.manifest.write(&self.blob, relation, relation.bucket_name(), &prefix).await?;
        }
        Ok(())
    }

    fn options_info(&self) -> String {
        format!("max_partitions={}", self.max_partitions)
    }
}

/// A stand-in for a random suffix; side-file names only need to be unique within one scratch
/// directory for the lifetime of a run.
fn uuid_like() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("{:016x}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
