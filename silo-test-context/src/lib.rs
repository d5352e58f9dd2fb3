pub mod monitor;
pub mod process;

pub use monitor::{RecordedEvent, RecordingMonitor};
pub use process::ScriptedProcess;

use postgresql_embedded::PostgreSQL;
use silo_common::Dsn;
use silo_storage::{BlobBackend, FileSystemBackend};
use std::env;
use tempfile::TempDir;
use test_context::AsyncTestContext;

/// Fixture bundle for integration tests: an embedded Postgres instance (or an external one, if
/// `EXTERNAL_TEST_DB` is set) plus a filesystem-backed blob store rooted in a scratch directory.
pub struct SiloTestContext {
    pub dsn: Dsn,
    pub blob: BlobBackend,
    tmp: TempDir,
    postgresql: Option<PostgreSQL>,
}

impl SiloTestContext {
    pub fn scratch_dir(&self) -> &std::path::Path {
        self.tmp.path()
    }
}

impl AsyncTestContext for SiloTestContext {
    #[tracing::instrument]
    async fn setup() -> Self {
        let (fs_backend, tmp) = FileSystemBackend::for_test()
            .await
            .expect("initializing the filesystem blob backend");
        let blob: BlobBackend = fs_backend.into();

        if env::var("EXTERNAL_TEST_DB").is_ok() {
            tracing::warn!("using external database from DSN_* env vars");
            let dsn = Dsn::new(
                env::var("SILO_TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                env::var("SILO_TEST_DB_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5432),
                env::var("SILO_TEST_DB_NAME").unwrap_or_else(|_| "postgres".to_string()),
                env::var("SILO_TEST_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
                env::var("SILO_TEST_DB_PASSWORD").unwrap_or_default(),
            );
            return SiloTestContext { dsn, blob, tmp, postgresql: None };
        }

        let (dsn, postgresql) = silo_db::embedded::create()
            .await
            .expect("creating an embedded database");

        SiloTestContext { dsn, blob, tmp, postgresql: Some(postgresql) }
    }

    async fn teardown(self) {
        drop(self.postgresql);
    }
}
