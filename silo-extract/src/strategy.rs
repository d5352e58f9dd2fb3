use crate::error::RuntimeError;
use async_trait::async_trait;
use silo_common::DataWarehouseSchema;
use silo_relation::RelationDescription;

/// The pluggable extraction capability. Lives behind `dyn` dispatch (via `#[async_trait]`)
/// because concrete strategies (the real Sqoop-backed one, and test fakes) live in downstream
/// crates that this one has no dependency on.
#[async_trait]
pub trait ExtractStrategy: Send + Sync {
    /// Extract one relation out of `source` into its configured destination. Implementations own
    /// their own side effects (subprocess, manifest upload, dry-run elision).
    async fn extract_table(
        &self,
        source: &DataWarehouseSchema,
        relation: &RelationDescription,
    ) -> Result<(), RuntimeError>;

    /// A short human-readable description of this strategy's tunables, used as monitor context.
    fn options_info(&self) -> String {
        String::new()
    }

    /// A short human-readable description of the source being read from, used as monitor context.
    fn source_info(&self, source: &DataWarehouseSchema) -> String {
        format!("{}@{}:{}", source.dsn.user, source.dsn.host, source.dsn.port)
    }
}
