use crate::design::TableDesign;
use crate::error::Error;
use crate::fileset::{Scheme, TableFileSet};
use silo_common::TableName;
use silo_storage::BlobBackend;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::sync::OnceCell;

/// A lazy handle on one relation: its discovered files, plus its design and query text loaded
/// on first access, plus a one-shot "is this required" flag set by [`crate::required`] once
/// selection has run.
pub struct RelationDescription {
    file_set: TableFileSet,
    /// Destination bucket for extracted data and the manifest; distinct from wherever the
    /// design/query files themselves were discovered.
    bucket_name: String,
    /// Destination prefix root, e.g. `"rs_environment"`.
    prefix: String,
    table_design: OnceCell<TableDesign>,
    query_stmt: OnceCell<String>,
    is_required: OnceLock<bool>,
}

impl RelationDescription {
    pub fn new(file_set: TableFileSet, bucket_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            file_set,
            bucket_name: bucket_name.into(),
            prefix: prefix.into(),
            table_design: OnceCell::new(),
            query_stmt: OnceCell::new(),
            is_required: OnceLock::new(),
        }
    }

    pub fn identifier(&self) -> String {
        self.file_set.target_table_name.identifier()
    }

    pub fn target_table_name(&self) -> &TableName {
        &self.file_set.target_table_name
    }

    /// The upstream source this relation was discovered under.
    pub fn source_name(&self) -> &str {
        &self.file_set.source_name
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn source_path_name(&self) -> &str {
        &self.file_set.source_path_name
    }

    pub fn csv_path_name(&self) -> String {
        format!("data/{}", self.file_set.source_path_name)
    }

    /// The computed manifest location, always present regardless of whether a manifest was
    /// discovered on disk.
    pub fn manifest_file_name(&self) -> String {
        format!("{}/data/{}.manifest", self.prefix, self.file_set.source_path_name)
    }

    pub fn has_manifest(&self) -> bool {
        self.file_set.manifest_file_name.is_some()
    }

    /// `RelationDescription`'s forwarded accessors onto its file set — an explicit stand-in for
    /// dynamic attribute delegation.
    pub fn design_file_name(&self) -> Option<&str> {
        self.file_set.design_file_name.as_deref()
    }

    pub fn sql_file_name(&self) -> Option<&str> {
        self.file_set.sql_file_name.as_deref()
    }

    pub fn files(&self) -> &[String] {
        &self.file_set.files
    }

    async fn load_text(&self, blob: &BlobBackend, file_name: &str) -> Result<String, Error> {
        match self.file_set.scheme {
            Scheme::File => {
                let path = PathBuf::from(&self.file_set.path).join(file_name);
                Ok(tokio::fs::read_to_string(path).await?)
            }
            Scheme::S3 => {
                let key = format!("{}/{file_name}", self.file_set.path);
                let bytes = blob.get(&self.file_set.netloc, &key).await?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    pub async fn table_design(&self, blob: &BlobBackend) -> Result<&TableDesign, Error> {
        self.table_design
            .get_or_try_init(|| async {
                let Some(file_name) = self.file_set.design_file_name.clone() else {
                    return Err(Error::DesignUnavailable(
                        self.target_table_name().clone(),
                        "no design file in file set".to_string(),
                    ));
                };
                let text = self.load_text(blob, &file_name).await.map_err(|err| {
                    Error::DesignUnavailable(self.target_table_name().clone(), err.to_string())
                })?;
                TableDesign::parse(&text)
                    .map_err(|err| Error::DesignUnavailable(self.target_table_name().clone(), err.to_string()))
            })
            .await
    }

    pub async fn query_stmt(&self, blob: &BlobBackend) -> Result<&str, Error> {
        self.query_stmt
            .get_or_try_init(|| async {
                let Some(file_name) = self.file_set.sql_file_name.clone() else {
                    return Err(Error::MissingQuery(self.target_table_name().clone()));
                };
                let text = self.load_text(blob, &file_name).await?;
                Ok(text.trim_end().strip_suffix(';').unwrap_or(text.trim_end()).to_string())
            })
            .await
            .map(String::as_str)
    }

    /// The dependency identifiers declared by this relation's design. Requires the design to
    /// already be loaded — callers (the dependency orderer's preload pool) are expected to have
    /// called [`Self::table_design`] first.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.table_design
            .get()
            .map(|design| design.depends_on.clone())
            .unwrap_or_default()
    }

    /// The upstream table this relation is extracted from: same table name, but qualified by
    /// the design's declared `source_name` schema rather than the warehouse destination schema.
    /// Only meaningful for relations backed by an actual upstream table (not CTAS/VIEW).
    pub fn source_table_name(&self) -> Option<TableName> {
        self.table_design
            .get()
            .map(|design| TableName::new(&design.source_name, &self.target_table_name().table))
    }

    pub fn is_ctas_relation(&self) -> bool {
        self.table_design.get().is_some_and(TableDesign::is_ctas)
    }

    pub fn is_view_relation(&self) -> bool {
        self.table_design.get().is_some_and(TableDesign::is_view)
    }

    pub fn is_unloadable(&self) -> bool {
        self.table_design
            .get()
            .is_some_and(|design| design.unload_target.is_some())
    }

    pub fn unload_target(&self) -> Option<&str> {
        self.table_design.get().and_then(|d| d.unload_target.as_deref())
    }

    pub fn find_primary_key(&self) -> Option<String> {
        self.table_design.get().and_then(|d| d.find_primary_key().map(String::from))
    }

    pub fn get_columns_with_casts(&self) -> Vec<String> {
        self.table_design
            .get()
            .map(TableDesign::get_columns_with_casts)
            .unwrap_or_default()
    }

    /// Sets `is_required` exactly once. Calling this a second time is a programmer error and
    /// panics — selection only ever runs once per run.
    pub fn set_is_required(&self, value: bool) {
        self.is_required
            .set(value)
            .expect("is_required must only be set once, by the required-selector driver");
    }

    pub fn is_required(&self) -> Result<bool, Error> {
        self.is_required
            .get()
            .copied()
            .ok_or_else(|| Error::RequiredStateUnknown(self.target_table_name().clone()))
    }
}

impl std::fmt::Debug for RelationDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationDescription")
            .field("identifier", &self.identifier())
            .field("source_name", &self.source_name())
            .finish()
    }
}
