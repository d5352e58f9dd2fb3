use silo_common::TableName;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    File,
    S3,
}

/// Everything discovered on disk (or in an object store) for one relation, before its design
/// has been parsed.
#[derive(Clone, Debug)]
pub struct TableFileSet {
    pub scheme: Scheme,
    /// Bucket name; empty for local filesystem discovery.
    pub netloc: String,
    /// Directory (or prefix) this relation's files live under.
    pub path: String,
    pub design_file_name: Option<String>,
    pub sql_file_name: Option<String>,
    pub manifest_file_name: Option<String>,
    /// `<schema>/<table>`, used to build the computed manifest path and CSV target directory.
    pub source_path_name: String,
    pub target_table_name: TableName,
    /// The upstream source this relation was discovered under (the top-level path segment).
    pub source_name: String,
    pub files: Vec<String>,
}

impl TableFileSet {
    pub fn bucket_name(&self) -> Option<&str> {
        (self.scheme == Scheme::S3).then_some(self.netloc.as_str())
    }
}

fn recognize(file_name: &str, into: &mut TableFileSet) {
    if file_name.ends_with(".yaml") || file_name.ends_with(".yml") {
        into.design_file_name = Some(file_name.to_string());
    } else if file_name.ends_with(".sql") {
        into.sql_file_name = Some(file_name.to_string());
    } else if file_name.ends_with(".manifest") {
        into.manifest_file_name = Some(file_name.to_string());
    }
    into.files.push(file_name.to_string());
}

/// Discover relations under a local directory tree shaped `<source>/<schema>/<table>/*`.
///
/// File sets without a design file are dropped (with a logged warning) rather than surfaced —
/// a directory with only a stray `.sql` file is not a relation.
pub fn discover_local(root: &Path) -> Vec<TableFileSet> {
    let mut grouped: BTreeMap<(String, String, String), TableFileSet> = BTreeMap::new();

    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let mut components: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let Some(file_name) = components.pop() else {
            continue;
        };
        if components.len() < 3 {
            // need at least <source>/<schema>/<table>/
            continue;
        }
        let source_name = components[0].clone();
        let schema = components[1].clone();
        let table = components[2].clone();

        let key = (source_name.clone(), schema.clone(), table.clone());
        let entry_set = grouped.entry(key).or_insert_with(|| TableFileSet {
            scheme: Scheme::File,
            netloc: String::new(),
            path: components[..3].join("/"),
            design_file_name: None,
            sql_file_name: None,
            manifest_file_name: None,
            source_path_name: format!("{schema}/{table}"),
            target_table_name: TableName::new(&schema, &table),
            source_name,
            files: Vec::new(),
        });
        recognize(&file_name, entry_set);
    }

    let mut result = Vec::new();
    for ((source, schema, table), set) in grouped {
        if set.design_file_name.is_none() {
            log::warn!("skipping '{source}/{schema}/{table}': no design file found");
            continue;
        }
        result.push(set);
    }
    result
}

/// Discover relations under an object-store prefix shaped the same way as [`discover_local`].
pub fn discover_s3(bucket: &str, keys: &[String]) -> Vec<TableFileSet> {
    let mut grouped: BTreeMap<(String, String, String), TableFileSet> = BTreeMap::new();

    for key in keys {
        let mut components: Vec<_> = key.split('/').map(str::to_string).collect();
        let Some(file_name) = components.pop() else {
            continue;
        };
        if components.len() < 3 {
            continue;
        }
        let source_name = components[0].clone();
        let schema = components[1].clone();
        let table = components[2].clone();

        let entry_key = (source_name.clone(), schema.clone(), table.clone());
        let entry_set = grouped.entry(entry_key).or_insert_with(|| TableFileSet {
            scheme: Scheme::S3,
            netloc: bucket.to_string(),
            path: components[..3].join("/"),
            design_file_name: None,
            sql_file_name: None,
            manifest_file_name: None,
            source_path_name: format!("{schema}/{table}"),
            target_table_name: TableName::new(&schema, &table),
            source_name,
            files: Vec::new(),
        });
        recognize(&file_name, entry_set);
    }

    let mut result = Vec::new();
    for ((source, schema, table), set) in grouped {
        if set.design_file_name.is_none() {
            log::warn!("skipping 's3://{bucket}/{source}/{schema}/{table}': no design file found");
            continue;
        }
        result.push(set);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_and_drops_incomplete_sets() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("www").join("www").join("orders");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("orders.yaml"), "source_name: www\ncolumns: []\n").unwrap();
        fs::write(dir.join("orders.sql"), "SELECT 1").unwrap();

        let stray = tmp.path().join("www").join("www").join("no_design");
        fs::create_dir_all(&stray).unwrap();
        fs::write(stray.join("no_design.sql"), "SELECT 1").unwrap();

        let sets = discover_local(tmp.path());
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].target_table_name, TableName::new("www", "orders"));
        assert!(sets[0].design_file_name.is_some());
        assert!(sets[0].sql_file_name.is_some());
    }
}
