pub mod design;
pub mod error;
pub mod fileset;
pub mod order;
pub mod relation;
pub mod required;

pub use design::TableDesign;
pub use error::Error;
pub use fileset::{Scheme, TableFileSet, discover_local, discover_s3};
pub use order::order_by_dependencies;
pub use relation::RelationDescription;
pub use required::{RequiredSet, select_required};

#[cfg(test)]
mod tests {
    use super::*;
    use silo_common::TableName;
    use silo_storage::{BlobBackend, FileSystemBackend};

    async fn design_relation(
        root: &std::path::Path,
        source: &str,
        schema: &str,
        table: &str,
        yaml: &str,
    ) -> RelationDescription {
        let dir = root.join(source).join(schema).join(table);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(format!("{table}.yaml")), yaml).await.unwrap();

        let file_set = TableFileSet {
            scheme: Scheme::File,
            netloc: String::new(),
            path: dir.to_string_lossy().into_owned(),
            design_file_name: Some(format!("{table}.yaml")),
            sql_file_name: None,
            manifest_file_name: None,
            source_path_name: format!("{schema}/{table}"),
            target_table_name: TableName::new(schema, table),
            source_name: source.to_string(),
            files: vec![format!("{table}.yaml")],
        };
        RelationDescription::new(file_set, "bucket", "rs_environment")
    }

    #[tokio::test]
    async fn linear_chain_orders_dependencies_first() {
        let tmp = tempfile::tempdir().unwrap();
        let (fs_backend, _tmp2) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();

        let a = design_relation(tmp.path(), "www", "www", "a", "source_name: www\ncolumns: []\n").await;
        let b = design_relation(
            tmp.path(),
            "www",
            "www",
            "b",
            "source_name: www\ncolumns: []\ndepends_on: [www.a]\n",
        )
        .await;
        let c = design_relation(
            tmp.path(),
            "www",
            "www",
            "c",
            "source_name: www\ncolumns: []\ndepends_on: [www.b]\n",
        )
        .await;

        for relation in [&c, &b, &a] {
            relation.table_design(&blob).await.unwrap();
        }

        let relations = [&c, &b, &a];
        let ordered = order_by_dependencies(&relations).unwrap();
        let identifiers: Vec<_> = ordered.into_iter().map(|i| relations[i].identifier()).collect();
        assert_eq!(identifiers, vec!["www.a", "www.b", "www.c"]);
    }

    #[tokio::test]
    async fn stable_tie_break_preserves_input_order_when_unconstrained() {
        let tmp = tempfile::tempdir().unwrap();
        let (fs_backend, _tmp2) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();

        let x = design_relation(tmp.path(), "www", "www", "x", "source_name: www\ncolumns: []\n").await;
        let y = design_relation(tmp.path(), "www", "www", "y", "source_name: www\ncolumns: []\n").await;
        let z = design_relation(tmp.path(), "www", "www", "z", "source_name: www\ncolumns: []\n").await;
        for relation in [&x, &y, &z] {
            relation.table_design(&blob).await.unwrap();
        }

        let relations = [&x, &y, &z];
        let ordered = order_by_dependencies(&relations).unwrap();
        let identifiers: Vec<_> = ordered.into_iter().map(|i| relations[i].identifier()).collect();
        assert_eq!(identifiers, vec!["www.x", "www.y", "www.z"]);
    }

    #[tokio::test]
    async fn catalog_dependent_relation_sorts_after_every_normal_relation() {
        let tmp = tempfile::tempdir().unwrap();
        let (fs_backend, _tmp2) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();

        let t1 = design_relation(tmp.path(), "www", "www", "t1", "source_name: www\ncolumns: []\n").await;
        let t2 = design_relation(tmp.path(), "www", "www", "t2", "source_name: www\ncolumns: []\n").await;
        let t3 = design_relation(tmp.path(), "www", "www", "t3", "source_name: www\ncolumns: []\n").await;
        let cat = design_relation(
            tmp.path(),
            "www",
            "www",
            "cat",
            "source_name: CTAS\ncolumns: []\ndepends_on: [pg_catalog.pg_class]\n",
        )
        .await;
        for relation in [&t1, &t2, &t3, &cat] {
            relation.table_design(&blob).await.unwrap();
        }

        let relations = [&t1, &t2, &t3, &cat];
        let ordered = order_by_dependencies(&relations).unwrap();
        let identifiers: Vec<_> = ordered.into_iter().map(|i| relations[i].identifier()).collect();
        assert_eq!(identifiers, vec!["www.t1", "www.t2", "www.t3", "www.cat"]);
    }

    #[tokio::test]
    async fn cycle_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (fs_backend, _tmp2) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();

        let a = design_relation(
            tmp.path(),
            "www",
            "www",
            "a",
            "source_name: www\ncolumns: []\ndepends_on: [www.b]\n",
        )
        .await;
        let b = design_relation(
            tmp.path(),
            "www",
            "www",
            "b",
            "source_name: www\ncolumns: []\ndepends_on: [www.a]\n",
        )
        .await;
        for relation in [&a, &b] {
            relation.table_design(&blob).await.unwrap();
        }

        let relations = [&a, &b];
        let result = order_by_dependencies(&relations);
        assert!(matches!(result, Err(Error::CyclicDependency(2))));
    }

    #[tokio::test]
    async fn required_selector_computes_transitive_closure() {
        let tmp = tempfile::tempdir().unwrap();
        let (fs_backend, _tmp2) = FileSystemBackend::for_test().await.unwrap();
        let blob: BlobBackend = fs_backend.into();

        let w = design_relation(tmp.path(), "www", "www", "w", "source_name: www\ncolumns: []\n").await;
        let v = design_relation(
            tmp.path(),
            "www",
            "www",
            "v",
            "source_name: www\ncolumns: []\ndepends_on: [www.w]\n",
        )
        .await;
        let u = design_relation(
            tmp.path(),
            "www",
            "www",
            "u",
            "source_name: www\ncolumns: []\ndepends_on: [www.v]\n",
        )
        .await;
        let x = design_relation(tmp.path(), "www", "www", "x", "source_name: www\ncolumns: []\n").await;
        for relation in [&w, &v, &u, &x] {
            relation.table_design(&blob).await.unwrap();
        }

        let relations = [&u, &v, &w, &x];
        let ordered = order_by_dependencies(&relations).unwrap();
        let required = select_required(&relations, &ordered, |name| name.identifier() == "www.u");
        required.apply(&relations);

        assert!(u.is_required().unwrap());
        assert!(v.is_required().unwrap());
        assert!(w.is_required().unwrap());
        assert!(!x.is_required().unwrap());
    }
}
