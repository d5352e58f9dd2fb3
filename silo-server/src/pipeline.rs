use crate::config::Config;
use futures::stream::{self, StreamExt};
use silo_common::{DataWarehouseSchema, TableName};
use silo_extract::{ExtractorBase, ExtractStrategy, Process, TokioProcess, TracingMonitor};
use silo_relation::{RelationDescription, discover_local, order_by_dependencies, select_required};
use silo_sqoop::SqoopStrategy;
use silo_storage::{BlobBackend, FileSystemBackend, S3Backend};
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrency of the design-loading preload pool that runs ahead of dependency ordering.
const DESIGN_LOAD_CONCURRENCY: usize = 8;

pub async fn blob_backend(config: &Config) -> BlobBackend {
    match &config.local_store_root {
        Some(root) => FileSystemBackend::new(root.clone()).into(),
        None => S3Backend::from_env().await.into(),
    }
}

/// Discover relation file sets under `config.design_root`, preload every design, and return
/// them in dependency order.
pub async fn ordered_relations(config: &Config, blob: &BlobBackend) -> anyhow::Result<Vec<RelationDescription>> {
    let file_sets = discover_local(&config.design_root);
    let relations: Vec<RelationDescription> = file_sets
        .into_iter()
        .map(|file_set| RelationDescription::new(file_set, config.bucket.clone(), config.prefix.clone()))
        .collect();

    let load_results: Vec<Result<(), silo_relation::Error>> = stream::iter(relations.iter())
        .map(|relation| async move { relation.table_design(blob).await.map(|_| ()) })
        .buffer_unordered(DESIGN_LOAD_CONCURRENCY)
        .collect()
        .await;
    for result in load_results {
        result?;
    }

    let ordered_indices = {
        let refs: Vec<&RelationDescription> = relations.iter().collect();
        order_by_dependencies(&refs)?
    };

    let mut slots: Vec<Option<RelationDescription>> = relations.into_iter().map(Some).collect();
    let ordered = ordered_indices
        .into_iter()
        .map(|index| slots[index].take().expect("ordering visits every relation exactly once"))
        .collect();
    Ok(ordered)
}

/// Mark relations required per `selector`, given a set already in dependency order.
pub fn apply_required_selection(ordered: &[RelationDescription], selector: impl Fn(&TableName) -> bool) {
    let refs: Vec<&RelationDescription> = ordered.iter().collect();
    let identity: Vec<usize> = (0..refs.len()).collect();
    let required = select_required(&refs, &identity, selector);
    required.apply(&refs);
}

/// Run the full pipeline: discover, order, select required relations, then extract every
/// source in parallel.
pub async fn run_extract(config: &Config, selector: impl Fn(&TableName) -> bool) -> anyhow::Result<()> {
    let blob = blob_backend(config).await;
    let ordered = ordered_relations(config, &blob).await?;
    apply_required_selection(&ordered, selector);

    let process: Arc<dyn Process> = Arc::new(TokioProcess);
    let strategy: Arc<dyn ExtractStrategy> = Arc::new(SqoopStrategy::with_wait_policy(
        blob,
        process,
        config.scratch_dir.clone(),
        config.max_partitions,
        config.dry_run,
        config.wait_policy(),
    ));

    let schemas: HashMap<String, DataWarehouseSchema> = config
        .sources
        .iter()
        .cloned()
        .map(|schema| (schema.name.clone(), schema))
        .collect();

    let extractor = ExtractorBase {
        name: "silo".to_string(),
        schemas,
        relations: ordered,
        keep_going: config.keep_going,
        needs_to_wait: true,
        dry_run: config.dry_run,
        strategy,
        monitor: Arc::new(TracingMonitor),
    };

    extractor.extract_sources().await?;
    Ok(())
}
