use crate::error::{Error, RuntimeError};
use crate::monitor::{Monitor, MonitorContext, monitored};
use crate::strategy::ExtractStrategy;
use futures::stream::{FuturesUnordered, StreamExt};
use silo_common::DataWarehouseSchema;
use silo_relation::RelationDescription;
use std::collections::HashMap;
use std::sync::Arc;

/// Drives extraction for every relation across every configured source, applying the
/// keep-going vs. fail-fast policy and aggregating failures into a single terminal error.
pub struct ExtractorBase {
    pub name: String,
    pub schemas: HashMap<String, DataWarehouseSchema>,
    pub relations: Vec<RelationDescription>,
    pub keep_going: bool,
    pub needs_to_wait: bool,
    pub dry_run: bool,
    pub strategy: Arc<dyn ExtractStrategy>,
    pub monitor: Arc<dyn Monitor>,
}

impl ExtractorBase {
    /// Extracts every relation belonging to one source, in the order given. Returns the
    /// identifiers of relations that failed but were tolerated; re-raises on the first failure
    /// of a required relation when `keep_going` is false.
    pub async fn extract_source(
        &self,
        source_name: &str,
        source: &DataWarehouseSchema,
        relations: &[&RelationDescription],
    ) -> Result<Vec<String>, RuntimeError> {
        let mut failed = Vec::new();
        let total = relations.len();

        for (index, relation) in relations.iter().enumerate() {
            let ctx = MonitorContext {
                relation_identifier: relation.identifier(),
                step: "extract",
                source_name: source_name.to_string(),
                destination_bucket: relation.bucket_name().to_string(),
                destination_key: relation.manifest_file_name(),
                index_current: index + 1,
                index_total: total,
            };

            let result = monitored(self.monitor.as_ref(), ctx, || async {
                self.strategy.extract_table(source, relation).await
            })
            .await;

            let Err(err) = result else { continue };

            failed.push(relation.identifier());
            let is_required = relation.is_required().unwrap_or(true);

            if !is_required {
                log::warn!(
                    "extraction of '{}' failed but it is not required; continuing",
                    relation.identifier()
                );
                continue;
            }
            if self.keep_going {
                log::warn!(
                    "extraction of '{}' failed; continuing because keep_going is set",
                    relation.identifier()
                );
                continue;
            }
            return Err(err);
        }

        Ok(failed)
    }

    fn group_by_source(&self) -> (Vec<String>, HashMap<String, Vec<&RelationDescription>>) {
        let mut order = Vec::new();
        let mut groups: HashMap<String, Vec<&RelationDescription>> = HashMap::new();
        for relation in &self.relations {
            let name = relation.source_name().to_string();
            if !groups.contains_key(&name) {
                order.push(name.clone());
            }
            groups.entry(name).or_default().push(relation);
        }
        (order, groups)
    }

    /// Runs every source's extraction concurrently, bounded by a worker pool sized to the
    /// number of configured sources.
    pub async fn extract_sources(&self) -> Result<(), Error> {
        let (order, groups) = self.group_by_source();
        let pool_size = self.schemas.len().max(1);
        let semaphore = Arc::new(tokio::sync::Semaphore::new(pool_size));

        let mut futs = FuturesUnordered::new();
        for source_name in &order {
            let semaphore = Arc::clone(&semaphore);
            let relations = groups.get(source_name).cloned().unwrap_or_default();
            let source_name = source_name.clone();
            futs.push(async move {
                let _permit = semaphore.acquire().await.expect("semaphore is never closed");
                let result = match self.schemas.get(&source_name) {
                    Some(source) => self.extract_source(&source_name, source, &relations).await,
                    None => {
                        log::error!("no warehouse schema configured for source '{source_name}'");
                        Err(RuntimeError::MissingCsvFiles(source_name.clone()))
                    }
                };
                (source_name, result)
            });
        }

        let total = futs.len();
        let mut completed = 0usize;
        let mut incomplete = 0usize;

        while let Some((source_name, result)) = futs.next().await {
            completed += 1;
            match result {
                Ok(failed_relations) => {
                    for identifier in failed_relations {
                        log::warn!("relation '{identifier}' was not extracted from source '{source_name}'");
                    }
                }
                Err(err) => {
                    log::error!("source '{source_name}' failed: {err}");
                    incomplete += 1;
                    if !self.keep_going {
                        break;
                    }
                }
            }
        }
        incomplete += total - completed;

        if incomplete > 0 {
            return Err(Error::DataExtract(incomplete));
        }
        Ok(())
    }
}
