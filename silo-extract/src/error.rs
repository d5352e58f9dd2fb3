use thiserror::Error;

/// Errors descending from this base are caught by [`crate::extractor::ExtractorBase`]'s
/// per-relation loop; anything else propagates and aborts the whole source.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Relation(#[from] silo_relation::Error),

    #[error(transparent)]
    Storage(#[from] silo_storage::Error),

    #[error("upstream CSV files are missing for '{0}'")]
    MissingCsvFiles(String),

    /// Carries a strategy-specific failure (e.g. a non-zero subprocess exit) from a downstream
    /// crate that `silo-extract` has no direct dependency on.
    #[error(transparent)]
    Strategy(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("extraction failed for {0} source(s)")]
    DataExtract(usize),
}
