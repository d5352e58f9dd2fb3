use silo_common::TableName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("relation '{0}' has no SQL file")]
    MissingQuery(TableName),

    #[error("design for relation '{0}' is unavailable: {1}")]
    DesignUnavailable(TableName, String),

    #[error("'is_required' read on '{0}' before selection has run")]
    RequiredStateUnknown(TableName),

    #[error("cyclic dependency detected among {0} relations")]
    CyclicDependency(usize),

    #[error(transparent)]
    Storage(#[from] silo_storage::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
