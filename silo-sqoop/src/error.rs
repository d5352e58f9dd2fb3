use silo_extract::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("sqoop exited with status {0}")]
    SqoopExecution(i32),

    #[error(transparent)]
    Db(#[from] silo_db::Error),

    #[error(transparent)]
    Storage(#[from] silo_storage::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<Error> for RuntimeError {
    fn from(err: Error) -> Self {
        RuntimeError::Strategy(anyhow::anyhow!(err))
    }
}
