use crate::dsn::Dsn;
use serde::{Deserialize, Serialize};

/// One upstream source's connection bundle.
///
/// The extractor is configured with a map from source name to `DataWarehouseSchema`; the name
/// doubles as the `source_name` recorded on every `RelationDescription` pulled from that source.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DataWarehouseSchema {
    pub name: String,
    pub dsn: Dsn,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl DataWarehouseSchema {
    pub fn new(name: impl Into<String>, dsn: Dsn) -> Self {
        Self {
            name: name.into(),
            dsn,
            read_only: false,
            description: None,
        }
    }
}
