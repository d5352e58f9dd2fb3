use serde::Deserialize;
use std::collections::BTreeSet;

/// The reserved `source_name` meaning "materialized from a query", as opposed to an upstream
/// table.
pub const CTAS: &str = "CTAS";
/// The reserved `source_name` meaning "a view, not a physical table".
pub const VIEW: &str = "VIEW";

#[derive(Clone, Debug, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub skipped: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub primary_key: Option<Vec<String>>,
}

/// The parsed YAML descriptor for one relation.
#[derive(Clone, Debug, Deserialize)]
pub struct TableDesign {
    pub source_name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
    #[serde(default)]
    pub unload_target: Option<String>,
}

impl TableDesign {
    pub fn parse(yaml: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(yaml)
    }

    pub fn is_ctas(&self) -> bool {
        self.source_name == CTAS
    }

    pub fn is_view(&self) -> bool {
        self.source_name == VIEW
    }

    pub fn find_primary_key(&self) -> Option<&str> {
        self.constraints
            .primary_key
            .as_ref()
            .and_then(|pk| pk.first())
            .map(String::as_str)
    }

    /// Column expressions for a `SELECT`, preserving declaration order and omitting skipped
    /// columns: `<expression> AS "<name>"` when an expression is given, else a bare `"<name>"`.
    pub fn get_columns_with_casts(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.skipped)
            .map(|c| match &c.expression {
                Some(expr) => format!(r#"{expr} AS "{}""#, c.name),
                None => format!(r#""{}""#, c.name),
            })
            .collect()
    }
}
