use std::fmt;

/// A qualified `schema.table` identifier.
///
/// Equality and ordering are case-sensitive; the warehouse and upstream sources this crate talks
/// to both treat identifiers as opaque byte strings once quoted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse `"schema.table"`. Returns `None` if there isn't exactly one `.`.
    pub fn parse(identifier: &str) -> Option<Self> {
        let (schema, table) = identifier.split_once('.')?;
        if table.contains('.') {
            return None;
        }
        Some(Self::new(schema, table))
    }

    pub fn identifier(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Whether this identifier names a Postgres system catalog relation.
    pub fn is_catalog_dependency(&self) -> bool {
        self.schema == "pg_catalog"
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl From<&TableName> for String {
    fn from(value: &TableName) -> Self {
        value.identifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_qualified_identifier() {
        let name = TableName::parse("www.orders").unwrap();
        assert_eq!(name.schema, "www");
        assert_eq!(name.table, "orders");
        assert_eq!(name.identifier(), "www.orders");
    }

    #[test]
    fn rejects_unqualified_identifier() {
        assert!(TableName::parse("orders").is_none());
    }

    #[test]
    fn recognizes_catalog_dependency() {
        let name = TableName::new("pg_catalog", "pg_class");
        assert!(name.is_catalog_dependency());
        assert!(!TableName::new("www", "orders").is_catalog_dependency());
    }
}
