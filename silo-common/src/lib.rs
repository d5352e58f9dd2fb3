pub mod dsn;
pub mod name;
pub mod schema;

pub use dsn::Dsn;
pub use name::TableName;
pub use schema::DataWarehouseSchema;

/// Join a list of displayable values with commas, each wrapped in single quotes.
///
/// Matches the narrative logging style used throughout this crate, e.g.
/// `"creating schema 'www', granting access to 'analyst', 'admin'"`.
pub fn join_with_quotes<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
