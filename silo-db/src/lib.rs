pub mod admin;
pub mod embedded;
pub mod error;
pub mod pool;

pub use error::Error;
pub use pool::{ConnectOptions, connect, dbname, fetch_table_size, ping};
