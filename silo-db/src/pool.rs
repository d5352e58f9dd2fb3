use crate::error::Error;
use silo_common::Dsn;
use sqlx::{Connection, Executor, PgConnection};

/// Options for opening a scoped connection to the warehouse or an upstream source.
///
/// Mirrors the two knobs the original extractor actually needs: read-only sessions against
/// upstream sources (used only to size a table before partitioning), and autocommit sessions for
/// DDL that can't run inside a transaction (`CREATE DATABASE`, `VACUUM`, ...).
#[derive(Clone, Copy, Debug, Default)]
pub struct ConnectOptions {
    pub readonly: bool,
    pub autocommit: bool,
}

impl ConnectOptions {
    pub fn readonly() -> Self {
        Self {
            readonly: true,
            autocommit: false,
        }
    }

    pub fn autocommit() -> Self {
        Self {
            readonly: false,
            autocommit: true,
        }
    }
}

/// Open a single, scoped connection. Callers are expected to drop it as soon as the operation
/// it was opened for completes — this crate never hands out pooled connections across an
/// `await` boundary that outlives one logical operation.
pub async fn connect(dsn: &Dsn, options: ConnectOptions) -> Result<PgConnection, Error> {
    let mut conn = PgConnection::connect(&dsn.to_connect_url()).await?;

    if options.readonly {
        conn.execute("SET default_transaction_read_only = on").await?;
    }
    if options.autocommit {
        // Postgres sessions are autocommit by default; sqlx never opens an implicit
        // transaction, so there is nothing further to configure here. The flag exists so
        // call sites can document intent (e.g. before a `CREATE DATABASE`).
    }

    Ok(conn)
}

/// Size, in bytes, of the named relation as seen from an already-open connection.
pub async fn fetch_table_size(conn: &mut PgConnection, identifier: &str) -> Result<u64, Error> {
    let (size,): (i64,) =
        sqlx::query_as("SELECT pg_total_relation_size($1::regclass)")
            .bind(identifier)
            .fetch_one(conn)
            .await?;
    Ok(size.max(0) as u64)
}

/// Whether the warehouse answers a trivial query; used by the CLI's `ping` helper.
pub async fn ping(conn: &mut PgConnection) -> Result<bool, Error> {
    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(conn).await?;
    Ok(one == 1)
}

/// The current database's name.
pub async fn dbname(conn: &mut PgConnection) -> Result<String, Error> {
    let (name,): (String,) = sqlx::query_as("SELECT current_database()").fetch_one(conn).await?;
    Ok(name)
}
