//! Warehouse user/schema administration.
//!
//! These are thin DDL wrappers, not a management CLI — no subcommand is built on top of them.
//! They exist because the connection-holding collaborator they live next to is also where the
//! original extractor kept them.

use crate::error::Error;
use silo_common::join_with_quotes;
use sqlx::PgConnection;

/// A schema to create, with the groups that should own or merely read from it.
#[derive(Clone, Debug)]
pub struct SchemaSpec {
    pub name: String,
    pub owner_groups: Vec<String>,
    pub reader_groups: Vec<String>,
}

pub async fn create_schema(conn: &mut PgConnection, name: &str, owner: Option<&str>) -> Result<(), Error> {
    let stmt = match owner {
        Some(owner) => format!(r#"CREATE SCHEMA IF NOT EXISTS "{name}" AUTHORIZATION "{owner}""#),
        None => format!(r#"CREATE SCHEMA IF NOT EXISTS "{name}""#),
    };
    sqlx::query(&stmt).execute(&mut *conn).await?;
    Ok(())
}

pub async fn grant_all_on_schema(conn: &mut PgConnection, schema: &str, group: &str) -> Result<(), Error> {
    sqlx::query(&format!(r#"GRANT ALL ON SCHEMA "{schema}" TO GROUP "{group}""#))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn grant_usage(conn: &mut PgConnection, schema: &str, group: &str) -> Result<(), Error> {
    sqlx::query(&format!(r#"GRANT USAGE ON SCHEMA "{schema}" TO GROUP "{group}""#))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn create_group(conn: &mut PgConnection, group: &str) -> Result<(), Error> {
    sqlx::query(&format!(r#"CREATE GROUP "{group}""#))
        .execute(&mut *conn)
        .await
        .ok();
    Ok(())
}

pub async fn create_user(conn: &mut PgConnection, user: &str, group: &str) -> Result<(), Error> {
    sqlx::query(&format!(r#"CREATE USER "{user}" IN GROUP "{group}""#))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn alter_group_add_user(conn: &mut PgConnection, group: &str, user: &str) -> Result<(), Error> {
    sqlx::query(&format!(r#"ALTER GROUP "{group}" ADD USER "{user}""#))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn alter_search_path(conn: &mut PgConnection, user: &str, search_path: &[String]) -> Result<(), Error> {
    let joined = search_path.join(", ");
    sqlx::query(&format!(r#"ALTER USER "{user}" SET search_path TO {joined}"#))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn drop_and_create_database(conn: &mut PgConnection, name: &str) -> Result<(), Error> {
    sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}""#))
        .execute(&mut *conn)
        .await?;
    sqlx::query(&format!(r#"CREATE DATABASE "{name}""#))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Drop `PUBLIC` and create each configured schema, granting the owner/reader groups.
pub async fn create_schemas(conn: &mut PgConnection, schemas: &[SchemaSpec], owner: Option<&str>) -> Result<(), Error> {
    log::info!("dropping public schema");
    sqlx::query("DROP SCHEMA IF EXISTS PUBLIC CASCADE")
        .execute(&mut *conn)
        .await?;

    for schema in schemas {
        log::info!(
            "creating schema '{}', granting access to {}",
            schema.name,
            join_with_quotes(&schema.reader_groups)
        );
        create_schema(conn, &schema.name, owner).await?;
        for group in &schema.owner_groups {
            grant_all_on_schema(conn, &schema.name, group).await?;
        }
        for group in &schema.reader_groups {
            grant_usage(conn, &schema.name, group).await?;
        }
    }
    Ok(())
}

/// Add a new user, with an optional personal schema, safe to re-run when user/group creation
/// is skipped.
pub async fn create_new_user(
    conn: &mut PgConnection,
    name: &str,
    group: &str,
    is_etl_user: bool,
    add_user_schema: bool,
    skip_user_creation: bool,
    owner_group: &str,
) -> Result<(), Error> {
    if name == "default" {
        return Err(Error::IllegalUserName(name.to_string()));
    }

    if !skip_user_creation {
        log::info!("creating user '{name}' in group '{group}'");
        create_user(conn, name, group).await?;
    }
    if is_etl_user {
        log::info!("adding user '{name}' to ETL group '{owner_group}'");
        alter_group_add_user(conn, owner_group, name).await?;
    }
    if add_user_schema {
        log::info!("creating schema '{name}' with owner '{name}'");
        create_schema(conn, name, Some(name)).await?;
        grant_all_on_schema(conn, name, owner_group).await?;
        grant_usage(conn, name, group).await?;
    }

    let mut search_path = vec!["public".to_string()];
    if add_user_schema {
        search_path.insert(0, "'$user'".to_string());
    }
    log::info!("setting search path for user '{name}' to: {}", search_path.join(", "));
    alter_search_path(conn, name, &search_path).await?;

    Ok(())
}
