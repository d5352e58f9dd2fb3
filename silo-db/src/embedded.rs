use anyhow::Context;
use postgresql_embedded::{PostgreSQL, Settings, VersionReq};
use silo_common::Dsn;
use tracing::{Instrument, info_span};

pub fn default_settings() -> anyhow::Result<Settings> {
    let version = VersionReq::parse(option_env!("POSTGRESQL_VERSION").unwrap_or("=17.2.0"))
        .context("valid psql version")?;
    Ok(Settings {
        version,
        username: "postgres".to_string(),
        password: "silo".to_string(),
        temporary: true,
        ..Default::default()
    })
}

/// Start an embedded, temporary Postgres instance and return a [`Dsn`] pointing at it.
///
/// Used only by test fixtures — production configuration always names a real warehouse.
pub async fn create() -> anyhow::Result<(Dsn, PostgreSQL)> {
    let settings = default_settings()?;
    log::info!("creating embedded database - version: {}", settings.version);

    let postgresql = async {
        let mut postgresql = PostgreSQL::new(settings);
        postgresql.setup().await.context("setting up the test database")?;
        postgresql.start().await.context("starting the test database")?;
        Ok::<_, anyhow::Error>(postgresql)
    }
    .instrument(info_span!("start database"))
    .await?;

    let dsn = Dsn::new("localhost", postgresql.settings().port, "postgres", "postgres", "silo");

    Ok((dsn, postgresql))
}
