use hide::Hide;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Postgres-style connection string, parsed into its pieces.
///
/// `password` is wrapped so that `Debug`/`Display` never leak it into logs; callers that need
/// the raw value call [`Dsn::password`].
#[derive(Clone, Deserialize, Serialize)]
pub struct Dsn {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    password: Hide<String>,
}

impl Dsn {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        dbname: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            dbname: dbname.into(),
            user: user.into(),
            password: Hide::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// A `postgresql://` URL suitable for `sqlx::PgPool`. Contains the password; never log it.
    pub fn to_connect_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            urlencode(&self.user),
            urlencode(self.password()),
            self.host,
            self.port,
            self.dbname
        )
    }

    /// The JDBC connection URL used by the external extraction tool, which takes its
    /// credentials via separate `--username`/`--password-file` arguments rather than embedded
    /// in the URL.
    pub fn to_jdbc_url(&self) -> String {
        format!("jdbc:postgresql://{}:{}/{}", self.host, self.port, self.dbname)
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dsn")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let dsn = Dsn::new("db.example.com", 5439, "analytics", "etl", "s3cr3t");
        let rendered = format!("{dsn:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn jdbc_url_omits_credentials() {
        let dsn = Dsn::new("db.example.com", 5439, "analytics", "etl", "s3cr3t");
        let jdbc = dsn.to_jdbc_url();
        assert_eq!(jdbc, "jdbc:postgresql://db.example.com:5439/analytics");
        assert!(!jdbc.contains("s3cr3t"));
    }
}
