//! Connection and repository configuration.
//!
//! ```ignore
//! let config = jobly::DbConfig::from_env()?;
//! let client = config.connect().await?;
//! let jobs = jobly::JobRepo::from_config(&config);
//! ```

use crate::column_map::MissPolicy;
use crate::error::{DbError, DbResult};
use std::time::Duration;
use tokio_postgres::NoTls;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_APPLICATION_NAME: &str = "JOBLY_APPLICATION_NAME";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "JOBLY_CONNECT_TIMEOUT_SECS";
pub const ENV_WARN_UNMAPPED: &str = "JOBLY_WARN_UNMAPPED";

/// Configuration for connecting to the store and building repositories.
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    /// libpq-style connection string or `postgres://` URL.
    pub database_url: String,
    /// Reported to the server as `application_name`.
    pub application_name: Option<String>,
    pub connect_timeout: Option<Duration>,
    /// How column maps treat fields they have no entry for.
    pub miss_policy: MissPolicy,
}

impl DbConfig {
    /// Create a configuration with defaults.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            application_name: Some("jobly".to_string()),
            connect_timeout: None,
            miss_policy: MissPolicy::Identity,
        }
    }

    /// Set the reported application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Log a warning whenever a field falls back to its own name as a column.
    pub fn warn_unmapped(mut self) -> Self {
        self.miss_policy = MissPolicy::Warn;
        self
    }

    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> DbResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let database_url = lookup(ENV_DATABASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| DbError::Config(format!("{ENV_DATABASE_URL} is not set")))?;

        let mut config = Self::new(database_url);

        if let Some(name) = lookup(ENV_APPLICATION_NAME) {
            config = config.application_name(name);
        }

        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DbError::Config(format!(
                    "{ENV_CONNECT_TIMEOUT_SECS} must be a whole number of seconds, got {secs:?}"
                ))
            })?;
            config = config.connect_timeout(Duration::from_secs(secs));
        }

        if let Some(flag) = lookup(ENV_WARN_UNMAPPED) {
            match flag.trim() {
                "1" | "true" => config = config.warn_unmapped(),
                "0" | "false" | "" => {}
                other => {
                    return Err(DbError::Config(format!(
                        "{ENV_WARN_UNMAPPED} must be true/false, got {other:?}"
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Build the driver configuration.
    pub fn pg_config(&self) -> DbResult<tokio_postgres::Config> {
        let mut pg: tokio_postgres::Config = self
            .database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))?;
        if let Some(name) = &self.application_name {
            pg.application_name(name);
        }
        if let Some(timeout) = self.connect_timeout {
            pg.connect_timeout(timeout);
        }
        Ok(pg)
    }

    /// Open a connection and drive it on a spawned task.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn connect(&self) -> DbResult<tokio_postgres::Client> {
        let (client, connection) = self
            .pg_config()?
            .connect(NoTls)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "jobly", error = %e, "postgres connection error");
            }
        });

        tracing::debug!(target: "jobly", "connected");
        Ok(client)
    }
}
