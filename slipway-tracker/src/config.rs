//! Tracker configuration
//!
//! Defines the configurable parameters for the tracker, including the
//! persistence connection and the process-wide default deploy script.

use slipway_core::domain::job::Defaults;

/// Tracker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string for the job store
    pub database_url: String,

    /// Script run by jobs that do not carry their own
    pub default_script: String,
}

impl Config {
    /// Creates a new configuration
    pub fn new(database_url: String, default_script: String) -> Self {
        Self {
            database_url,
            default_script,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DATABASE_URL (required)
    /// - DEFAULT_SCRIPT (optional, default: "deploy.sh")
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;

        let default_script =
            std::env::var("DEFAULT_SCRIPT").unwrap_or_else(|_| "deploy.sh".to_string());

        Ok(Self {
            database_url,
            default_script,
        })
    }

    /// Fallbacks threaded into job read paths.
    ///
    /// Returned by value so callers hold an explicit configuration object
    /// rather than reading ambient global state.
    pub fn defaults(&self) -> Defaults {
        Defaults {
            script: self.default_script.clone(),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("database_url cannot be empty");
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            anyhow::bail!("database_url must start with postgres:// or postgresql://");
        }

        if self.default_script.is_empty() {
            anyhow::bail!("default_script cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            "postgres://localhost/slipway".to_string(),
            "deploy.sh".to_string(),
        )
    }
}
