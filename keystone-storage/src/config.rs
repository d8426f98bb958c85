use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the keystone store.
///
/// Defaults are sqlite-first: a single-file (or in-memory) database is the
/// development and test target, with Postgres reachable through the same
/// `url` field in deployment. Every field has a serde default so a partial
/// config file deserializes cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite://keystone.db?mode=rwc` or a
    /// `postgres://` URL.
    pub url: String,

    /// Upper bound of the connection pool. Tenant-scoped reads are short;
    /// a small pool goes a long way.
    pub max_connections: u32,

    /// Timeout applied to both connect and acquire.
    pub connection_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 10,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

impl DatabaseConfig {
    /// In-memory configuration used by tests.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            connection_timeout: Duration::from_secs(10),
        }
    }

    /// Config pointing at `url`, pool settings left at their defaults.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"url": "sqlite://keystone.db?mode=rwc"}"#).unwrap();
        assert_eq!(config.url, "sqlite://keystone.db?mode=rwc");
        assert_eq!(config.max_connections, DatabaseConfig::default().max_connections);
    }

    #[test]
    fn test_for_url_keeps_default_pool_settings() {
        let config = DatabaseConfig::for_url("postgres://keystone@localhost/keystone");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
    }
}
