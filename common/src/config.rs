//! Service configuration.
//!
//! Values are read from environment variables (a `.env` file is loaded by the
//! binaries before this runs). Missing or malformed values fall back to defaults.

use std::collections::BTreeSet;
use std::sync::Arc;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8090;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECTIONS_FILE: &str = "config/connections.json";

/// System databases hidden from every listing unless overridden.
pub const DEFAULT_SKIPPED_DATABASES: [&str; 3] = ["null", "admin", "local"];

/// Runtime configuration shared by a service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the running service, attached to responses and logs.
    pub service_name: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Timeout for establishing a connection to a database server.
    pub connect_timeout_secs: u64,
    /// Maximum pool size per database server.
    pub max_connections: u32,
    /// Path of the JSON file listing named connections.
    pub connections_file: String,
    /// Databases excluded from discovery and listing.
    pub skip_set: SkipSet,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connections_file: DEFAULT_CONNECTIONS_FILE.to_string(),
            skip_set: SkipSet::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment for the named service.
    pub fn load_with_service(service_name: &str) -> Self {
        let defaults = Self::default();
        let skip_set = std::env::var("SKIPPED_DATABASES")
            .ok()
            .map(|v| SkipSet::new(v.split(',').map(str::trim).filter(|s| !s.is_empty())))
            .unwrap_or(defaults.skip_set);

        Self {
            service_name: service_name.to_string(),
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env_parse("SERVER_PORT").unwrap_or(defaults.port),
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),
            max_connections: env_parse("MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
            connections_file: std::env::var("CONNECTIONS_FILE")
                .unwrap_or(defaults.connections_file),
            skip_set,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Immutable set of database names excluded from discovery.
///
/// Cheap to clone; every component that enumerates databases receives the
/// same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipSet(Arc<BTreeSet<String>>);

impl SkipSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(names.into_iter().map(Into::into).collect()))
    }

    /// Returns true if the database must be hidden.
    pub fn contains(&self, database: &str) -> bool {
        self.0.contains(database)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for SkipSet {
    fn default() -> Self {
        Self::new(DEFAULT_SKIPPED_DATABASES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skip_set() {
        let skip = SkipSet::default();
        assert!(skip.contains("admin"));
        assert!(skip.contains("local"));
        assert!(skip.contains("null"));
        assert!(!skip.contains("shop"));
        assert!(!skip.contains("Admin"));
    }

    #[test]
    fn test_custom_skip_set() {
        let skip = SkipSet::new(["config", "admin"]);
        assert!(skip.contains("config"));
        assert!(!skip.contains("local"));
        assert_eq!(skip.iter().collect::<Vec<_>>(), vec!["admin", "config"]);
    }
}
