//! Connection configuration models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// On-disk connections file: `{"connections": {"<name>": {...}}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionsFile {
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionEntry>,
}

/// One entry of the connections file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionEntry {
    /// MongoDB connection string.
    pub connection_string: String,
}

/// Full connection configuration (kept server-side).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Connection name, used in every explorer route.
    pub name: String,
    /// MongoDB connection string (may carry credentials).
    pub connection_string: String,
}

impl ConnectionsFile {
    /// Flattens the file into configs, keyed by name.
    pub fn into_configs(self) -> Vec<ConnectionConfig> {
        self.connections
            .into_iter()
            .map(|(name, entry)| ConnectionConfig {
                name,
                connection_string: entry.connection_string,
            })
            .collect()
    }
}

impl ConnectionConfig {
    /// Connection string with any `user:password@` section replaced.
    pub fn redacted_connection_string(&self) -> String {
        let Some((scheme, rest)) = self.connection_string.split_once("://") else {
            return self.connection_string.clone();
        };
        let authority_end = rest.find('/').unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => format!("{}://***@{}", scheme, &rest[at + 1..]),
            None => self.connection_string.clone(),
        }
    }
}

/// Connection item for API responses (excludes credentials).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionItem {
    /// Connection name.
    pub name: String,
    /// Connection string with credentials redacted.
    pub connection_string: String,
    /// Database embedded in the connection string, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
}
