//! Named connection registry.
//!
//! Loads connection configs from the connections file and keeps one driver
//! client per connection. Clients are created lazily by the driver, so a
//! server that is down at startup does not prevent the service from booting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tokio::sync::RwLock;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::connection::{ConnectionConfig, ConnectionItem, ConnectionsFile};
use common::utils::order_keys;
use crate::mongo_store::MongoStore;
use crate::store::DocumentStore;

/// A borrowed view of one registered connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub store: Arc<dyn DocumentStore>,
    /// Database named in the connection string, if any.
    pub default_database: Option<String>,
}

struct ManagedConnection {
    config: ConnectionConfig,
    default_database: Option<String>,
    /// `None` when the client could not be built (bad connection string).
    store: Option<Arc<dyn DocumentStore>>,
}

/// Manages one store per named connection.
pub struct PoolManager {
    config: AppConfig,
    connections: RwLock<HashMap<String, ManagedConnection>>,
}

impl PoolManager {
    /// Creates an empty manager.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a manager and registers every connection from the connections file.
    ///
    /// A missing file starts the service with no connections.
    pub async fn load(config: AppConfig) -> AppResult<Self> {
        let mgr = Self::new(config);
        let configs = match read_connections_file(&mgr.config.connections_file) {
            Ok(configs) => configs,
            Err(e) if !std::path::Path::new(&mgr.config.connections_file).exists() => {
                tracing::warn!(path = %mgr.config.connections_file, error = %e, "No connections file, starting empty");
                Vec::new()
            }
            Err(e) => return Err(AppError::Config(format!("{:#}", e))),
        };

        tracing::info!(count = configs.len(), "Loading configured connections");
        for config in configs {
            mgr.add_connection(config).await;
        }
        Ok(mgr)
    }

    /// Registers a connection, building its driver client.
    pub async fn add_connection(&self, config: ConnectionConfig) {
        let name = config.name.clone();
        let managed = match self.build_client(&config).await {
            Ok((client, default_database)) => {
                tracing::info!(name = %name, "Connection registered");
                ManagedConnection {
                    config,
                    default_database,
                    store: Some(Arc::new(MongoStore::new(client))),
                }
            }
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Client creation failed (will retry on use)");
                ManagedConnection {
                    config,
                    default_database: None,
                    store: None,
                }
            }
        };
        self.connections.write().await.insert(name, managed);
    }

    /// Registers a connection backed by an existing store.
    pub async fn add_store(
        &self,
        config: ConnectionConfig,
        default_database: Option<String>,
        store: Arc<dyn DocumentStore>,
    ) {
        let name = config.name.clone();
        self.connections.write().await.insert(
            name,
            ManagedConnection {
                config,
                default_database,
                store: Some(store),
            },
        );
    }

    async fn build_client(&self, config: &ConnectionConfig) -> AppResult<(Client, Option<String>)> {
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);
        let mut options = ClientOptions::parse(config.connection_string.as_str())
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.max_pool_size = Some(self.config.max_connections);
        if !self.config.service_name.is_empty() {
            options.app_name = Some(self.config.service_name.clone());
        }

        let default_database = options.default_database.clone();
        let client = Client::with_options(options)
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        Ok((client, default_database))
    }

    /// Returns the store and default database of a connection.
    ///
    /// Retries client creation if it failed earlier.
    pub async fn connection(&self, name: &str) -> AppResult<ConnectionHandle> {
        {
            let connections = self.connections.read().await;
            let managed = connections
                .get(name)
                .ok_or_else(|| AppError::ConnectionNotFound(name.to_string()))?;
            if let Some(store) = &managed.store {
                return Ok(ConnectionHandle {
                    store: store.clone(),
                    default_database: managed.default_database.clone(),
                });
            }
        }

        let config = self
            .connections
            .read()
            .await
            .get(name)
            .map(|m| m.config.clone())
            .ok_or_else(|| AppError::ConnectionNotFound(name.to_string()))?;
        let (client, default_database) = self.build_client(&config).await?;
        let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::new(client));
        self.add_store(config, default_database.clone(), store.clone()).await;
        Ok(ConnectionHandle {
            store,
            default_database,
        })
    }

    /// Lists connections in case-insensitive name order, credentials redacted.
    pub async fn list_connections(&self) -> Vec<ConnectionItem> {
        let connections = self.connections.read().await;
        order_keys(connections.iter().map(|(name, managed)| {
            (
                name.clone(),
                ConnectionItem {
                    name: name.clone(),
                    connection_string: managed.config.redacted_connection_string(),
                    default_database: managed.default_database.clone(),
                },
            )
        }))
        .into_iter()
        .map(|(_, item)| item)
        .collect()
    }

    /// Pings the server and returns the round-trip latency.
    pub async fn test_connection(&self, name: &str) -> AppResult<Duration> {
        let handle = self.connection(name).await?;
        let start = Instant::now();
        handle.store.ping().await?;
        Ok(start.elapsed())
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

fn read_connections_file(path: &str) -> anyhow::Result<Vec<ConnectionConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading connections file {}", path))?;
    let file: ConnectionsFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing connections file {}", path))?;
    Ok(file.into_configs())
}
