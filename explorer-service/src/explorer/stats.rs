//! Stats aggregation.
//!
//! Walks a connection and builds per-collection size/count statistics. All
//! collection-listing and stats calls of one request run concurrently and
//! are joined before returning. A failing collection degrades to the zero
//! sentinel; only a failed top-level enumeration makes the whole result
//! unavailable (`None`).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use common::config::SkipSet;
use common::errors::AppResult;
use common::models::{CollectionStats, CollectionStatsMap, StatsTree};
use common::utils::{order_keys, OrderedMap};
use crate::explorer::collections::clean_collection_names;
use crate::store::DocumentStore;

/// Builds a [`StatsTree`] for a whole server or one database.
pub struct StatsAggregator {
    store: Arc<dyn DocumentStore>,
    skip_set: SkipSet,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, skip_set: SkipSet) -> Self {
        Self { store, skip_set }
    }

    /// Aggregates statistics for every database (`None`) or for one database.
    ///
    /// Returns `None` when the server (or the database) cannot be enumerated,
    /// which is distinct from an empty tree for an empty server.
    pub async fn aggregate(&self, database: Option<&str>) -> Option<StatsTree> {
        match database {
            Some(name) => match database_stats(self.store.clone(), name.to_string()).await {
                Ok(stats) => Some(StatsTree::Database(stats)),
                Err(e) => {
                    tracing::warn!(database = name, error = %e, "cannot list collections, stats unavailable");
                    None
                }
            },
            None => self.server_stats().await.map(StatsTree::Server),
        }
    }

    async fn server_stats(&self) -> Option<OrderedMap<CollectionStatsMap>> {
        let databases = match self.store.list_databases().await {
            Ok(Some(databases)) => databases,
            Ok(None) => {
                tracing::warn!("database listing returned no data, stats unavailable");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "database listing failed, stats unavailable");
                return None;
            }
        };

        let names: Vec<String> = databases
            .into_iter()
            .map(|d| d.name)
            .filter(|name| !self.skip_set.contains(name))
            .collect();

        let mut tasks = JoinSet::new();
        for name in &names {
            let store = self.store.clone();
            let name = name.clone();
            tasks.spawn(async move {
                let stats = database_stats(store, name.clone()).await.unwrap_or_else(|e| {
                    tracing::warn!(database = %name, error = %e, "cannot list collections, database left empty");
                    OrderedMap::new()
                });
                (name, stats)
            });
        }

        // Every listed database gets an entry even if its task dies.
        let mut tree: HashMap<String, CollectionStatsMap> =
            names.into_iter().map(|name| (name, OrderedMap::new())).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, stats)) => {
                    tree.insert(name, stats);
                }
                Err(e) => tracing::error!(error = %e, "database stats task aborted"),
            }
        }

        tracing::debug!(databases = tree.len(), "server stats aggregated");
        Some(order_keys(tree))
    }
}

/// Lists a database's collections and fetches all their stats concurrently.
///
/// # Errors
/// Only the collection listing can fail; per-collection failures become
/// [`CollectionStats::SENTINEL`].
async fn database_stats(
    store: Arc<dyn DocumentStore>,
    database: String,
) -> AppResult<CollectionStatsMap> {
    let collections = clean_collection_names(&store.list_collections(&database).await?);

    let mut tasks = JoinSet::new();
    for collection in &collections {
        let store = store.clone();
        let database = database.clone();
        let collection = collection.clone();
        tasks.spawn(async move {
            let stats = match store.collection_stats(&database, &collection).await {
                Ok(raw) => CollectionStats::new(raw.size, raw.count),
                Err(e) => {
                    tracing::warn!(database = %database, collection = %collection, error = %e, "collection stats failed, using zero stats");
                    CollectionStats::SENTINEL
                }
            };
            (collection, stats)
        });
    }

    let mut stats: HashMap<String, CollectionStats> = collections
        .into_iter()
        .map(|name| (name, CollectionStats::SENTINEL))
        .collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((collection, collection_stats)) => {
                stats.insert(collection, collection_stats);
            }
            Err(e) => tracing::error!(database = %database, error = %e, "collection stats task aborted"),
        }
    }

    Ok(order_keys(stats))
}
