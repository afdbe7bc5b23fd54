//! Explorer views.
//!
//! Combines the explorer components into the payloads of each view. Within
//! one view the components run concurrently on the same connection.

use std::sync::Arc;

use mongodb::bson::{Bson, Document};
use serde::Serialize;
use utoipa::ToSchema;

use common::config::SkipSet;
use common::errors::{AppError, AppResult};
use common::models::{IdType, MediaFields, SidebarTree, StatsTree};
use crate::explorer::{
    clean_collection_names, extract_media_fields, DatabaseListResolver, IdentityResolver,
    SidebarBuilder, StatsAggregator,
};
use crate::pool_manager::{ConnectionHandle, PoolManager};

/// Server-level view.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionOverview {
    pub connection: String,
    /// Database embedded in the connection string; stats and sidebar are scoped to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
    /// `null` when the server could not be enumerated.
    #[schema(value_type = Option<Vec<String>>)]
    pub databases: Option<Vec<String>>,
    /// `null` when the server could not be enumerated.
    #[schema(value_type = Option<Object>)]
    pub stats: Option<StatsTree>,
    #[schema(value_type = Object)]
    pub sidebar: SidebarTree,
    /// Relaxed extended JSON of `serverStatus`, absent if it failed.
    #[schema(value_type = Option<Object>)]
    pub server_status: Option<serde_json::Value>,
}

/// Database-level view.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseOverview {
    pub connection: String,
    pub database: String,
    #[schema(value_type = Option<Object>)]
    pub stats: Option<StatsTree>,
    #[schema(value_type = Object)]
    pub sidebar: SidebarTree,
    /// Relaxed extended JSON of `usersInfo`, absent if it failed.
    #[schema(value_type = Option<Object>)]
    pub users: Option<serde_json::Value>,
}

/// Collection-level view.
#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionOverview {
    pub connection: String,
    pub database: String,
    pub collection: String,
    pub document_count: u64,
    #[schema(value_type = Object)]
    pub sidebar: SidebarTree,
}

/// Index listing of a collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionIndexes {
    pub database: String,
    pub collection: String,
    #[schema(value_type = Vec<Object>)]
    pub indexes: Vec<serde_json::Value>,
}

/// A single resolved document.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentView {
    pub database: String,
    pub collection: String,
    pub id_type: IdType,
    /// The id in its stored representation.
    #[schema(value_type = Object)]
    pub id: serde_json::Value,
    #[schema(value_type = Object)]
    pub document: serde_json::Value,
    pub media: MediaFields,
    #[schema(value_type = Object)]
    pub sidebar: SidebarTree,
}

fn to_json(document: Document) -> serde_json::Value {
    Bson::Document(document).into_relaxed_extjson()
}

/// Read-only explorer over the configured connections.
pub struct ExplorerService {
    pool_manager: Arc<PoolManager>,
    skip_set: SkipSet,
}

impl ExplorerService {
    pub fn new(pool_manager: Arc<PoolManager>, skip_set: SkipSet) -> Self {
        Self {
            pool_manager,
            skip_set,
        }
    }

    fn stats(&self, handle: &ConnectionHandle) -> StatsAggregator {
        StatsAggregator::new(handle.store.clone(), self.skip_set.clone())
    }

    fn sidebar(&self, handle: &ConnectionHandle) -> SidebarBuilder {
        SidebarBuilder::new(handle.store.clone(), self.skip_set.clone())
    }

    /// Stats, sidebar, database list and server status for a connection.
    ///
    /// # Errors
    /// Fails only if the connection is unknown or the database listing errors.
    pub async fn connection_overview(&self, connection: &str) -> AppResult<ConnectionOverview> {
        let handle = self.pool_manager.connection(connection).await?;
        let scope = handle.default_database.as_deref();

        let stats = self.stats(&handle);
        let sidebar = self.sidebar(&handle);
        let databases = DatabaseListResolver::new(handle.store.clone(), self.skip_set.clone());
        let (stats, sidebar, databases, server_status) = tokio::join!(
            stats.aggregate(scope),
            sidebar.build(scope),
            databases.list(scope),
            handle.store.server_status(),
        );

        let server_status = optional_reply(server_status, "serverStatus");

        Ok(ConnectionOverview {
            connection: connection.to_string(),
            default_database: handle.default_database.clone(),
            databases: databases?,
            stats,
            sidebar,
            server_status,
        })
    }

    /// Collection stats, sidebar and users of one database.
    pub async fn database_overview(
        &self,
        connection: &str,
        database: &str,
    ) -> AppResult<DatabaseOverview> {
        let handle = self.pool_manager.connection(connection).await?;
        let stats = self.stats(&handle);
        let sidebar = self.sidebar(&handle);
        let (stats, sidebar, users) = tokio::join!(
            stats.aggregate(Some(database)),
            sidebar.build(Some(database)),
            handle.store.users_info(database),
        );

        Ok(DatabaseOverview {
            connection: connection.to_string(),
            database: database.to_string(),
            stats,
            sidebar,
            users: optional_reply(users, "usersInfo"),
        })
    }

    /// Document count and sidebar for one collection.
    ///
    /// # Errors
    /// `NotFound` if the collection does not exist in the database.
    pub async fn collection_overview(
        &self,
        connection: &str,
        database: &str,
        collection: &str,
    ) -> AppResult<CollectionOverview> {
        let handle = self.pool_manager.connection(connection).await?;
        let sidebar = self.sidebar(&handle);
        let (exists, sidebar, count) = tokio::join!(
            collection_exists(&handle, database, collection),
            sidebar.build(Some(database)),
            handle.store.count_documents(database, collection),
        );
        exists?;

        Ok(CollectionOverview {
            connection: connection.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
            document_count: count?,
            sidebar,
        })
    }

    /// Index definitions of one collection.
    pub async fn collection_indexes(
        &self,
        connection: &str,
        database: &str,
        collection: &str,
    ) -> AppResult<CollectionIndexes> {
        let handle = self.pool_manager.connection(connection).await?;
        collection_exists(&handle, database, collection).await?;
        let indexes = handle.store.list_indexes(database, collection).await?;

        Ok(CollectionIndexes {
            database: database.to_string(),
            collection: collection.to_string(),
            indexes: indexes.into_iter().map(to_json).collect(),
        })
    }

    /// Resolves a document by raw id and prepares it for the editor.
    ///
    /// # Errors
    /// `NotFound` if no probe matched; query errors from any probe propagate.
    pub async fn document_view(
        &self,
        connection: &str,
        database: &str,
        collection: &str,
        raw_id: &str,
    ) -> AppResult<DocumentView> {
        let handle = self.pool_manager.connection(connection).await?;
        let resolver = IdentityResolver::new(handle.store.clone());
        let sidebar = self.sidebar(&handle);
        let (resolved, sidebar) = tokio::join!(
            resolver.resolve(database, collection, raw_id),
            sidebar.build(Some(database)),
        );

        let resolved = resolved?;
        let (Some(id), Some(document)) = (resolved.id, resolved.document) else {
            return Err(AppError::NotFound("document not found".into()));
        };

        Ok(DocumentView {
            database: database.to_string(),
            collection: collection.to_string(),
            id_type: resolved.id_type,
            id: id.into_relaxed_extjson(),
            media: extract_media_fields(&document),
            document: to_json(document),
            sidebar,
        })
    }
}

/// Converts a command reply, logging and dropping it on failure.
fn optional_reply(reply: AppResult<Document>, command: &str) -> Option<serde_json::Value> {
    match reply {
        Ok(document) => Some(to_json(document)),
        Err(e) => {
            tracing::warn!(command, error = %e, "command failed, field omitted");
            None
        }
    }
}

async fn collection_exists(
    handle: &ConnectionHandle,
    database: &str,
    collection: &str,
) -> AppResult<()> {
    let names = clean_collection_names(&handle.store.list_collections(database).await?);
    if names.iter().any(|name| name == collection) {
        Ok(())
    } else {
        Err(AppError::NotFound(
            "database or collection does not exist".into(),
        ))
    }
}
