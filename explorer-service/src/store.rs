//! Connection abstraction consumed by the explorer core.
//!
//! The core only ever reads through this trait; it never creates, mutates or
//! closes the underlying connection.

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use common::errors::AppResult;

/// One entry of a database listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseDescriptor {
    pub name: String,
}

/// One entry of a collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: String,
}

impl CollectionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Raw size/count pair as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCollectionStats {
    pub size: u64,
    pub count: u64,
}

/// Read-only handle to one database server.
///
/// Implementations must allow concurrent calls on the same handle.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists databases. `Ok(None)` means the server returned no listing at all.
    async fn list_databases(&self) -> AppResult<Option<Vec<DatabaseDescriptor>>>;

    /// Lists collections of a database.
    async fn list_collections(&self, database: &str) -> AppResult<Vec<CollectionDescriptor>>;

    /// Fetches size and count statistics of a collection.
    async fn collection_stats(&self, database: &str, collection: &str)
        -> AppResult<RawCollectionStats>;

    /// Point lookup on `_id`.
    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: &Bson,
    ) -> AppResult<Option<Document>>;

    /// Counts documents in a collection.
    async fn count_documents(&self, database: &str, collection: &str) -> AppResult<u64>;

    /// Lists index definitions of a collection.
    async fn list_indexes(&self, database: &str, collection: &str) -> AppResult<Vec<Document>>;

    /// Returns the server status document.
    async fn server_status(&self) -> AppResult<Document>;

    /// Returns the `usersInfo` reply of a database.
    async fn users_info(&self, database: &str) -> AppResult<Document>;

    /// Round-trips a no-op command.
    async fn ping(&self) -> AppResult<()>;
}
