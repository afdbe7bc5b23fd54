//! `DocumentStore` backed by the official MongoDB driver.

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::Client;

use common::errors::{AppError, AppResult};
use crate::store::{CollectionDescriptor, DatabaseDescriptor, DocumentStore, RawCollectionStats};

/// Server error code for a missing privilege.
const UNAUTHORIZED: i32 = 13;

/// MongoDB-backed store. The driver client is safe for concurrent use and
/// pools connections internally.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn query_error(e: MongoError) -> AppError {
    match *e.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
            AppError::DatabaseConnection(e.to_string())
        }
        _ => AppError::DatabaseQuery(e.to_string()),
    }
}

fn is_unauthorized(e: &MongoError) -> bool {
    matches!(*e.kind, ErrorKind::Command(ref c) if c.code == UNAUTHORIZED)
}

/// Reads a numeric field that the server may encode as int32, int64 or double.
fn numeric_field(document: &Document, key: &str) -> u64 {
    match document.get(key) {
        Some(Bson::Int32(v)) => (*v).max(0) as u64,
        Some(Bson::Int64(v)) => (*v).max(0) as u64,
        Some(Bson::Double(v)) if v.is_finite() && *v > 0.0 => *v as u64,
        _ => 0,
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_databases(&self) -> AppResult<Option<Vec<DatabaseDescriptor>>> {
        match self.client.list_databases().await {
            Ok(specs) => Ok(Some(
                specs
                    .into_iter()
                    .map(|spec| DatabaseDescriptor { name: spec.name })
                    .collect(),
            )),
            Err(e) if is_unauthorized(&e) => {
                tracing::warn!(error = %e, "listDatabases not permitted for this user");
                Ok(None)
            }
            Err(e) => Err(query_error(e)),
        }
    }

    async fn list_collections(&self, database: &str) -> AppResult<Vec<CollectionDescriptor>> {
        let mut cursor = self
            .client
            .database(database)
            .list_collections()
            .await
            .map_err(query_error)?;

        let mut collections = Vec::new();
        while cursor.advance().await.map_err(query_error)? {
            let spec = cursor.deserialize_current().map_err(query_error)?;
            collections.push(CollectionDescriptor::new(spec.name));
        }
        Ok(collections)
    }

    async fn collection_stats(
        &self,
        database: &str,
        collection: &str,
    ) -> AppResult<RawCollectionStats> {
        let reply = self
            .client
            .database(database)
            .run_command(doc! { "collStats": collection })
            .await
            .map_err(query_error)?;

        Ok(RawCollectionStats {
            size: numeric_field(&reply, "size"),
            count: numeric_field(&reply, "count"),
        })
    }

    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: &Bson,
    ) -> AppResult<Option<Document>> {
        self.client
            .database(database)
            .collection::<Document>(collection)
            .find_one(doc! { "_id": id.clone() })
            .await
            .map_err(query_error)
    }

    async fn count_documents(&self, database: &str, collection: &str) -> AppResult<u64> {
        self.client
            .database(database)
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(query_error)
    }

    async fn list_indexes(&self, database: &str, collection: &str) -> AppResult<Vec<Document>> {
        let mut cursor = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .list_indexes()
            .await
            .map_err(query_error)?;

        let mut indexes = Vec::new();
        while cursor.advance().await.map_err(query_error)? {
            let model = cursor.deserialize_current().map_err(query_error)?;
            let mut index = doc! { "key": model.keys };
            if let Some(options) = model.options {
                let options = mongodb::bson::to_document(&options)
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                for (key, value) in options {
                    index.insert(key, value);
                }
            }
            indexes.push(index);
        }
        Ok(indexes)
    }

    async fn server_status(&self) -> AppResult<Document> {
        self.client
            .database("admin")
            .run_command(doc! { "serverStatus": 1 })
            .await
            .map_err(query_error)
    }

    async fn users_info(&self, database: &str) -> AppResult<Document> {
        self.client
            .database(database)
            .run_command(doc! { "usersInfo": 1 })
            .await
            .map_err(query_error)
    }

    async fn ping(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(query_error)?;
        Ok(())
    }
}
