//! In-memory `DocumentStore` for unit tests, with failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};

use common::errors::{AppError, AppResult};
use crate::store::{CollectionDescriptor, DatabaseDescriptor, DocumentStore, RawCollectionStats};

#[derive(Clone, Copy, PartialEq)]
enum Listing {
    Normal,
    Empty,
    Broken,
}

pub struct FakeStore {
    listing: Listing,
    databases: Vec<String>,
    collections: HashMap<String, Vec<String>>,
    stats: HashMap<(String, String), RawCollectionStats>,
    documents: HashMap<(String, String), Vec<Document>>,
    failing_lists: HashSet<String>,
    failing_stats: HashSet<(String, String)>,
    failing_find: bool,
    failing_users: bool,
    users: HashMap<String, Vec<String>>,
    stats_delay: Option<Duration>,
    find_calls: Mutex<Vec<Bson>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            listing: Listing::Normal,
            databases: Vec::new(),
            collections: HashMap::new(),
            stats: HashMap::new(),
            documents: HashMap::new(),
            failing_lists: HashSet::new(),
            failing_stats: HashSet::new(),
            failing_find: false,
            failing_users: false,
            users: HashMap::new(),
            stats_delay: None,
            find_calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_database(mut self, database: &str) -> Self {
        if !self.databases.iter().any(|d| d == database) {
            self.databases.push(database.to_string());
        }
        self.collections.entry(database.to_string()).or_default();
        self
    }

    pub fn with_collection(mut self, database: &str, collection: &str, size: u64, count: u64) -> Self {
        self = self.with_database(database);
        self.collections
            .entry(database.to_string())
            .or_default()
            .push(collection.to_string());
        self.stats.insert(
            (database.to_string(), collection.to_string()),
            RawCollectionStats { size, count },
        );
        self
    }

    pub fn with_document(mut self, database: &str, collection: &str, document: Document) -> Self {
        self.documents
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(document);
        self
    }

    /// `list_databases` answers `Ok(None)`.
    pub fn without_listing(mut self) -> Self {
        self.listing = Listing::Empty;
        self
    }

    /// `list_databases` answers with an error.
    pub fn with_broken_listing(mut self) -> Self {
        self.listing = Listing::Broken;
        self
    }

    pub fn failing_collection_list(mut self, database: &str) -> Self {
        self.failing_lists.insert(database.to_string());
        self
    }

    pub fn failing_stats(mut self, database: &str, collection: &str) -> Self {
        self.failing_stats
            .insert((database.to_string(), collection.to_string()));
        self
    }

    pub fn failing_find(mut self) -> Self {
        self.failing_find = true;
        self
    }

    pub fn with_user(mut self, database: &str, user: &str) -> Self {
        self.users
            .entry(database.to_string())
            .or_default()
            .push(user.to_string());
        self
    }

    /// `users_info` answers with an error.
    pub fn failing_users_info(mut self) -> Self {
        self.failing_users = true;
        self
    }

    pub fn with_stats_delay(mut self, delay: Duration) -> Self {
        self.stats_delay = Some(delay);
        self
    }

    /// Ids passed to `find_by_id`, in call order.
    pub fn find_calls(&self) -> Vec<Bson> {
        self.find_calls.lock().unwrap().clone()
    }

    /// Highest number of `collection_stats` calls observed running at once.
    pub fn peak_concurrent_stats(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// `_id` equality with the server's numeric semantics (42 == 42i64 == 42.0).
fn ids_match(stored: &Bson, probe: &Bson) -> bool {
    fn as_f64(b: &Bson) -> Option<f64> {
        match b {
            Bson::Int32(v) => Some(*v as f64),
            Bson::Int64(v) => Some(*v as f64),
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }
    match (as_f64(stored), as_f64(probe)) {
        (Some(a), Some(b)) => a == b,
        _ => stored == probe,
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn list_databases(&self) -> AppResult<Option<Vec<DatabaseDescriptor>>> {
        match self.listing {
            Listing::Broken => Err(AppError::DatabaseConnection("connection refused".into())),
            Listing::Empty => Ok(None),
            Listing::Normal => Ok(Some(
                self.databases
                    .iter()
                    .map(|name| DatabaseDescriptor { name: name.clone() })
                    .collect(),
            )),
        }
    }

    async fn list_collections(&self, database: &str) -> AppResult<Vec<CollectionDescriptor>> {
        if self.failing_lists.contains(database) {
            return Err(AppError::DatabaseQuery(format!("listCollections failed on {}", database)));
        }
        Ok(self
            .collections
            .get(database)
            .map(|names| names.iter().map(CollectionDescriptor::new).collect())
            .unwrap_or_default())
    }

    async fn collection_stats(
        &self,
        database: &str,
        collection: &str,
    ) -> AppResult<RawCollectionStats> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.stats_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let key = (database.to_string(), collection.to_string());
        if self.failing_stats.contains(&key) {
            return Err(AppError::DatabaseQuery(format!("collStats failed on {}", collection)));
        }
        self.stats
            .get(&key)
            .copied()
            .ok_or_else(|| AppError::DatabaseQuery(format!("ns not found: {}", collection)))
    }

    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: &Bson,
    ) -> AppResult<Option<Document>> {
        self.find_calls.lock().unwrap().push(id.clone());
        if self.failing_find {
            return Err(AppError::DatabaseConnection("socket closed".into()));
        }
        Ok(self
            .documents
            .get(&(database.to_string(), collection.to_string()))
            .and_then(|docs| {
                docs.iter()
                    .find(|d| d.get("_id").is_some_and(|stored| ids_match(stored, id)))
            })
            .cloned())
    }

    async fn count_documents(&self, database: &str, collection: &str) -> AppResult<u64> {
        Ok(self
            .documents
            .get(&(database.to_string(), collection.to_string()))
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }

    async fn list_indexes(&self, _database: &str, _collection: &str) -> AppResult<Vec<Document>> {
        Ok(vec![doc! { "key": { "_id": 1 }, "name": "_id_" }])
    }

    async fn server_status(&self) -> AppResult<Document> {
        match self.listing {
            Listing::Broken => Err(AppError::DatabaseConnection("connection refused".into())),
            _ => Ok(doc! { "host": "fake:27017", "version": "7.0.0", "ok": 1.0 }),
        }
    }

    async fn users_info(&self, database: &str) -> AppResult<Document> {
        if self.failing_users {
            return Err(AppError::DatabaseQuery("not authorized on admin to execute command".into()));
        }
        let users: Vec<Document> = self
            .users
            .get(database)
            .map(|names| {
                names
                    .iter()
                    .map(|user| doc! { "user": user, "db": database, "roles": [] })
                    .collect()
            })
            .unwrap_or_default();
        Ok(doc! { "users": users, "ok": 1.0 })
    }

    async fn ping(&self) -> AppResult<()> {
        match self.listing {
            Listing::Broken => Err(AppError::DatabaseConnection("connection refused".into())),
            _ => Ok(()),
        }
    }
}
