//! Navigation tree: databases and their collection names.
//!
//! Never touches statistics, so it stays usable when stats calls fail.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use common::config::SkipSet;
use common::models::SidebarTree;
use common::utils::{order_keys, order_list};
use crate::explorer::collections::clean_collection_names;
use crate::store::DocumentStore;

pub struct SidebarBuilder {
    store: Arc<dyn DocumentStore>,
    skip_set: SkipSet,
}

impl SidebarBuilder {
    pub fn new(store: Arc<dyn DocumentStore>, skip_set: SkipSet) -> Self {
        Self { store, skip_set }
    }

    /// Builds the tree for every database, or only for `database`.
    ///
    /// A database whose collections cannot be listed maps to an empty list.
    /// If the server cannot be enumerated the tree is empty.
    pub async fn build(&self, database: Option<&str>) -> SidebarTree {
        match database {
            Some(name) => {
                let collections = collection_names(self.store.clone(), name.to_string()).await;
                order_keys([(name.to_string(), collections)])
            }
            None => self.build_server().await,
        }
    }

    async fn build_server(&self) -> SidebarTree {
        let databases = match self.store.list_databases().await {
            Ok(Some(databases)) => databases,
            Ok(None) => {
                tracing::warn!("database listing returned no data, sidebar empty");
                return SidebarTree::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "database listing failed, sidebar empty");
                return SidebarTree::new();
            }
        };

        let mut tasks = JoinSet::new();
        let mut tree: HashMap<String, Vec<String>> = HashMap::new();
        for descriptor in databases {
            if self.skip_set.contains(&descriptor.name) {
                continue;
            }
            tree.insert(descriptor.name.clone(), Vec::new());
            let store = self.store.clone();
            tasks.spawn(async move {
                let collections = collection_names(store, descriptor.name.clone()).await;
                (descriptor.name, collections)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, collections)) => {
                    tree.insert(name, collections);
                }
                Err(e) => tracing::error!(error = %e, "sidebar task aborted"),
            }
        }

        order_keys(tree)
    }
}

/// Ordered collection names of a database; empty if the listing fails.
async fn collection_names(store: Arc<dyn DocumentStore>, database: String) -> Vec<String> {
    match store.list_collections(&database).await {
        Ok(descriptors) => {
            let mut names = clean_collection_names(&descriptors);
            order_list(&mut names);
            names
        }
        Err(e) => {
            tracing::warn!(database = %database, error = %e, "cannot list collections for sidebar");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::testing::FakeStore;

    fn builder(store: FakeStore) -> SidebarBuilder {
        SidebarBuilder::new(Arc::new(store), SkipSet::default())
    }

    #[tokio::test]
    async fn test_server_sidebar_is_ordered_and_skips_system_databases() {
        let store = FakeStore::new()
            .with_collection("shop", "users", 1, 1)
            .with_collection("shop", "Orders", 1, 1)
            .with_collection("shop", "audit", 1, 1)
            .with_collection("admin", "system.users", 1, 1)
            .with_collection("Analytics", "events", 1, 1);
        let tree = builder(store).build(None).await;

        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["Analytics", "shop"]);
        assert_eq!(tree.get("shop").unwrap(), &vec!["audit", "Orders", "users"]);
    }

    #[tokio::test]
    async fn test_does_not_depend_on_stats() {
        let store = FakeStore::new()
            .with_collection("shop", "users", 1, 1)
            .failing_stats("shop", "users");
        let tree = builder(store).build(None).await;

        assert_eq!(tree.get("shop").unwrap(), &vec!["users"]);
    }

    #[tokio::test]
    async fn test_failing_database_degrades_to_empty_list() {
        let store = FakeStore::new()
            .with_collection("shop", "users", 1, 1)
            .with_collection("crm", "leads", 1, 1)
            .failing_collection_list("crm");
        let tree = builder(store).build(None).await;

        assert_eq!(tree.len(), 2);
        assert!(tree.get("crm").unwrap().is_empty());
        assert_eq!(tree.get("shop").unwrap(), &vec!["users"]);
    }

    #[tokio::test]
    async fn test_single_database_sidebar() {
        let store = FakeStore::new()
            .with_collection("shop", "users", 1, 1)
            .with_collection("shop", "carts", 1, 1)
            .with_collection("crm", "leads", 1, 1);
        let tree = builder(store).build(Some("shop")).await;

        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["shop"]);
        assert_eq!(tree.get("shop").unwrap(), &vec!["carts", "users"]);
    }

    #[tokio::test]
    async fn test_single_database_with_failing_listing_is_empty() {
        let store = FakeStore::new()
            .with_collection("crm", "leads", 1, 1)
            .failing_collection_list("crm");
        let tree = builder(store).build(Some("crm")).await;

        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["crm"]);
        assert!(tree.get("crm").unwrap().is_empty());
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json, serde_json::json!({ "crm": [] }));
    }

    #[tokio::test]
    async fn test_unavailable_listing_gives_empty_tree() {
        let store = FakeStore::new()
            .with_collection("shop", "users", 1, 1)
            .with_broken_listing();
        assert!(builder(store).build(None).await.is_empty());
    }
}
