//! Reachable database listing.

use std::sync::Arc;

use common::config::SkipSet;
use common::errors::AppResult;
use common::utils::order_list;
use crate::store::DocumentStore;

pub struct DatabaseListResolver {
    store: Arc<dyn DocumentStore>,
    skip_set: SkipSet,
}

impl DatabaseListResolver {
    pub fn new(store: Arc<dyn DocumentStore>, skip_set: SkipSet) -> Self {
        Self { store, skip_set }
    }

    /// Lists user databases in case-insensitive order.
    ///
    /// When the connection string already names a database, that single name
    /// is returned without querying the server. `Ok(None)` means the server
    /// returned no listing, as opposed to an empty server.
    ///
    /// # Errors
    /// Propagates a failed listing call.
    pub async fn list(&self, explicit_database: Option<&str>) -> AppResult<Option<Vec<String>>> {
        if let Some(name) = explicit_database {
            return Ok(Some(vec![name.to_string()]));
        }

        let Some(databases) = self.store.list_databases().await? else {
            tracing::warn!("database listing returned no data");
            return Ok(None);
        };

        let mut names: Vec<String> = databases
            .into_iter()
            .map(|d| d.name)
            .filter(|name| !self.skip_set.contains(name))
            .collect();
        order_list(&mut names);
        Ok(Some(names))
    }
}
