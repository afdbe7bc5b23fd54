//! Metadata aggregation and document identity resolution.
//!
//! Every component borrows a `DocumentStore` for the duration of one call
//! and shares nothing with the others.

pub mod collections;
pub mod databases;
pub mod identity;
pub mod media;
pub mod sidebar;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use collections::clean_collection_names;
pub use databases::DatabaseListResolver;
pub use identity::IdentityResolver;
pub use media::extract_media_fields;
pub use sidebar::SidebarBuilder;
pub use stats::StatsAggregator;
