//! Shared data models.

pub mod connection;
pub mod explorer;

pub use connection::{ConnectionConfig, ConnectionItem, ConnectionsFile};
pub use explorer::{
    CollectionStats, CollectionStatsMap, IdType, MediaField, MediaFields, MediaKind, SidebarTree,
    StatsTree,
};
