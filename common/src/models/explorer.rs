//! Explorer models: statistics, navigation tree and identity tags.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::OrderedMap;

/// Size and document count of one collection.
///
/// The all-zero value is the sentinel substituted when the stats call for a
/// collection fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    /// Uncompressed data size in bytes.
    pub storage_bytes: u64,
    /// Number of documents.
    pub document_count: u64,
}

impl CollectionStats {
    pub const SENTINEL: CollectionStats = CollectionStats {
        storage_bytes: 0,
        document_count: 0,
    };

    pub fn new(storage_bytes: u64, document_count: u64) -> Self {
        Self {
            storage_bytes,
            document_count,
        }
    }
}

/// Collection name → stats, in canonical order.
pub type CollectionStatsMap = OrderedMap<CollectionStats>;

/// Nested statistics for a whole server or a single database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatsTree {
    /// Database name → collection name → stats.
    Server(OrderedMap<CollectionStatsMap>),
    /// Collection name → stats for one database.
    Database(CollectionStatsMap),
}

/// Database name → collection names, both in canonical order.
pub type SidebarTree = OrderedMap<Vec<String>>;

/// Storage type a document id turned out to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// Native 12-byte object id.
    ObjectReference,
    /// Integer id.
    Integer,
    /// Plain string id.
    StringIdentifier,
    /// No probe matched.
    Unresolved,
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdType::ObjectReference => write!(f, "object_reference"),
            IdType::Integer => write!(f, "integer"),
            IdType::StringIdentifier => write!(f, "string_identifier"),
            IdType::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Kind of an embedded `data:` URI field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

/// A top-level document field holding an inline media `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MediaField {
    /// Field name.
    pub field: String,
    /// The full `data:` URI.
    pub src: String,
    /// MIME type (videos only, as the player needs it).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Media fields of a document grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MediaFields {
    pub images: Vec<MediaField>,
    pub videos: Vec<MediaField>,
    pub audio: Vec<MediaField>,
}

impl MediaFields {
    pub fn push(&mut self, kind: MediaKind, field: MediaField) {
        match kind {
            MediaKind::Image => self.images.push(field),
            MediaKind::Video => self.videos.push(field),
            MediaKind::Audio => self.audio.push(field),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty() && self.audio.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::order_keys;

    #[test]
    fn test_collection_stats_serializes_camel_case() {
        let json = serde_json::to_value(CollectionStats::new(600, 3)).unwrap();
        assert_eq!(json["storageBytes"], 600);
        assert_eq!(json["documentCount"], 3);
        assert_eq!(CollectionStats::default(), CollectionStats::SENTINEL);
    }

    #[test]
    fn test_stats_tree_serializes_as_plain_object() {
        let db = order_keys(vec![("users", CollectionStats::new(600, 3))]);
        let tree = StatsTree::Server(order_keys(vec![("shop", db.clone())]));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["shop"]["users"]["documentCount"], 3);

        let flat = serde_json::to_value(StatsTree::Database(db)).unwrap();
        assert_eq!(flat["users"]["storageBytes"], 600);
    }

    #[test]
    fn test_id_type_display_matches_serde() {
        for tag in [
            IdType::ObjectReference,
            IdType::Integer,
            IdType::StringIdentifier,
            IdType::Unresolved,
        ] {
            let json = serde_json::to_value(tag).unwrap();
            assert_eq!(json, tag.to_string());
        }
    }
}
