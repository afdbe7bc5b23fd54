//! Document identity resolution.
//!
//! A document id arrives as a plain string, but the collection may store it
//! as an object id, an integer or a string. Nothing declares which, so the
//! resolver runs an ordered pipeline of probes and stops at the first one
//! that finds a document:
//!
//! | raw id                | probes, in order        |
//! |-----------------------|-------------------------|
//! | 24 hex characters     | object id, string       |
//! | anything else         | integer, string         |
//!
//! A probe that finds nothing is a negative result, not an error. A query
//! error aborts the whole resolution.

use std::sync::Arc;

use mongodb::bson::{oid::ObjectId, Bson, Document};

use common::errors::AppResult;
use common::models::IdType;
use crate::store::DocumentStore;

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIdentity {
    pub id_type: IdType,
    /// The id in the representation that matched.
    pub id: Option<Bson>,
    pub document: Option<Document>,
}

impl ResolvedIdentity {
    pub fn unresolved() -> Self {
        Self {
            id_type: IdType::Unresolved,
            id: None,
            document: None,
        }
    }
}

/// Shape facts about a raw id, computed once per resolution.
struct RawId<'a> {
    text: &'a str,
    is_object_id: bool,
}

/// One (predicate, lookup-key) step of the pipeline.
struct Probe {
    id_type: IdType,
    applies: fn(&RawId<'_>) -> bool,
    /// `None` when the raw id cannot be expressed in this representation.
    coerce: fn(&str) -> Option<Bson>,
}

const PROBES: [Probe; 3] = [
    Probe {
        id_type: IdType::ObjectReference,
        applies: object_id_shaped,
        coerce: as_object_id,
    },
    Probe {
        id_type: IdType::Integer,
        applies: not_object_id_shaped,
        coerce: as_integer,
    },
    Probe {
        id_type: IdType::StringIdentifier,
        applies: always,
        coerce: as_string,
    },
];

fn object_id_shaped(id: &RawId<'_>) -> bool {
    id.is_object_id
}

fn not_object_id_shaped(id: &RawId<'_>) -> bool {
    !id.is_object_id
}

fn always(_: &RawId<'_>) -> bool {
    true
}

fn as_object_id(text: &str) -> Option<Bson> {
    ObjectId::parse_str(text).ok().map(Bson::ObjectId)
}

fn as_integer(text: &str) -> Option<Bson> {
    let value: i64 = text.parse().ok()?;
    Some(match i32::try_from(value) {
        Ok(small) => Bson::Int32(small),
        Err(_) => Bson::Int64(value),
    })
}

fn as_string(text: &str) -> Option<Bson> {
    Some(Bson::String(text.to_string()))
}

/// True for exactly 24 hexadecimal characters.
pub fn is_object_id(text: &str) -> bool {
    text.len() == 24 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Resolves raw document ids against one connection.
pub struct IdentityResolver {
    store: Arc<dyn DocumentStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Finds the document whose `_id` matches `raw_id` in any supported representation.
    ///
    /// # Errors
    /// Propagates the first query error; probes are never retried.
    pub async fn resolve(
        &self,
        database: &str,
        collection: &str,
        raw_id: &str,
    ) -> AppResult<ResolvedIdentity> {
        if raw_id.is_empty() {
            return Ok(ResolvedIdentity::unresolved());
        }

        let raw = RawId {
            text: raw_id,
            is_object_id: is_object_id(raw_id),
        };

        for probe in PROBES.iter().filter(|p| (p.applies)(&raw)) {
            let Some(id) = (probe.coerce)(raw.text) else {
                tracing::debug!(raw_id, id_type = %probe.id_type, "id not representable, probe skipped");
                continue;
            };
            if let Some(document) = self.store.find_by_id(database, collection, &id).await? {
                tracing::debug!(database, collection, raw_id, id_type = %probe.id_type, "document id resolved");
                return Ok(ResolvedIdentity {
                    id_type: probe.id_type,
                    id: Some(id),
                    document: Some(document),
                });
            }
        }

        tracing::debug!(database, collection, raw_id, "document id unresolved");
        Ok(ResolvedIdentity::unresolved())
    }
}
