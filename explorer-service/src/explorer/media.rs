//! Inline media detection for the document editor.

use mongodb::bson::{Bson, Document};

use common::models::{MediaField, MediaFields, MediaKind};

const PREFIXES: [(&str, MediaKind); 3] = [
    ("data:image", MediaKind::Image),
    ("data:video", MediaKind::Video),
    ("data:audio", MediaKind::Audio),
];

/// Collects top-level string fields holding `data:image`, `data:video` or
/// `data:audio` URIs.
pub fn extract_media_fields(document: &Document) -> MediaFields {
    let mut media = MediaFields::default();
    for (field, value) in document {
        let Bson::String(src) = value else {
            continue;
        };
        let Some(kind) = PREFIXES
            .iter()
            .find(|(prefix, _)| src.starts_with(prefix))
            .map(|(_, kind)| *kind)
        else {
            continue;
        };

        let mime_type = match kind {
            MediaKind::Video => src
                .split(';')
                .next()
                .map(|head| head.trim_start_matches("data:").to_string()),
            _ => None,
        };
        media.push(
            kind,
            MediaField {
                field: field.clone(),
                src: src.clone(),
                mime_type,
            },
        );
    }
    media
}
