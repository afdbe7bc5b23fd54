//! Collection name normalizer.

use crate::store::CollectionDescriptor;

/// Projects a raw collection listing onto its names, keeping listing order.
///
/// Nothing is filtered here: system databases are dropped at the database
/// listing stage, and ordering is left to the caller.
pub fn clean_collection_names(descriptors: &[CollectionDescriptor]) -> Vec<String> {
    descriptors.iter().map(|d| d.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_listing_order() {
        let raw = vec![
            CollectionDescriptor::new("users"),
            CollectionDescriptor::new("Audit"),
            CollectionDescriptor::new("system.views"),
        ];
        assert_eq!(
            clean_collection_names(&raw),
            vec!["users", "Audit", "system.views"]
        );
    }

    #[test]
    fn test_empty_listing() {
        assert!(clean_collection_names(&[]).is_empty());
    }
}
