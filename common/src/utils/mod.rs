//! Utility functions and helpers.

pub mod name_validator;
pub mod ordering;

pub use name_validator::{validate_collection_name, validate_database_name, NameValidator};
pub use ordering::{order_keys, order_list, OrderedMap};
