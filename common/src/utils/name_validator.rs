//! Database and collection name validator.
//!
//! Rejects names the server would refuse or that would break URL routing,
//! before any query is issued.

use validator::ValidationError;

use crate::errors::AppError;

/// Validates caller-supplied database and collection names.
pub struct NameValidator;

/// Characters MongoDB forbids in database names.
const FORBIDDEN_DATABASE_CHARS: [char; 12] =
    ['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?'];

/// Maximum database name length in bytes.
const MAX_DATABASE_NAME_BYTES: usize = 64;

impl NameValidator {
    /// Validates a database name.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the name is empty, too long, or
    /// contains a forbidden character.
    pub fn database(name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::Validation("database name is empty".into()));
        }
        if name.len() > MAX_DATABASE_NAME_BYTES {
            return Err(AppError::Validation(format!(
                "database name exceeds {} bytes",
                MAX_DATABASE_NAME_BYTES
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| *c == '\0' || FORBIDDEN_DATABASE_CHARS.contains(c))
        {
            return Err(AppError::Validation(format!(
                "invalid database name: forbidden character {:?}",
                c
            )));
        }
        Ok(())
    }

    /// Validates a collection name.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the name is empty or contains `$` or NUL.
    pub fn collection(name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::Validation("collection name is empty".into()));
        }
        if name.contains('$') || name.contains('\0') {
            return Err(AppError::Validation(format!(
                "invalid collection name: {}",
                name
            )));
        }
        Ok(())
    }
}

/// `validator` adapter for [`NameValidator::database`].
pub fn validate_database_name(name: &str) -> Result<(), ValidationError> {
    NameValidator::database(name).map_err(|e| {
        ValidationError::new("database_name").with_message(e.to_string().into())
    })
}

/// `validator` adapter for [`NameValidator::collection`].
pub fn validate_collection_name(name: &str) -> Result<(), ValidationError> {
    NameValidator::collection(name).map_err(|e| {
        ValidationError::new("collection_name").with_message(e.to_string().into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_database_name_is_allowed() {
        assert!(NameValidator::database("shop").is_ok());
        assert!(NameValidator::database("Shop_2024-eu").is_ok());
    }

    #[test]
    fn test_database_name_with_space_is_rejected() {
        assert!(NameValidator::database("my shop").is_err());
        assert!(NameValidator::database("a.b").is_err());
        assert!(NameValidator::database("").is_err());
        assert!(NameValidator::database(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_collection_names() {
        assert!(NameValidator::collection("users").is_ok());
        assert!(NameValidator::collection("system.profile").is_ok());
        assert!(NameValidator::collection("a$b").is_err());
        assert!(NameValidator::collection("").is_err());
    }

    #[test]
    fn test_validator_adapters() {
        assert!(validate_database_name("shop").is_ok());
        let err = validate_database_name("bad name").unwrap_err();
        assert_eq!(err.code, "database_name");
        assert!(validate_collection_name("$cmd").is_err());
    }
}
