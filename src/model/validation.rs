/// Rejected user input. The operation that raised it changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("category key cannot be empty")]
    EmptyKey,
    #[error("category key \"{0}\" is invalid (only lowercase letters/numbers)")]
    InvalidKey(String),
    #[error("category \"{0}\" needs a display name")]
    EmptyCategoryName(String),
    #[error("unknown category: \"{0}\"")]
    UnknownCategory(String),
    #[error("duplicate category key: \"{0}\"")]
    DuplicateKey(String),
    #[error("the 'default' category cannot be deleted")]
    MissingDefault,
    #[error("the 'default' category cannot be renamed (it is \"{0}\")")]
    DefaultRenamed(String),
    #[error("list name cannot be empty")]
    EmptyListName,
    #[error("item name cannot be empty")]
    EmptyItemName,
    #[error("quantity must be a positive number, got {0}")]
    NonPositiveQuantity(i64),
}

/// Category keys are non-empty runs of `[a-z0-9]`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Check a category key, distinguishing empty from malformed.
pub fn check_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    if !is_valid_key(key) {
        return Err(ValidationError::InvalidKey(key.to_string()));
    }
    Ok(())
}
