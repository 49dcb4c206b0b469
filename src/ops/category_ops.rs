use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::basket::Basket;
use crate::model::category::{CategoryConfig, CategoryRef, CategoryRegistry, DEFAULT_KEY};
use crate::model::validation::{ValidationError, check_key};

/// Color given to categories added without one
pub const FALLBACK_COLOR: &str = "#cccccc";

/// Error type for category operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("category already exists: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One row of a category settings form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub key: String,
    pub name: String,
    #[serde(default = "fallback_color")]
    pub color: String,
}

fn fallback_color() -> String {
    FALLBACK_COLOR.to_string()
}

/// Build a registry from form rows, rejecting repeated keys. Other checks
/// are left to [`CategoryRegistry::validate`].
pub fn registry_from_entries(entries: Vec<CategoryEntry>) -> Result<CategoryRegistry, ValidationError> {
    let mut map = IndexMap::with_capacity(entries.len());
    for entry in entries {
        if map.contains_key(&entry.key) {
            return Err(ValidationError::DuplicateKey(entry.key));
        }
        map.insert(entry.key, CategoryConfig::new(entry.name, entry.color));
    }
    Ok(CategoryRegistry::from_entries(map))
}

/// Add a category. The key is trimmed and lowercased first.
pub fn add_category(
    basket: &mut Basket,
    key: &str,
    name: &str,
    color: Option<&str>,
) -> Result<String, CategoryError> {
    let key = key.trim().to_lowercase();
    check_key(&key)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName(key).into());
    }
    let color = color.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(FALLBACK_COLOR);

    if !basket
        .categories
        .insert_new(key.clone(), CategoryConfig::new(name, color))
    {
        return Err(CategoryError::AlreadyExists(key));
    }
    Ok(key)
}

/// Swap in a whole new registry. Items pointing at a key that no longer
/// exists fall back to the default category. Returns how many items were
/// reassigned. Nothing changes when validation fails.
///
/// The `default` entry keeps its current name; only its color may change.
pub fn replace_categories(basket: &mut Basket, new: CategoryRegistry) -> Result<usize, ValidationError> {
    new.validate()?;
    if let (Some(current), Some(next)) = (basket.categories.get(DEFAULT_KEY), new.get(DEFAULT_KEY)) {
        if current.name != next.name {
            return Err(ValidationError::DefaultRenamed(current.name.clone()));
        }
    }

    let mut reassigned = 0;
    for list in basket.lists.values_mut() {
        for item in &mut list.items {
            if !new.resolves(&item.category) {
                item.category = CategoryRef::Default;
                reassigned += 1;
            }
        }
    }
    basket.categories = new;
    if reassigned > 0 {
        tracing::debug!(reassigned, "items moved to default category");
        basket.rebuild_suggestions();
    }
    Ok(reassigned)
}

/// Drop one category, reassigning its items. The default category cannot
/// be removed.
pub fn remove_category(basket: &mut Basket, key: &str) -> Result<usize, ValidationError> {
    let key = key.trim().to_lowercase();
    let next = basket.categories.without(&key);
    replace_categories(basket, next)
}
