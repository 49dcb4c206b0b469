use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, check_key};

/// Key of the always-present fallback category
pub const DEFAULT_KEY: &str = "default";

/// Which category an item belongs to.
///
/// Stored as JSON `null` for [`CategoryRef::Default`] and as the key string
/// otherwise. A stored `"default"` reads back as `Default`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum CategoryRef {
    #[default]
    Default,
    Named(String),
}

impl CategoryRef {
    /// Build a reference from a registry key, normalizing `default`
    pub fn named(key: &str) -> Self {
        CategoryRef::from(Some(key.to_string()))
    }

    /// The registry key this reference resolves to
    pub fn key(&self) -> &str {
        match self {
            CategoryRef::Default => DEFAULT_KEY,
            CategoryRef::Named(key) => key,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, CategoryRef::Default)
    }
}

impl From<Option<String>> for CategoryRef {
    fn from(key: Option<String>) -> Self {
        match key {
            Some(k) if !k.is_empty() && k != DEFAULT_KEY => CategoryRef::Named(k),
            _ => CategoryRef::Default,
        }
    }
}

impl From<CategoryRef> for Option<String> {
    fn from(category: CategoryRef) -> Self {
        match category {
            CategoryRef::Default => None,
            CategoryRef::Named(key) => Some(key),
        }
    }
}

/// Display settings for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub color: String,
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        CategoryConfig {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Built-in categories, used on first run and whenever the stored set is unusable
const BUILTIN: &[(&str, &str, &str)] = &[
    ("fruit", "Fruit", "#5a994a"),
    ("dairy", "Dairy", "#4a7db1"),
    ("household", "Household", "#666666"),
    ("meat", "Meat", "#b15a4a"),
    ("snacks", "Snacks", "#b1a04a"),
    ("pantry", "Pantry", "#8a6d3b"),
    ("frozen", "Frozen", "#5bc0de"),
    (DEFAULT_KEY, "Other", "#4a4a4a"),
];

/// The set of categories, keyed by category key, in insertion order.
///
/// The registry itself does not enforce its invariants; `validate` does, and
/// every mutation path in `ops::category_ops` calls it before swapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRegistry {
    entries: IndexMap<String, CategoryConfig>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        CategoryRegistry::builtin()
    }
}

impl CategoryRegistry {
    /// The hard-coded starter set
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(key, name, color)| (key.to_string(), CategoryConfig::new(*name, *color)))
            .collect();
        CategoryRegistry { entries }
    }

    /// Wrap raw entries without validating them
    pub fn from_entries(entries: IndexMap<String, CategoryConfig>) -> Self {
        CategoryRegistry { entries }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryConfig> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether an item reference points at an existing category
    pub fn resolves(&self, category: &CategoryRef) -> bool {
        self.contains(category.key())
    }

    /// Config for a reference, falling back to the default entry
    pub fn config_for(&self, category: &CategoryRef) -> Option<&CategoryConfig> {
        self.get(category.key()).or_else(|| self.get(DEFAULT_KEY))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryConfig)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry. Fails if the key is taken; no other checks.
    pub(crate) fn insert_new(&mut self, key: String, config: CategoryConfig) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, config);
        true
    }

    /// A copy without `key`
    pub fn without(&self, key: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.shift_remove(key);
        CategoryRegistry { entries }
    }

    /// Check every invariant the active registry must hold
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, config) in &self.entries {
            check_key(key)?;
            if config.name.trim().is_empty() {
                return Err(ValidationError::EmptyCategoryName(key.clone()));
            }
        }
        if !self.contains(DEFAULT_KEY) {
            return Err(ValidationError::MissingDefault);
        }
        Ok(())
    }

    /// Keys in display order: alphabetical by name, `default` last
    pub fn display_order(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_by(|a, b| match (*a == DEFAULT_KEY, *b == DEFAULT_KEY) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => {
                let name_a = self.entries[*a].name.to_lowercase();
                let name_b = self.entries[*b].name.to_lowercase();
                name_a.cmp(&name_b)
            }
        });
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ref_wire_format() {
        let named = CategoryRef::named("dairy");
        assert_eq!(serde_json::to_string(&named).unwrap(), "\"dairy\"");
        assert_eq!(serde_json::to_string(&CategoryRef::Default).unwrap(), "null");

        let back: CategoryRef = serde_json::from_str("null").unwrap();
        assert_eq!(back, CategoryRef::Default);
        let back: CategoryRef = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(back, CategoryRef::Default);
        let back: CategoryRef = serde_json::from_str("\"meat\"").unwrap();
        assert_eq!(back, CategoryRef::Named("meat".into()));
    }

    #[test]
    fn builtin_is_valid() {
        let reg = CategoryRegistry::builtin();
        assert_eq!(reg.len(), 8);
        assert_eq!(reg.get(DEFAULT_KEY).unwrap().name, "Other");
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_default() {
        let reg = CategoryRegistry::builtin().without(DEFAULT_KEY);
        assert_eq!(reg.validate(), Err(ValidationError::MissingDefault));
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut entries = IndexMap::new();
        entries.insert(DEFAULT_KEY.to_string(), CategoryConfig::new("Other", "#4a4a4a"));
        entries.insert("bakery".to_string(), CategoryConfig::new("  ", "#112233"));
        let reg = CategoryRegistry::from_entries(entries);
        assert_eq!(
            reg.validate(),
            Err(ValidationError::EmptyCategoryName("bakery".into()))
        );
    }

    #[test]
    fn resolves_and_falls_back() {
        let reg = CategoryRegistry::builtin();
        assert!(reg.resolves(&CategoryRef::named("fruit")));
        assert!(reg.resolves(&CategoryRef::Default));
        assert!(!reg.resolves(&CategoryRef::named("bakery")));
        assert_eq!(
            reg.config_for(&CategoryRef::named("bakery")).unwrap().name,
            "Other"
        );
    }

    #[test]
    fn display_order_sorts_by_name_default_last() {
        let reg = CategoryRegistry::builtin();
        assert_eq!(
            reg.display_order(),
            vec![
                "dairy",
                "frozen",
                "fruit",
                "household",
                "meat",
                "pantry",
                "snacks",
                "default"
            ]
        );
    }
}
