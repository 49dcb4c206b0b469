use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use super::item::Item;
use super::list::ShoppingList;

/// What the cache knows about one item name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionEntry {
    /// Casing to offer in suggestions
    pub canonical_name: String,
    /// Last known category; `Default` until some item supplies one
    pub category: CategoryRef,
    /// How often an item of this name has been added
    pub count: u32,
}

/// A `{name, category}` record from the default-suggestions resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultItem {
    pub name: String,
    #[serde(default)]
    pub category: CategoryRef,
}

/// Index from lowercased item name to usage count and category.
///
/// Derived entirely from the lists (plus optional defaults), so it is never
/// persisted; rebuilding gives the same result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionCache {
    entries: HashMap<String, SuggestionEntry>,
}

impl SuggestionCache {
    pub fn new() -> Self {
        SuggestionCache::default()
    }

    /// Clear and repopulate from every item in every list
    pub fn rebuild_from_store<'a>(&mut self, lists: impl IntoIterator<Item = &'a ShoppingList>) {
        self.entries.clear();
        for list in lists {
            for item in &list.items {
                self.record_usage(item);
            }
        }
    }

    /// Fold in default items. Only adds names not yet known, or fills in a
    /// category where the cache has none; counts are never reset.
    pub fn merge(&mut self, defaults: &[DefaultItem]) {
        for default in defaults {
            let name = default.name.trim();
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            match self.entries.get_mut(&key) {
                None => {
                    self.entries.insert(
                        key,
                        SuggestionEntry {
                            canonical_name: name.to_string(),
                            category: default.category.clone(),
                            count: 1,
                        },
                    );
                }
                Some(entry) => {
                    if entry.category.is_default() && !default.category.is_default() {
                        entry.category = default.category.clone();
                        entry.canonical_name = name.to_string();
                    }
                }
            }
        }
    }

    /// Count one more use of `item`'s name, creating the entry if needed
    pub fn record_usage(&mut self, item: &Item) {
        if item.name.is_empty() {
            return;
        }
        match self.entries.get_mut(&item.name_key()) {
            None => {
                self.entries.insert(
                    item.name_key(),
                    SuggestionEntry {
                        canonical_name: item.name.clone(),
                        category: item.category.clone(),
                        count: 1,
                    },
                );
            }
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                if entry.category.is_default() && !item.category.is_default() {
                    entry.category = item.category.clone();
                    entry.canonical_name = item.name.clone();
                }
            }
        }
    }

    /// Known non-default category for a name, if any
    pub fn category_for(&self, name: &str) -> Option<&CategoryRef> {
        self.entries
            .get(&name.to_lowercase())
            .map(|e| &e.category)
            .filter(|c| !c.is_default())
    }

    pub fn get(&self, name: &str) -> Option<&SuggestionEntry> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` most used names, ties broken alphabetically (case-insensitive)
    pub fn top_suggestions(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<&SuggestionEntry> = self.entries.values().collect();
        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| {
                    a.canonical_name
                        .to_lowercase()
                        .cmp(&b.canonical_name.to_lowercase())
                })
                .then_with(|| a.canonical_name.cmp(&b.canonical_name))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|e| e.canonical_name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(name: &str, category: CategoryRef) -> Item {
        Item::new(name).with_category(category)
    }

    fn list_with(items: Vec<Item>) -> ShoppingList {
        let mut list = ShoppingList::new("l".into(), "List".into(), 0);
        list.items = items;
        list
    }

    #[test]
    fn rebuild_counts_and_backfills() {
        let a = list_with(vec![
            item("milk", CategoryRef::Default),
            item("Milk", CategoryRef::named("dairy")),
            item("Bread", CategoryRef::Default),
        ]);
        let b = list_with(vec![item("MILK", CategoryRef::Default)]);

        let mut cache = SuggestionCache::new();
        cache.rebuild_from_store([&a, &b]);

        let milk = cache.get("milk").unwrap();
        assert_eq!(milk.count, 3);
        assert_eq!(milk.category, CategoryRef::named("dairy"));
        // casing comes from the item that supplied the category
        assert_eq!(milk.canonical_name, "Milk");
        assert_eq!(cache.get("bread").unwrap().count, 1);
    }

    #[test]
    fn later_default_never_overwrites_category() {
        let mut cache = SuggestionCache::new();
        cache.record_usage(&item("Eggs", CategoryRef::named("dairy")));
        cache.record_usage(&item("eggs", CategoryRef::Default));
        let eggs = cache.get("EGGS").unwrap();
        assert_eq!(eggs.category, CategoryRef::named("dairy"));
        assert_eq!(eggs.canonical_name, "Eggs");
        assert_eq!(eggs.count, 2);
    }

    #[test]
    fn merge_adds_new_and_backfills_only() {
        let mut cache = SuggestionCache::new();
        cache.record_usage(&item("Apples", CategoryRef::Default));
        cache.record_usage(&item("Apples", CategoryRef::Default));
        cache.record_usage(&item("Steak", CategoryRef::named("meat")));

        cache.merge(&[
            DefaultItem {
                name: "apples".into(),
                category: CategoryRef::named("fruit"),
            },
            DefaultItem {
                name: "Steak".into(),
                category: CategoryRef::named("frozen"),
            },
            DefaultItem {
                name: "Rice".into(),
                category: CategoryRef::named("pantry"),
            },
        ]);

        let apples = cache.get("apples").unwrap();
        assert_eq!(apples.category, CategoryRef::named("fruit"));
        assert_eq!(apples.count, 2);
        assert_eq!(apples.canonical_name, "apples");
        assert_eq!(cache.get("steak").unwrap().category, CategoryRef::named("meat"));
        assert_eq!(cache.get("rice").unwrap().count, 1);
    }

    #[test]
    fn rebuild_then_merge_same_items_is_idempotent() {
        let list = list_with(vec![
            item("Milk", CategoryRef::named("dairy")),
            item("milk", CategoryRef::Default),
            item("Soap", CategoryRef::Default),
            item("Soap", CategoryRef::named("household")),
        ]);
        let mut cache = SuggestionCache::new();
        cache.rebuild_from_store([&list]);
        let before = cache.clone();

        let as_defaults: Vec<DefaultItem> = list
            .items
            .iter()
            .map(|i| DefaultItem {
                name: i.name.clone(),
                category: i.category.clone(),
            })
            .collect();
        cache.merge(&as_defaults);
        assert_eq!(cache, before);

        let mut rebuilt = SuggestionCache::new();
        rebuilt.rebuild_from_store([&list]);
        assert_eq!(rebuilt, before);
    }

    #[test]
    fn top_suggestions_by_count_then_name() {
        let mut cache = SuggestionCache::new();
        for name in ["banana", "Apple", "cherry", "cherry", "apple"] {
            cache.record_usage(&item(name, CategoryRef::Default));
        }
        cache.record_usage(&item("bread", CategoryRef::Default));
        assert_eq!(
            cache.top_suggestions(10),
            vec!["Apple", "cherry", "banana", "bread"]
        );
        assert_eq!(cache.top_suggestions(1), vec!["Apple"]);
        assert!(cache.top_suggestions(0).is_empty());
    }

    #[test]
    fn category_for_skips_default() {
        let mut cache = SuggestionCache::new();
        cache.record_usage(&item("Tea", CategoryRef::Default));
        cache.record_usage(&item("Cheese", CategoryRef::named("dairy")));
        assert_eq!(cache.category_for("tea"), None);
        assert_eq!(
            cache.category_for("CHEESE"),
            Some(&CategoryRef::named("dairy"))
        );
        assert_eq!(cache.category_for("unknown"), None);
    }
}
