use std::num::NonZeroU32;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::io::kv::KvStore;
use crate::model::basket::Basket;
use crate::model::category::{CategoryConfig, CategoryRef, CategoryRegistry, DEFAULT_KEY};
use crate::model::item::Item;
use crate::model::list::ShoppingList;
use crate::model::validation::is_valid_key;
use crate::ops::category_ops::FALLBACK_COLOR;
use crate::util::generate_id;

pub const LISTS_KEY: &str = "shoppingLists";
pub const CATEGORIES_KEY: &str = "categoryConfig";

/// Error type for persistence
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {key}: {source}")]
    Read {
        key: String,
        source: std::io::Error,
    },
    #[error("could not save {key}: {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },
    #[error("could not encode data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Things the loader had to fix, for the caller to report
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Built-in categories replaced a missing or unusable registry
    pub categories_reset: bool,
    /// Some stored list or item data was dropped or rewritten
    pub lists_repaired: bool,
    /// Keys whose raw value was copied aside before being replaced
    pub backed_up: Vec<String>,
    /// Keys that exist but could not be read. They stay untouched on disk
    /// for this session; see [`save_basket`].
    pub held: Vec<String>,
    /// Failures that left the loaded state non-durable
    pub errors: Vec<StorageError>,
}

/// Outcome of reading the category registry
#[derive(Debug)]
pub struct RegistryLoad {
    pub registry: CategoryRegistry,
    /// The built-in set was used in place of the stored one
    pub fallback: bool,
    /// Individual entries were dropped or patched
    pub repaired: bool,
}

impl RegistryLoad {
    fn fallback() -> Self {
        RegistryLoad {
            registry: CategoryRegistry::builtin(),
            fallback: true,
            repaired: false,
        }
    }
}

/// Parse a stored category registry. Missing, unparsable or default-less
/// data gives the built-in set. Malformed entries are dropped; a missing
/// color becomes the fallback color.
pub fn registry_from_raw(raw: Option<&str>) -> RegistryLoad {
    let Some(raw) = raw else {
        return RegistryLoad::fallback();
    };
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            tracing::warn!("stored categories are not an object, using built-in set");
            return RegistryLoad::fallback();
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not parse stored categories, using built-in set");
            return RegistryLoad::fallback();
        }
    };

    let mut repaired = false;
    let mut entries = IndexMap::with_capacity(object.len());
    for (key, value) in object {
        if !is_valid_key(&key) {
            tracing::warn!(key = %key, "dropping category with invalid key");
            repaired = true;
            continue;
        }
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let Some(name) = name else {
            tracing::warn!(key = %key, "dropping category without a name");
            repaired = true;
            continue;
        };
        let color = match value.get("color").and_then(Value::as_str) {
            Some(color) => color,
            None => {
                repaired = true;
                FALLBACK_COLOR
            }
        };
        entries.insert(key, CategoryConfig::new(name, color));
    }

    if !entries.contains_key(DEFAULT_KEY) {
        tracing::warn!("stored categories have no '{}' entry, using built-in set", DEFAULT_KEY);
        return RegistryLoad::fallback();
    }

    RegistryLoad {
        registry: CategoryRegistry::from_entries(entries),
        fallback: false,
        repaired,
    }
}

/// Outcome of reading the list store
#[derive(Debug)]
pub struct ListsLoad {
    pub lists: IndexMap<String, ShoppingList>,
    /// The stored value was unusable as a whole
    pub discarded: bool,
    /// Some records were dropped or patched
    pub repaired: bool,
}

fn read_item(value: &Value, categories: &CategoryRegistry, repaired: &mut bool) -> Option<Item> {
    let Some(object) = value.as_object() else {
        *repaired = true;
        return None;
    };
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let Some(name) = name else {
        tracing::warn!("dropping item without a name");
        *repaired = true;
        return None;
    };

    let id = match object.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            *repaired = true;
            generate_id()
        }
    };

    let quantity = match object.get("quantity") {
        None | Some(Value::Null) => None,
        Some(q) => {
            let parsed = q
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .and_then(NonZeroU32::new);
            if parsed.is_none() {
                *repaired = true;
            }
            parsed
        }
    };

    let category = match object.get("category") {
        None | Some(Value::Null) => CategoryRef::Default,
        Some(Value::String(key)) => CategoryRef::named(key),
        Some(_) => {
            *repaired = true;
            CategoryRef::Default
        }
    };
    let category = if categories.resolves(&category) {
        category
    } else {
        tracing::warn!(item = %name, category = %category.key(), "item refers to unknown category");
        *repaired = true;
        CategoryRef::Default
    };

    let done = match object.get("done") {
        Some(Value::Bool(done)) => *done,
        _ => {
            *repaired = true;
            false
        }
    };

    Some(Item {
        id,
        name: name.to_string(),
        quantity,
        category,
        done,
    })
}

fn read_list(
    key: &str,
    object: &Map<String, Value>,
    categories: &CategoryRegistry,
    repaired: &mut bool,
) -> Option<(ShoppingList, Option<i64>)> {
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let Some(name) = name else {
        tracing::warn!(list = %key, "dropping list without a name");
        *repaired = true;
        return None;
    };

    if object.get("id").and_then(Value::as_str) != Some(key) {
        *repaired = true;
    }

    let items = match object.get("items") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| read_item(v, categories, repaired))
            .collect(),
        _ => {
            *repaired = true;
            Vec::new()
        }
    };

    let order = object.get("order").and_then(Value::as_i64).filter(|o| *o >= 0);
    if order.is_none() {
        *repaired = true;
    }

    let mut list = ShoppingList::new(key.to_string(), name.to_string(), 0);
    list.items = items;
    Some((list, order))
}

/// Parse the stored list store against the active registry. The map key
/// is authoritative for each list's ID. Lists without a usable order go
/// after the rest, in stored sequence.
pub fn lists_from_raw(raw: Option<&str>, categories: &CategoryRegistry) -> ListsLoad {
    let empty = |discarded| ListsLoad {
        lists: IndexMap::new(),
        discarded,
        repaired: false,
    };
    let Some(raw) = raw else {
        return empty(false);
    };
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            tracing::warn!("stored lists are not an object, starting empty");
            return empty(true);
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not parse stored lists, starting empty");
            return empty(true);
        }
    };

    let mut repaired = false;
    let mut lists = IndexMap::with_capacity(object.len());
    let mut unordered = Vec::new();
    for (key, value) in &object {
        let Some(record) = value.as_object() else {
            tracing::warn!(list = %key, "dropping list record that is not an object");
            repaired = true;
            continue;
        };
        if let Some((mut list, order)) = read_list(key, record, categories, &mut repaired) {
            match order {
                Some(order) => list.order = order,
                None => unordered.push(key.clone()),
            }
            lists.insert(key.clone(), list);
        }
    }

    let mut next = lists
        .iter()
        .filter(|(k, _)| !unordered.contains(k))
        .map(|(_, l)| l.order)
        .max()
        .map_or(0, |max| max + 1);
    for key in unordered {
        if let Some(list) = lists.get_mut(&key) {
            list.order = next;
            next += 1;
        }
    }

    let mut seen: Vec<String> = Vec::with_capacity(lists.len());
    for list in lists.values() {
        let lower = list.name.to_lowercase();
        if seen.contains(&lower) {
            tracing::warn!(name = %list.name, "two stored lists share a name");
        } else {
            seen.push(lower);
        }
    }

    ListsLoad {
        lists,
        discarded: false,
        repaired,
    }
}

fn read_key(store: &dyn KvStore, key: &str) -> Result<Option<String>, StorageError> {
    store.get(key).map_err(|source| StorageError::Read {
        key: key.to_string(),
        source,
    })
}

fn hold(report: &mut LoadReport, key: &str, error: StorageError) {
    tracing::warn!(key, error = %error, "could not read stored data, leaving it in place");
    if !report.held.iter().any(|k| k == key) {
        report.held.push(key.to_string());
    }
    report.errors.push(error);
}

fn write_value(store: &mut dyn KvStore, key: &str, value: &str) -> Result<(), StorageError> {
    store.set(key, value).map_err(|source| StorageError::Write {
        key: key.to_string(),
        source,
    })
}

fn back_up(store: &mut dyn KvStore, key: &str, raw: Option<&str>, report: &mut LoadReport) {
    let Some(raw) = raw else { return };
    match store.backup(key, raw) {
        Ok(()) => report.backed_up.push(key.to_string()),
        Err(e) => tracing::warn!(key, error = %e, "could not back up stored data"),
    }
}

/// Load the whole application state. Never fails: unusable data is
/// repaired or replaced (and the replacement written back), and the
/// report says what happened.
///
/// A key that could not be read is held: defaults stand in for it and
/// nothing is written over it. Lists depend on the registry, so an
/// unreadable registry holds the lists too.
pub fn load_basket(store: &mut dyn KvStore) -> (Basket, LoadReport) {
    let mut report = LoadReport::default();

    let categories = match read_key(store, CATEGORIES_KEY) {
        Ok(raw) => {
            let loaded = registry_from_raw(raw.as_deref());
            if loaded.fallback {
                report.categories_reset = raw.is_some();
                back_up(store, CATEGORIES_KEY, raw.as_deref(), &mut report);
            }
            if loaded.fallback || loaded.repaired {
                if let Err(e) = save_categories(store, &loaded.registry) {
                    report.errors.push(e);
                }
            }
            loaded.registry
        }
        Err(e) => {
            hold(&mut report, CATEGORIES_KEY, e);
            report.held.push(LISTS_KEY.to_string());
            CategoryRegistry::builtin()
        }
    };

    let lists = match read_key(store, LISTS_KEY) {
        Ok(raw) => {
            let loaded = lists_from_raw(raw.as_deref(), &categories);
            let held = report.held.iter().any(|k| k == LISTS_KEY);
            if loaded.discarded && !held {
                back_up(store, LISTS_KEY, raw.as_deref(), &mut report);
            }
            report.lists_repaired = loaded.discarded || loaded.repaired;
            if report.lists_repaired && !held {
                if let Err(e) = save_lists(store, &loaded.lists) {
                    report.errors.push(e);
                }
            }
            loaded.lists
        }
        Err(e) => {
            hold(&mut report, LISTS_KEY, e);
            IndexMap::new()
        }
    };

    tracing::debug!(
        categories = categories.len(),
        lists = lists.len(),
        held = report.held.len(),
        "loaded basket"
    );
    (Basket::new(categories, lists), report)
}

fn save_categories(store: &mut dyn KvStore, categories: &CategoryRegistry) -> Result<(), StorageError> {
    let json = serde_json::to_string(categories)?;
    write_value(store, CATEGORIES_KEY, &json)
}

fn save_lists(store: &mut dyn KvStore, lists: &IndexMap<String, ShoppingList>) -> Result<(), StorageError> {
    let json = serde_json::to_string(lists)?;
    write_value(store, LISTS_KEY, &json)
}

/// Write the full snapshot: categories, then lists. Keys listed in `held`
/// are skipped.
pub fn save_basket(store: &mut dyn KvStore, basket: &Basket, held: &[String]) -> Result<(), StorageError> {
    let skip = |key: &str| held.iter().any(|k| k == key);
    if !skip(CATEGORIES_KEY) {
        save_categories(store, &basket.categories)?;
    }
    if !skip(LISTS_KEY) {
        save_lists(store, &basket.lists)?;
    }
    tracing::debug!(lists = basket.lists.len(), held = held.len(), "saved basket");
    Ok(())
}
