use std::num::NonZeroU32;

use indexmap::IndexMap;

use crate::model::basket::Basket;
use crate::model::category::{CategoryRef, CategoryRegistry};
use crate::model::item::{Item, ItemPatch};
use crate::model::list::ShoppingList;
use crate::model::validation::ValidationError;
use crate::ops::duplicate::is_duplicate;
use crate::parse::parse_bulk;

/// Error type for item operations
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("list not found: {0}")]
    ListNotFound(String),
    #[error("item not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// What to do when a single add matches an active item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Leave the list alone and report [`AddOutcome::Duplicate`]
    Reject,
    /// Add anyway (the user confirmed)
    Allow,
}

/// Result of a single-item add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Added; carries the new item's ID
    Added(String),
    /// An equivalent active item is already on the list; nothing changed
    Duplicate,
}

/// Result of a bulk add
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    /// IDs of the items that were added, in input order
    pub added: Vec<String>,
    /// Tokens skipped as duplicates of active items
    pub skipped: usize,
    /// `cat:` tokens that matched no category
    pub unknown_categories: Vec<String>,
}

fn list_in<'a>(
    lists: &'a mut IndexMap<String, ShoppingList>,
    list_id: &str,
) -> Result<&'a mut ShoppingList, ItemError> {
    lists.get_mut(list_id).ok_or_else(|| {
        tracing::warn!(list = %list_id, "reference to unknown list");
        ItemError::ListNotFound(list_id.to_string())
    })
}

fn item_not_found(list_id: &str, item_id: &str) -> ItemError {
    tracing::warn!(list = %list_id, item = %item_id, "reference to unknown item");
    ItemError::NotFound(item_id.to_string())
}

fn check_category(categories: &CategoryRegistry, category: &CategoryRef) -> Result<(), ValidationError> {
    if categories.resolves(category) {
        Ok(())
    } else {
        Err(ValidationError::UnknownCategory(category.key().to_string()))
    }
}

/// Turn a user-supplied quantity into a positive count.
pub fn parse_quantity(value: i64) -> Result<NonZeroU32, ValidationError> {
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ValidationError::NonPositiveQuantity(value))
}

/// Add one item (the single-item form). The name is trimmed and must be
/// non-empty; the category must exist.
pub fn add_item(
    basket: &mut Basket,
    list_id: &str,
    mut item: Item,
    policy: DuplicatePolicy,
) -> Result<AddOutcome, ItemError> {
    item.name = item.name.trim().to_string();
    if item.name.is_empty() {
        return Err(ValidationError::EmptyItemName.into());
    }
    check_category(&basket.categories, &item.category)?;

    let list = list_in(&mut basket.lists, list_id)?;
    if policy == DuplicatePolicy::Reject && is_duplicate(list, &item) {
        return Ok(AddOutcome::Duplicate);
    }

    let id = item.id.clone();
    basket.suggestions.record_usage(&item);
    list.items.push(item);
    Ok(AddOutcome::Added(id))
}

/// Parse pasted text and add every item that is not already active on the
/// list. Duplicates are skipped silently and counted.
pub fn add_bulk(basket: &mut Basket, list_id: &str, text: &str) -> Result<BulkSummary, ItemError> {
    list_in(&mut basket.lists, list_id)?;
    let parsed = parse_bulk(text, &basket.categories, &basket.suggestions);

    let list = list_in(&mut basket.lists, list_id)?;
    let mut summary = BulkSummary::default();
    for entry in parsed {
        if let Some(key) = entry.unknown_category {
            summary.unknown_categories.push(key);
        }
        if is_duplicate(list, &entry.item) {
            summary.skipped += 1;
            continue;
        }
        basket.suggestions.record_usage(&entry.item);
        summary.added.push(entry.item.id.clone());
        list.items.push(entry.item);
    }
    Ok(summary)
}

/// Delete one item. Returns it.
pub fn remove_item(basket: &mut Basket, list_id: &str, item_id: &str) -> Result<Item, ItemError> {
    let list = list_in(&mut basket.lists, list_id)?;
    let idx = list
        .items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| item_not_found(list_id, item_id))?;
    Ok(list.items.remove(idx))
}

/// Flip an item's done flag. Returns the new flag. Bringing an item back
/// from done counts as another use for suggestions.
pub fn toggle_done(basket: &mut Basket, list_id: &str, item_id: &str) -> Result<bool, ItemError> {
    let list = list_in(&mut basket.lists, list_id)?;
    let item = list
        .item_mut(item_id)
        .ok_or_else(|| item_not_found(list_id, item_id))?;
    item.done = !item.done;
    if !item.done {
        basket.suggestions.record_usage(item);
    }
    Ok(item.done)
}

/// Apply `patch` to an item. Returns whether anything changed.
pub fn edit_item(
    basket: &mut Basket,
    list_id: &str,
    item_id: &str,
    patch: ItemPatch,
) -> Result<bool, ItemError> {
    let name = match patch.name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::EmptyItemName.into());
            }
            Some(name)
        }
        None => None,
    };
    if let Some(category) = &patch.category {
        check_category(&basket.categories, category)?;
    }

    let list = list_in(&mut basket.lists, list_id)?;
    let item = list
        .item_mut(item_id)
        .ok_or_else(|| item_not_found(list_id, item_id))?;

    let mut changed = false;
    if let Some(name) = name
        && item.name != name
    {
        item.name = name;
        changed = true;
    }
    if let Some(quantity) = patch.quantity
        && item.quantity != quantity
    {
        item.quantity = quantity;
        changed = true;
    }
    if let Some(category) = patch.category
        && item.category != category
    {
        item.category = category;
        changed = true;
    }

    if changed {
        basket.suggestions.record_usage(item);
    }
    Ok(changed)
}

/// Remove every done item from a list. Returns how many were removed;
/// zero means there was nothing to clear.
pub fn clear_completed(basket: &mut Basket, list_id: &str) -> Result<usize, ItemError> {
    let list = list_in(&mut basket.lists, list_id)?;
    let before = list.items.len();
    list.items.retain(|i| !i.done);
    Ok(before - list.items.len())
}

/// Find an item by exact ID, or by name ignoring case. Active items win
/// over done ones when several share a name.
pub fn resolve_item(list: &ShoppingList, name_or_id: &str) -> Option<String> {
    if list.item(name_or_id).is_some() {
        return Some(name_or_id.to_string());
    }
    let lower = name_or_id.trim().to_lowercase();
    let named = |i: &&Item| i.name.to_lowercase() == lower;
    list.active_items()
        .find(named)
        .or_else(|| list.done_items().find(named))
        .map(|i| i.id.clone())
}
