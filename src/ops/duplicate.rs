use crate::model::item::Item;
use crate::model::list::ShoppingList;

/// Whether `existing` already covers `candidate`: same name ignoring case,
/// same category, same quantity, and `existing` is still active. A done item
/// never blocks re-adding it.
pub fn matches(existing: &Item, candidate: &Item) -> bool {
    !existing.done
        && existing.category == candidate.category
        && existing.quantity == candidate.quantity
        && existing.name.to_lowercase() == candidate.name.to_lowercase()
}

/// Whether `list` already holds an active item equivalent to `candidate`.
pub fn is_duplicate(list: &ShoppingList, candidate: &Item) -> bool {
    list.items.iter().any(|existing| matches(existing, candidate))
}
