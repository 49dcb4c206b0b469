use crate::model::basket::Basket;
use crate::model::list::ShoppingList;
use crate::model::validation::ValidationError;
use crate::util::generate_id;

/// Error type for list operations
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("list not found: {0}")]
    NotFound(String),
    #[error("a list named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn not_found(list_id: &str) -> ListError {
    tracing::warn!(list = %list_id, "reference to unknown list");
    ListError::NotFound(list_id.to_string())
}

/// Create an empty list after the last tab. Returns the new list's ID.
///
/// Names are trimmed and must be unique ignoring case.
pub fn create_list(basket: &mut Basket, name: &str) -> Result<String, ListError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyListName.into());
    }
    let lower = name.to_lowercase();
    if basket.lists.values().any(|l| l.name.to_lowercase() == lower) {
        return Err(ListError::DuplicateName(name.to_string()));
    }

    let order = basket
        .lists
        .values()
        .map(|l| l.order)
        .max()
        .map_or(0, |max| max + 1);
    let id = generate_id();
    basket
        .lists
        .insert(id.clone(), ShoppingList::new(id.clone(), name.to_string(), order));
    Ok(id)
}

/// Delete a list and every item on it. Returns the removed list.
///
/// Asking the user first is the caller's job.
pub fn delete_list(basket: &mut Basket, list_id: &str) -> Result<ShoppingList, ListError> {
    basket
        .lists
        .shift_remove(list_id)
        .ok_or_else(|| not_found(list_id))
}

/// Apply a new tab order. `ordered_ids` come first in the given order; any
/// list not named keeps its relative position after them. Orders are
/// renumbered from 0. Returns whether any order changed.
pub fn reorder_lists(basket: &mut Basket, ordered_ids: &[String]) -> Result<bool, ListError> {
    if let Some(missing) = ordered_ids.iter().find(|id| !basket.lists.contains_key(*id)) {
        return Err(not_found(missing));
    }

    let mut sequence: Vec<String> = Vec::with_capacity(basket.lists.len());
    for id in ordered_ids {
        if !sequence.contains(id) {
            sequence.push(id.clone());
        }
    }
    for list in basket.lists_in_order() {
        if !sequence.contains(&list.id) {
            sequence.push(list.id.clone());
        }
    }

    let mut changed = false;
    for (position, id) in sequence.iter().enumerate() {
        if let Some(list) = basket.lists.get_mut(id) {
            let order = position as i64;
            if list.order != order {
                list.order = order;
                changed = true;
            }
        }
    }
    Ok(changed)
}

/// Move one list to a 0-based tab position.
pub fn move_list(basket: &mut Basket, list_id: &str, position: usize) -> Result<bool, ListError> {
    let mut ids: Vec<String> = basket
        .lists_in_order()
        .iter()
        .map(|l| l.id.clone())
        .collect();
    let current = ids
        .iter()
        .position(|id| id == list_id)
        .ok_or_else(|| not_found(list_id))?;

    if position >= ids.len() {
        return Err(ListError::InvalidPosition(format!(
            "position {} out of range (0..{})",
            position,
            ids.len()
        )));
    }

    let id = ids.remove(current);
    ids.insert(position, id);
    reorder_lists(basket, &ids)
}

/// Find a list by exact ID, or by name ignoring case.
pub fn resolve_list(basket: &Basket, name_or_id: &str) -> Result<String, ListError> {
    if basket.lists.contains_key(name_or_id) {
        return Ok(name_or_id.to_string());
    }
    let lower = name_or_id.trim().to_lowercase();
    basket
        .lists
        .values()
        .find(|l| l.name.to_lowercase() == lower)
        .map(|l| l.id.clone())
        .ok_or_else(|| ListError::NotFound(name_or_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::Item;

    fn names_in_order(basket: &Basket) -> Vec<String> {
        basket
            .lists_in_order()
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    #[test]
    fn create_assigns_increasing_order() {
        let mut basket = Basket::default();
        let a = create_list(&mut basket, "Groceries").unwrap();
        let b = create_list(&mut basket, "  Hardware  ").unwrap();
        assert_eq!(basket.list(&a).unwrap().order, 0);
        assert_eq!(basket.list(&b).unwrap().order, 1);
        assert_eq!(basket.list(&b).unwrap().name, "Hardware");
    }

    #[test]
    fn create_uses_max_order_not_count() {
        let mut basket = Basket::default();
        let a = create_list(&mut basket, "A").unwrap();
        basket.list_mut(&a).unwrap().order = 7;
        let b = create_list(&mut basket, "B").unwrap();
        assert_eq!(basket.list(&b).unwrap().order, 8);
    }

    #[test]
    fn duplicate_name_ignores_case() {
        let mut basket = Basket::default();
        create_list(&mut basket, "Groceries").unwrap();
        let err = create_list(&mut basket, "groceries").unwrap_err();
        assert!(matches!(err, ListError::DuplicateName(_)));
        assert_eq!(basket.lists.len(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut basket = Basket::default();
        let err = create_list(&mut basket, "   ").unwrap_err();
        assert!(matches!(
            err,
            ListError::Validation(ValidationError::EmptyListName)
        ));
    }

    #[test]
    fn delete_removes_list_and_items() {
        let mut basket = Basket::default();
        let id = create_list(&mut basket, "Party").unwrap();
        basket.list_mut(&id).unwrap().items.push(Item::new("Chips"));

        let removed = delete_list(&mut basket, &id).unwrap();
        assert_eq!(removed.items.len(), 1);
        assert!(basket.list(&id).is_none());
        assert!(matches!(
            delete_list(&mut basket, &id),
            Err(ListError::NotFound(_))
        ));
        assert!(matches!(
            resolve_list(&basket, &id),
            Err(ListError::NotFound(_))
        ));
    }

    #[test]
    fn reorder_renumbers_and_keeps_unlisted() {
        let mut basket = Basket::default();
        let a = create_list(&mut basket, "A").unwrap();
        let _b = create_list(&mut basket, "B").unwrap();
        let c = create_list(&mut basket, "C").unwrap();

        let changed = reorder_lists(&mut basket, &[c.clone(), a.clone()]).unwrap();
        assert!(changed);
        assert_eq!(names_in_order(&basket), vec!["C", "A", "B"]);
        assert_eq!(basket.list(&c).unwrap().order, 0);

        let changed = reorder_lists(&mut basket, &[c, a]).unwrap();
        assert!(!changed);
    }

    #[test]
    fn reorder_rejects_unknown_id() {
        let mut basket = Basket::default();
        create_list(&mut basket, "A").unwrap();
        let err = reorder_lists(&mut basket, &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, ListError::NotFound(_)));
    }

    #[test]
    fn move_list_to_front_and_back() {
        let mut basket = Basket::default();
        create_list(&mut basket, "A").unwrap();
        create_list(&mut basket, "B").unwrap();
        let c = create_list(&mut basket, "C").unwrap();

        move_list(&mut basket, &c, 0).unwrap();
        assert_eq!(names_in_order(&basket), vec!["C", "A", "B"]);
        move_list(&mut basket, &c, 2).unwrap();
        assert_eq!(names_in_order(&basket), vec!["A", "B", "C"]);

        let err = move_list(&mut basket, &c, 3).unwrap_err();
        assert!(matches!(err, ListError::InvalidPosition(_)));
    }

    #[test]
    fn resolve_by_id_or_name() {
        let mut basket = Basket::default();
        let id = create_list(&mut basket, "Weekly Shop").unwrap();
        assert_eq!(resolve_list(&basket, &id).unwrap(), id);
        assert_eq!(resolve_list(&basket, "weekly shop").unwrap(), id);
        assert!(resolve_list(&basket, "monthly").is_err());
    }
}
