use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use crate::util::generate_id;

/// A single entry on a shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque ID, fixed for the item's lifetime
    pub id: String,
    /// Display name as the user typed it
    pub name: String,
    /// How many to buy; absent means "unspecified"
    pub quantity: Option<NonZeroU32>,
    pub category: CategoryRef,
    pub done: bool,
}

impl Item {
    /// Create a new, not-done item with a fresh ID and no quantity or category
    pub fn new(name: impl Into<String>) -> Self {
        Item {
            id: generate_id(),
            name: name.into(),
            quantity: None,
            category: CategoryRef::Default,
            done: false,
        }
    }

    pub fn with_quantity(mut self, quantity: Option<NonZeroU32>) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_category(mut self, category: CategoryRef) -> Self {
        self.category = category;
        self
    }

    /// Lowercased name, the key used for suggestions and duplicate checks
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Fields to change on an existing item; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<Option<NonZeroU32>>,
    pub category: Option<CategoryRef>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.category.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_defaults() {
        let item = Item::new("Milk");
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, None);
        assert_eq!(item.category, CategoryRef::Default);
        assert!(!item.done);
        assert!(!item.id.is_empty());
    }

    #[test]
    fn item_json_shape() {
        let item = Item {
            id: "abc".into(),
            name: "Milk".into(),
            quantity: NonZeroU32::new(2),
            category: CategoryRef::named("dairy"),
            done: false,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "abc",
                "name": "Milk",
                "quantity": 2,
                "category": "dairy",
                "done": false
            })
        );
    }

    #[test]
    fn zero_quantity_is_rejected_by_type() {
        let bad = r#"{"id":"a","name":"Milk","quantity":0,"category":null,"done":false}"#;
        assert!(serde_json::from_str::<Item>(bad).is_err());
    }

    #[test]
    fn patch_emptiness() {
        assert!(ItemPatch::default().is_empty());
        let patch = ItemPatch {
            quantity: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
