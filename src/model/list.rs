use serde::{Deserialize, Serialize};

use super::item::Item;

/// A named shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: String,
    pub name: String,
    /// Items in insertion order
    pub items: Vec<Item>,
    /// Tab position; lower sorts first
    pub order: i64,
}

impl ShoppingList {
    pub fn new(id: String, name: String, order: i64) -> Self {
        ShoppingList {
            id,
            name,
            items: Vec::new(),
            order,
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn active_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| !i.done)
    }

    pub fn done_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.done)
    }

    /// (active, done) item counts
    pub fn counts(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|i| i.done).count();
        (self.items.len() - done, done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_filters() {
        let mut list = ShoppingList::new("l1".into(), "Groceries".into(), 0);
        list.items.push(Item::new("Milk"));
        let mut eggs = Item::new("Eggs");
        eggs.done = true;
        let eggs_id = eggs.id.clone();
        list.items.push(eggs);

        assert_eq!(list.counts(), (1, 1));
        assert_eq!(list.active_items().count(), 1);
        assert_eq!(list.done_items().next().unwrap().name, "Eggs");
        assert!(list.item(&eggs_id).is_some());
        assert!(list.item("missing").is_none());
    }
}
