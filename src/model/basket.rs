use indexmap::IndexMap;

use super::category::CategoryRegistry;
use super::list::ShoppingList;
use super::suggestion::SuggestionCache;

/// The whole application state: categories, lists and the derived
/// suggestion cache. Every operation in `ops` takes this explicitly.
#[derive(Debug, Clone, Default)]
pub struct Basket {
    pub categories: CategoryRegistry,
    /// Lists keyed by list ID
    pub lists: IndexMap<String, ShoppingList>,
    pub suggestions: SuggestionCache,
}

impl Basket {
    /// Assemble a basket and build its suggestion cache from the lists
    pub fn new(categories: CategoryRegistry, lists: IndexMap<String, ShoppingList>) -> Self {
        let mut basket = Basket {
            categories,
            lists,
            suggestions: SuggestionCache::new(),
        };
        basket.rebuild_suggestions();
        basket
    }

    pub fn list(&self, list_id: &str) -> Option<&ShoppingList> {
        self.lists.get(list_id)
    }

    pub fn list_mut(&mut self, list_id: &str) -> Option<&mut ShoppingList> {
        self.lists.get_mut(list_id)
    }

    /// Lists in tab order (by `order`, then name)
    pub fn lists_in_order(&self) -> Vec<&ShoppingList> {
        let mut lists: Vec<&ShoppingList> = self.lists.values().collect();
        lists.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        lists
    }

    pub fn rebuild_suggestions(&mut self) {
        self.suggestions.rebuild_from_store(self.lists.values());
    }
}
