use std::num::NonZeroU32;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::category::{CategoryRef, CategoryRegistry};
use crate::model::item::Item;
use crate::model::suggestion::SuggestionCache;

/// `<name> [x<qty>] [cat|category: <key>]`, case-insensitive. Quantity
/// digits and key characters are ASCII only.
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)(?:\s+x([0-9]+))?(?:\s+(?:cat(?:egory)?):\s*([A-Za-z0-9_]+))?$")
        .expect("item pattern is valid")
});

/// Category token that always means the default category
const OTHER_TOKEN: &str = "other";

/// Result of parsing one item token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub item: Item,
    /// A `cat:` token that matched no category and was dropped
    pub unknown_category: Option<String>,
}

/// Map a user-typed category key to a reference. `other` always means the
/// default category; any other key must exist in the registry.
pub fn category_for_key(key: &str, categories: &CategoryRegistry) -> Option<CategoryRef> {
    let key = key.trim().to_lowercase();
    if categories.contains(&key) {
        Some(CategoryRef::named(&key))
    } else if key == OTHER_TOKEN {
        Some(CategoryRef::Default)
    } else {
        None
    }
}

/// Split bulk text into item tokens on `,`, `;` and newlines.
pub fn split_items(text: &str) -> Vec<&str> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a single token like `Milk x2 cat:dairy` into a new item.
///
/// Returns `None` for blank input. A zero or oversized quantity is dropped.
/// An unknown category falls back to the default and is reported in
/// [`ParsedItem::unknown_category`]. Without an explicit category the
/// suggestion cache supplies one if it knows the name.
pub fn parse_item(
    token: &str,
    categories: &CategoryRegistry,
    suggestions: &SuggestionCache,
) -> Option<ParsedItem> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let mut name = token.to_string();
    let mut quantity = None;
    let mut explicit_category = None;
    let mut unknown_category = None;

    if let Some(caps) = ITEM_RE.captures(token) {
        let captured = caps.get(1).map_or("", |m| m.as_str()).trim();
        if !captured.is_empty() {
            name = captured.to_string();
        }
        quantity = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .and_then(NonZeroU32::new);
        if let Some(m) = caps.get(3) {
            let key = m.as_str().to_lowercase();
            if let Some(category) = category_for_key(&key, categories) {
                explicit_category = Some(category);
            } else {
                tracing::warn!(
                    item = %name,
                    category = %key,
                    "unknown category key, assigning to default"
                );
                explicit_category = Some(CategoryRef::Default);
                unknown_category = Some(key);
            }
        }
    }

    let category = match explicit_category {
        Some(category) => category,
        None => suggestions
            .category_for(&name)
            .filter(|c| categories.resolves(c))
            .cloned()
            .unwrap_or_default(),
    };

    let item = Item::new(name)
        .with_quantity(quantity)
        .with_category(category);
    Some(ParsedItem {
        item,
        unknown_category,
    })
}

/// Parse every token of a bulk paste against the same cache snapshot.
pub fn parse_bulk(
    text: &str,
    categories: &CategoryRegistry,
    suggestions: &SuggestionCache,
) -> Vec<ParsedItem> {
    split_items(text)
        .into_iter()
        .filter_map(|token| parse_item(token, categories, suggestions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(token: &str) -> ParsedItem {
        parse_item(token, &CategoryRegistry::builtin(), &SuggestionCache::new()).unwrap()
    }

    fn qty(n: u32) -> Option<NonZeroU32> {
        NonZeroU32::new(n)
    }

    #[test]
    fn name_quantity_and_category() {
        let parsed = parse("Milk x2 cat:dairy");
        assert_eq!(parsed.item.name, "Milk");
        assert_eq!(parsed.item.quantity, qty(2));
        assert_eq!(parsed.item.category, CategoryRef::named("dairy"));
        assert!(!parsed.item.done);
        assert_eq!(parsed.unknown_category, None);
    }

    #[test]
    fn zero_quantity_is_discarded() {
        let parsed = parse("Milk x0");
        assert_eq!(parsed.item.name, "Milk");
        assert_eq!(parsed.item.quantity, None);
        assert_eq!(parsed.item.category, CategoryRef::Default);
    }

    #[test]
    fn oversized_quantity_is_discarded() {
        let parsed = parse("Rice x99999999999");
        assert_eq!(parsed.item.name, "Rice");
        assert_eq!(parsed.item.quantity, None);
    }

    #[test]
    fn non_numeric_quantity_stays_in_name() {
        let parsed = parse("Box xl");
        assert_eq!(parsed.item.name, "Box xl");
        assert_eq!(parsed.item.quantity, None);
    }

    #[test]
    fn quantity_values_round_trip() {
        for n in [1u32, 3, 12, 250] {
            let parsed = parse(&format!("Eggs x{}", n));
            assert_eq!(parsed.item.quantity, qty(n));
            assert_eq!(parsed.item.name, "Eggs");
        }
    }

    #[test]
    fn case_insensitive_markers() {
        let parsed = parse("Frozen Peas X3 CATEGORY: Frozen");
        assert_eq!(parsed.item.name, "Frozen Peas");
        assert_eq!(parsed.item.quantity, qty(3));
        assert_eq!(parsed.item.category, CategoryRef::named("frozen"));
    }

    #[test]
    fn category_without_quantity() {
        let parsed = parse("Bananas cat:fruit");
        assert_eq!(parsed.item.name, "Bananas");
        assert_eq!(parsed.item.quantity, None);
        assert_eq!(parsed.item.category, CategoryRef::named("fruit"));
    }

    #[test]
    fn unknown_category_falls_back_and_is_reported() {
        let parsed = parse("Croissant cat:bakery");
        assert_eq!(parsed.item.name, "Croissant");
        assert_eq!(parsed.item.category, CategoryRef::Default);
        assert_eq!(parsed.unknown_category.as_deref(), Some("bakery"));
    }

    #[test]
    fn non_ascii_marker_stays_in_name() {
        let parsed = parse("Foo cat:épices");
        assert_eq!(parsed.item.name, "Foo cat:épices");
        assert_eq!(parsed.item.category, CategoryRef::Default);
        assert_eq!(parsed.unknown_category, None);

        let parsed = parse("Tea x٣");
        assert_eq!(parsed.item.name, "Tea x٣");
        assert_eq!(parsed.item.quantity, None);
    }

    #[test]
    fn other_maps_to_default_silently() {
        let parsed = parse("Batteries cat:other");
        assert_eq!(parsed.item.category, CategoryRef::Default);
        assert_eq!(parsed.unknown_category, None);
    }

    #[test]
    fn explicit_default_key() {
        let parsed = parse("Tape cat:default");
        assert_eq!(parsed.item.category, CategoryRef::Default);
        assert_eq!(parsed.unknown_category, None);
    }

    #[test]
    fn blank_token_is_none() {
        let reg = CategoryRegistry::builtin();
        let cache = SuggestionCache::new();
        assert!(parse_item("", &reg, &cache).is_none());
        assert!(parse_item("   \t ", &reg, &cache).is_none());
    }

    #[test]
    fn cache_supplies_category_when_absent() {
        let reg = CategoryRegistry::builtin();
        let mut cache = SuggestionCache::new();
        cache.record_usage(&Item::new("Cheddar").with_category(CategoryRef::named("dairy")));

        let parsed = parse_item("cheddar x1", &reg, &cache).unwrap();
        assert_eq!(parsed.item.category, CategoryRef::named("dairy"));

        // an explicit marker wins over the cache
        let parsed = parse_item("cheddar cat:snacks", &reg, &cache).unwrap();
        assert_eq!(parsed.item.category, CategoryRef::named("snacks"));
    }

    #[test]
    fn cache_category_must_still_exist() {
        let reg = CategoryRegistry::builtin().without("dairy");
        let mut cache = SuggestionCache::new();
        cache.record_usage(&Item::new("Cheddar").with_category(CategoryRef::named("dairy")));
        let parsed = parse_item("Cheddar", &reg, &cache).unwrap();
        assert_eq!(parsed.item.category, CategoryRef::Default);
    }

    #[test]
    fn category_keys_resolve() {
        let reg = CategoryRegistry::builtin();
        assert_eq!(category_for_key(" Dairy ", &reg), Some(CategoryRef::named("dairy")));
        assert_eq!(category_for_key("other", &reg), Some(CategoryRef::Default));
        assert_eq!(category_for_key("default", &reg), Some(CategoryRef::Default));
        assert_eq!(category_for_key("bakery", &reg), None);
    }

    #[test]
    fn split_on_all_delimiters() {
        let text = "Milk x2, Eggs;Bread\n\n  Butter cat:dairy ,, ;";
        assert_eq!(
            split_items(text),
            vec!["Milk x2", "Eggs", "Bread", "Butter cat:dairy"]
        );
    }

    #[test]
    fn parse_bulk_gives_fresh_ids() {
        let reg = CategoryRegistry::builtin();
        let cache = SuggestionCache::new();
        let items = parse_bulk("Apples x6 cat:fruit\nSoap", &reg, &cache);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item.name, "Apples");
        assert_eq!(items[1].item.name, "Soap");
        assert_ne!(items[0].item.id, items[1].item.id);
    }
}
