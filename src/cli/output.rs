use serde::Serialize;

use crate::cli::style::Palette;
use crate::model::category::{CategoryRef, CategoryRegistry};
use crate::model::item::Item;
use crate::model::list::ShoppingList;
use crate::ops::item_ops::BulkSummary;
use crate::util::unicode::{display_width, pad_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListInfoJson {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub active: usize,
    pub done: usize,
}

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub name: String,
    pub quantity: Option<u32>,
    pub category: Option<String>,
    pub done: bool,
}

#[derive(Serialize)]
pub struct GroupJson {
    pub category: String,
    pub name: String,
    pub color: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub groups: Vec<GroupJson>,
    pub completed: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub key: String,
    pub name: String,
    pub color: String,
}

#[derive(Serialize)]
pub struct BulkSummaryJson {
    pub added: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_categories: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn item_to_json(item: &Item) -> ItemJson {
    ItemJson {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity: item.quantity.map(|q| q.get()),
        category: item.category.clone().into(),
        done: item.done,
    }
}

pub fn list_info_to_json(list: &ShoppingList) -> ListInfoJson {
    let (active, done) = list.counts();
    ListInfoJson {
        id: list.id.clone(),
        name: list.name.clone(),
        order: list.order,
        active,
        done,
    }
}

pub fn list_to_json(list: &ShoppingList, categories: &CategoryRegistry) -> ListJson {
    let groups = group_active(list, categories)
        .into_iter()
        .map(|(category, items)| {
            let (name, color) = categories
                .config_for(&category)
                .map(|c| (c.name.clone(), c.color.clone()))
                .unwrap_or_default();
            GroupJson {
                category: category.key().to_string(),
                name,
                color,
                items: items.into_iter().map(item_to_json).collect(),
            }
        })
        .collect();
    ListJson {
        id: list.id.clone(),
        name: list.name.clone(),
        order: list.order,
        groups,
        completed: list.done_items().map(item_to_json).collect(),
    }
}

pub fn categories_to_json(categories: &CategoryRegistry) -> Vec<CategoryJson> {
    categories
        .display_order()
        .into_iter()
        .filter_map(|key| {
            categories.get(key).map(|c| CategoryJson {
                key: key.to_string(),
                name: c.name.clone(),
                color: c.color.clone(),
            })
        })
        .collect()
}

pub fn summary_to_json(summary: &BulkSummary) -> BulkSummaryJson {
    BulkSummaryJson {
        added: summary.added.len(),
        skipped: summary.skipped,
        unknown_categories: summary.unknown_categories.clone(),
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Active items grouped by category, in registry display order. Items whose
/// category is gone land in the default group. Empty groups are left out.
pub fn group_active<'a>(
    list: &'a ShoppingList,
    categories: &CategoryRegistry,
) -> Vec<(CategoryRef, Vec<&'a Item>)> {
    let mut groups = Vec::new();
    for key in categories.display_order() {
        let category = CategoryRef::named(key);
        let items: Vec<&Item> = list
            .active_items()
            .filter(|item| {
                if categories.resolves(&item.category) {
                    item.category == category
                } else {
                    category.is_default()
                }
            })
            .collect();
        if !items.is_empty() {
            groups.push((category, items));
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Item as `Milk x2`
pub fn format_item_label(item: &Item) -> String {
    match item.quantity {
        Some(q) => format!("{} x{}", item.name, q),
        None => item.name.clone(),
    }
}

/// Format a single item as a checkbox line
pub fn format_item_line(item: &Item) -> String {
    let mark = if item.done { 'x' } else { ' ' };
    format!("[{}] {}", mark, format_item_label(item))
}

/// Format a list grouped by category, then its completed items
pub fn format_list(list: &ShoppingList, palette: &Palette<'_>, categories: &CategoryRegistry) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", list.name)];

    let groups = group_active(list, categories);
    if groups.is_empty() {
        lines.push(String::new());
        lines.push("  (nothing to buy)".to_string());
    }
    for (category, items) in &groups {
        lines.push(String::new());
        lines.push(palette.paint(category, &palette.name(category)));
        for item in items {
            lines.push(format!("  {}", format_item_line(item)));
        }
    }

    let done: Vec<&Item> = list.done_items().collect();
    if !done.is_empty() {
        lines.push(String::new());
        lines.push(format!("-- Completed ({}) --", done.len()));
        for item in done {
            lines.push(format!("  {}", palette.dim(&format_item_line(item))));
        }
    }
    lines
}

/// Format the list overview, names padded to a common width
pub fn format_lists(lists: &[&ShoppingList]) -> Vec<String> {
    let width = lists
        .iter()
        .map(|l| display_width(&l.name))
        .max()
        .unwrap_or(0);
    lists
        .iter()
        .enumerate()
        .map(|(position, list)| {
            let (active, done) = list.counts();
            format!(
                "  {}. {}  {} to buy, {} done",
                position,
                pad_to_width(&list.name, width),
                active,
                done
            )
        })
        .collect()
}

/// Format the category table, default last
pub fn format_categories(categories: &CategoryRegistry, palette: &Palette<'_>) -> Vec<String> {
    let keys = categories.display_order();
    let width = keys.iter().map(|k| display_width(k)).max().unwrap_or(0);
    keys.into_iter()
        .filter_map(|key| {
            let config = categories.get(key)?;
            let category = CategoryRef::named(key);
            Some(format!(
                "  {}  {}  {}",
                pad_to_width(key, width),
                palette.paint(&category, &config.name),
                config.color
            ))
        })
        .collect()
}

/// One-line result of a bulk add
pub fn format_summary(summary: &BulkSummary) -> String {
    let mut line = format!("added {}", summary.added.len());
    if summary.skipped > 0 {
        line.push_str(&format!(", skipped {} already on the list", summary.skipped));
    }
    line
}
