pub mod item_parser;

pub use item_parser::{ParsedItem, category_for_key, parse_bulk, parse_item, split_items};
