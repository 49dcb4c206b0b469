pub mod category_ops;
pub mod duplicate;
pub mod item_ops;
pub mod list_ops;
