pub mod basket;
pub mod category;
pub mod config;
pub mod item;
pub mod list;
pub mod suggestion;
pub mod validation;

pub use basket::*;
pub use category::*;
pub use config::*;
pub use item::*;
pub use list::*;
pub use suggestion::*;
pub use validation::*;
