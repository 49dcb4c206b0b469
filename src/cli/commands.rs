use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bk", about = concat!("basket v", env!("CARGO_PKG_VERSION"), " - shopping lists in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Store lists and categories in this directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all lists in tab order
    Lists,
    /// Create a new list
    New(NewArgs),
    /// Delete a list and everything on it
    Drop(DropArgs),
    /// Show a list's items grouped by category
    Show(ShowArgs),
    /// Add items from text: "Milk x2 cat:dairy, Bread; Eggs"
    Add(AddArgs),
    /// Add a single item
    Item(ItemArgs),
    /// Toggle an item between done and not done
    Done(ItemRefArgs),
    /// Change an item's name, quantity or category
    Edit(EditArgs),
    /// Delete an item
    Rm(ItemRefArgs),
    /// Remove all done items from a list
    Clear(ListRefArgs),
    /// Move a list to another tab position
    Mv(MvArgs),
    /// Show all categories
    Categories,
    /// Category management
    Category(CategoryCmd),
    /// Show the most used item names
    Suggest(SuggestArgs),
}

// ---------------------------------------------------------------------------
// List args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NewArgs {
    /// Name of the new list
    pub name: String,
}

#[derive(Args)]
pub struct DropArgs {
    /// List name or ID
    pub list: String,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// List name or ID
    pub list: String,
}

#[derive(Args)]
pub struct ListRefArgs {
    /// List name or ID
    pub list: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// List name or ID
    pub list: String,
    /// New tab position (0-based)
    pub position: usize,
}

// ---------------------------------------------------------------------------
// Item args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// List name or ID
    pub list: String,
    /// Items separated by commas, semicolons or newlines
    #[arg(required_unless_present = "paste", conflicts_with = "paste")]
    pub text: Option<String>,
    /// Read the items from the clipboard (standard input)
    #[arg(long)]
    pub paste: bool,
}

#[derive(Args)]
pub struct ItemArgs {
    /// List name or ID
    pub list: String,
    /// Item name
    pub name: String,
    /// Quantity
    #[arg(long, allow_negative_numbers = true)]
    pub qty: Option<i64>,
    /// Category key
    #[arg(long)]
    pub cat: Option<String>,
    /// Add even if the same item is already on the list
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ItemRefArgs {
    /// List name or ID
    pub list: String,
    /// Item name or ID
    pub item: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// List name or ID
    pub list: String,
    /// Item name or ID
    pub item: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New quantity
    #[arg(long, allow_negative_numbers = true, conflicts_with = "no_qty")]
    pub qty: Option<i64>,
    /// Clear the quantity
    #[arg(long)]
    pub no_qty: bool,
    /// New category key
    #[arg(long, conflicts_with = "no_cat")]
    pub cat: Option<String>,
    /// Move to the default category
    #[arg(long)]
    pub no_cat: bool,
}

// ---------------------------------------------------------------------------
// Category args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Add a category
    Add(CategoryAddArgs),
    /// Remove a category (its items move to the default category)
    Rm(CategoryRmArgs),
    /// Replace all categories from a JSON file
    Set(CategorySetArgs),
}

#[derive(Args)]
pub struct CategoryAddArgs {
    /// Key used in "cat:<key>" (lowercase letters and digits)
    pub key: String,
    /// Display name
    pub name: String,
    /// Color as #rrggbb
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct CategoryRmArgs {
    /// Category key
    pub key: String,
}

#[derive(Args)]
pub struct CategorySetArgs {
    /// JSON file: {"key": {"name", "color"}} or [{"key", "name", "color"}]
    pub file: PathBuf,
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SuggestArgs {
    /// How many to show (default from config)
    #[arg(long)]
    pub limit: Option<usize>,
}
