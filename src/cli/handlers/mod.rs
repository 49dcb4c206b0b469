use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::style::Palette;
use crate::io::config_io;
use crate::io::external::{self, Clipboard, StdinClipboard};
use crate::io::kv::FileStore;
use crate::io::storage::{self, LoadReport};
use crate::model::basket::Basket;
use crate::model::category::{CategoryRef, CategoryRegistry};
use crate::model::config::AppConfig;
use crate::model::item::{Item, ItemPatch};
use crate::model::validation::ValidationError;
use crate::ops::category_ops::{self, CategoryEntry, FALLBACK_COLOR};
use crate::ops::item_ops::{self, AddOutcome, DuplicatePolicy, ItemError};
use crate::ops::list_ops;
use crate::parse::category_for_key;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let mut session = Session::open(cli.data_dir.as_deref())?;

    match cli.command {
        // Read commands
        Commands::Lists => cmd_lists(&session, json),
        Commands::Show(args) => cmd_show(&session, args, json),
        Commands::Categories => cmd_categories(&session, json),
        Commands::Suggest(args) => cmd_suggest(&session, args, json),

        // List commands
        Commands::New(args) => cmd_new(&mut session, args),
        Commands::Drop(args) => cmd_drop(&mut session, args),
        Commands::Mv(args) => cmd_mv(&mut session, args),

        // Item commands
        Commands::Add(args) => cmd_add(&mut session, args, json),
        Commands::Item(args) => cmd_item(&mut session, args),
        Commands::Done(args) => cmd_done(&mut session, args),
        Commands::Edit(args) => cmd_edit(&mut session, args),
        Commands::Rm(args) => cmd_rm(&mut session, args),
        Commands::Clear(args) => cmd_clear(&mut session, args),

        // Category management
        Commands::Category(args) => cmd_category(&mut session, args),
    }
}

// ---------------------------------------------------------------------------
// Session: load, mutate, save
// ---------------------------------------------------------------------------

struct Session {
    basket: Basket,
    store: FileStore,
    config: AppConfig,
    /// Stored keys that could not be read and must not be overwritten
    held: Vec<String>,
}

impl Session {
    fn open(data_dir: Option<&Path>) -> Result<Session, Box<dyn std::error::Error>> {
        let config = config_io::read_config()?;
        let dir = config_io::resolve_data_dir(data_dir, &config);
        let mut store = FileStore::new(&dir);

        let (mut basket, report) = storage::load_basket(&mut store);
        report_load(&report, &store);

        let defaults_path = config_io::resolve_defaults_file(&dir, &config);
        match external::load_defaults(&defaults_path) {
            Ok(defaults) => basket.suggestions.merge(&defaults),
            Err(e) => tracing::warn!(error = %e, "default items not loaded"),
        }

        Ok(Session {
            basket,
            store,
            config,
            held: report.held,
        })
    }

    /// Write the snapshot. A failure leaves the change in effect for this
    /// run only, so it is reported but not fatal.
    fn save(&mut self) {
        if let Err(e) = storage::save_basket(&mut self.store, &self.basket, &self.held) {
            eprintln!("warning: {} (changes were not saved)", e);
        }
        for key in &self.held {
            eprintln!(
                "warning: {} was unreadable and is left as is (changes to it were not saved)",
                self.store.path_for(key).display()
            );
        }
    }

    fn palette(&self) -> Palette<'_> {
        let color = self.config.ui.color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Palette::new(&self.basket.categories, color)
    }

    fn list_id(&self, name_or_id: &str) -> Result<String, list_ops::ListError> {
        list_ops::resolve_list(&self.basket, name_or_id)
    }

    fn item_id(&self, list_id: &str, name_or_id: &str) -> Result<String, ItemError> {
        self.basket
            .list(list_id)
            .ok_or_else(|| ItemError::ListNotFound(list_id.to_string()))
            .and_then(|list| {
                item_ops::resolve_item(list, name_or_id)
                    .ok_or_else(|| ItemError::NotFound(name_or_id.to_string()))
            })
    }

    fn item_name(&self, list_id: &str, item_id: &str) -> String {
        self.basket
            .list(list_id)
            .and_then(|l| l.item(item_id))
            .map(format_item_label)
            .unwrap_or_default()
    }
}

fn report_load(report: &LoadReport, store: &FileStore) {
    if report.categories_reset {
        eprintln!("warning: stored categories were unusable, restored the built-in set");
    }
    for key in &report.backed_up {
        eprintln!(
            "warning: unreadable {} was replaced (backup: {}.bak)",
            key,
            store.path_for(key).display()
        );
    }
    for e in &report.errors {
        eprintln!("warning: {}", e);
    }
}

fn confirm(prompt: &str) -> Result<bool, std::io::Error> {
    eprint!("{} [y/n] ", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn category_arg(key: &str, categories: &CategoryRegistry) -> Result<CategoryRef, ValidationError> {
    category_for_key(key, categories).ok_or_else(|| ValidationError::UnknownCategory(key.trim().to_lowercase()))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_lists(session: &Session, json: bool) -> CmdResult {
    let lists = session.basket.lists_in_order();
    if json {
        let infos: Vec<ListInfoJson> = lists.iter().map(|l| list_info_to_json(l)).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else if lists.is_empty() {
        println!("no lists yet (create one with `bk new <NAME>`)");
    } else {
        for line in format_lists(&lists) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(session: &Session, args: ShowArgs, json: bool) -> CmdResult {
    let id = session.list_id(&args.list)?;
    let Some(list) = session.basket.list(&id) else {
        return Err(list_ops::ListError::NotFound(args.list).into());
    };
    if json {
        let out = list_to_json(list, &session.basket.categories);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let palette = session.palette();
        for line in format_list(list, &palette, &session.basket.categories) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_categories(session: &Session, json: bool) -> CmdResult {
    let categories = &session.basket.categories;
    if json {
        println!("{}", serde_json::to_string_pretty(&categories_to_json(categories))?);
    } else {
        let palette = session.palette();
        for line in format_categories(categories, &palette) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_suggest(session: &Session, args: SuggestArgs, json: bool) -> CmdResult {
    let limit = args.limit.unwrap_or(session.config.suggestions.limit);
    let names = session.basket.suggestions.top_suggestions(limit);
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List commands
// ---------------------------------------------------------------------------

fn cmd_new(session: &mut Session, args: NewArgs) -> CmdResult {
    let id = list_ops::create_list(&mut session.basket, &args.name)?;
    session.save();
    println!("created list: {} ({})", args.name.trim(), id);
    Ok(())
}

fn cmd_drop(session: &mut Session, args: DropArgs) -> CmdResult {
    let id = session.list_id(&args.list)?;
    if !args.yes {
        let (name, count) = session
            .basket
            .list(&id)
            .map(|l| (l.name.clone(), l.items.len()))
            .unwrap_or_default();
        if !confirm(&format!("Delete list \"{}\" and its {} items?", name, count))? {
            println!("cancelled");
            return Ok(());
        }
    }
    let removed = list_ops::delete_list(&mut session.basket, &id)?;
    session.basket.rebuild_suggestions();
    session.save();
    println!("deleted list: {}", removed.name);
    Ok(())
}

fn cmd_mv(session: &mut Session, args: MvArgs) -> CmdResult {
    let id = session.list_id(&args.list)?;
    if list_ops::move_list(&mut session.basket, &id, args.position)? {
        session.save();
    }
    for line in format_lists(&session.basket.lists_in_order()) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Item commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &mut Session, args: AddArgs, json: bool) -> CmdResult {
    let id = session.list_id(&args.list)?;
    let text = match args.text {
        Some(text) if !args.paste => text,
        _ => StdinClipboard.read_text()?,
    };

    let summary = item_ops::add_bulk(&mut session.basket, &id, &text)?;
    if !summary.added.is_empty() {
        session.save();
    }

    for key in &summary.unknown_categories {
        eprintln!("warning: unknown category \"{}\", item filed under the default category", key);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&summary_to_json(&summary))?);
    } else {
        println!("{}", format_summary(&summary));
    }
    Ok(())
}

fn cmd_item(session: &mut Session, args: ItemArgs) -> CmdResult {
    let id = session.list_id(&args.list)?;
    let quantity = args.qty.map(item_ops::parse_quantity).transpose()?;
    let category = match &args.cat {
        Some(key) => category_arg(key, &session.basket.categories)?,
        None => CategoryRef::Default,
    };
    let item = Item::new(args.name.trim())
        .with_quantity(quantity)
        .with_category(category);
    let label = format_item_label(&item);

    let policy = if args.force {
        DuplicatePolicy::Allow
    } else {
        DuplicatePolicy::Reject
    };
    let mut outcome = item_ops::add_item(&mut session.basket, &id, item.clone(), policy)?;
    if outcome == AddOutcome::Duplicate {
        if !confirm(&format!("\"{}\" is already on the list. Add it anyway?", label))? {
            println!("not added");
            return Ok(());
        }
        outcome = item_ops::add_item(&mut session.basket, &id, item, DuplicatePolicy::Allow)?;
    }

    if let AddOutcome::Added(item_id) = outcome {
        session.save();
        println!("added: {} ({})", label, item_id);
    }
    Ok(())
}

fn cmd_done(session: &mut Session, args: ItemRefArgs) -> CmdResult {
    let list_id = session.list_id(&args.list)?;
    let item_id = session.item_id(&list_id, &args.item)?;
    let done = item_ops::toggle_done(&mut session.basket, &list_id, &item_id)?;
    session.save();
    let label = session.item_name(&list_id, &item_id);
    if done {
        println!("done: {}", label);
    } else {
        println!("back on the list: {}", label);
    }
    Ok(())
}

fn cmd_edit(session: &mut Session, args: EditArgs) -> CmdResult {
    let list_id = session.list_id(&args.list)?;
    let item_id = session.item_id(&list_id, &args.item)?;

    let quantity = match (args.qty, args.no_qty) {
        (Some(q), _) => Some(Some(item_ops::parse_quantity(q)?)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let category = match (&args.cat, args.no_cat) {
        (Some(key), _) => Some(category_arg(key, &session.basket.categories)?),
        (None, true) => Some(CategoryRef::Default),
        (None, false) => None,
    };
    let patch = ItemPatch {
        name: args.name,
        quantity,
        category,
    };
    if patch.is_empty() {
        return Err("nothing to change (use --name, --qty/--no-qty or --cat/--no-cat)".into());
    }

    if item_ops::edit_item(&mut session.basket, &list_id, &item_id, patch)? {
        session.save();
        println!("updated: {}", session.item_name(&list_id, &item_id));
    } else {
        println!("no changes");
    }
    Ok(())
}

fn cmd_rm(session: &mut Session, args: ItemRefArgs) -> CmdResult {
    let list_id = session.list_id(&args.list)?;
    let item_id = session.item_id(&list_id, &args.item)?;
    let removed = item_ops::remove_item(&mut session.basket, &list_id, &item_id)?;
    session.save();
    println!("removed: {}", format_item_label(&removed));
    Ok(())
}

fn cmd_clear(session: &mut Session, args: ListRefArgs) -> CmdResult {
    let list_id = session.list_id(&args.list)?;
    let cleared = item_ops::clear_completed(&mut session.basket, &list_id)?;
    if cleared == 0 {
        println!("no completed items to clear");
        return Ok(());
    }
    session.save();
    println!("cleared {} completed item{}", cleared, if cleared == 1 { "" } else { "s" });
    Ok(())
}

// ---------------------------------------------------------------------------
// Category management
// ---------------------------------------------------------------------------

fn cmd_category(session: &mut Session, args: CategoryCmd) -> CmdResult {
    match args.action {
        CategoryAction::Add(a) => cmd_category_add(session, a),
        CategoryAction::Rm(a) => cmd_category_rm(session, a),
        CategoryAction::Set(a) => cmd_category_set(session, a),
    }
}

fn cmd_category_add(session: &mut Session, args: CategoryAddArgs) -> CmdResult {
    let key = category_ops::add_category(
        &mut session.basket,
        &args.key,
        &args.name,
        args.color.as_deref(),
    )?;
    session.save();
    println!("added category: {} ({})", args.name.trim(), key);
    Ok(())
}

fn cmd_category_rm(session: &mut Session, args: CategoryRmArgs) -> CmdResult {
    let key = args.key.trim().to_lowercase();
    if !session.basket.categories.contains(&key) {
        return Err(ValidationError::UnknownCategory(key).into());
    }
    let reassigned = category_ops::remove_category(&mut session.basket, &key)?;
    session.save();
    println!("removed category: {}", key);
    if reassigned > 0 {
        println!("  {} items moved to the default category", reassigned);
    }
    Ok(())
}

#[derive(Deserialize)]
struct CategoryFields {
    name: String,
    color: Option<String>,
}

/// Either the stored shape or a list of rows
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryFile {
    Map(IndexMap<String, CategoryFields>),
    Rows(Vec<CategoryEntry>),
}

fn read_category_file(path: &Path) -> Result<Vec<CategoryEntry>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    let parsed: CategoryFile =
        serde_json::from_str(&text).map_err(|e| format!("could not parse {}: {}", path.display(), e))?;
    Ok(match parsed {
        CategoryFile::Map(map) => map
            .into_iter()
            .map(|(key, fields)| CategoryEntry {
                key,
                name: fields.name,
                color: fields.color.unwrap_or_else(|| FALLBACK_COLOR.to_string()),
            })
            .collect(),
        CategoryFile::Rows(rows) => rows,
    })
}

fn cmd_category_set(session: &mut Session, args: CategorySetArgs) -> CmdResult {
    let entries = read_category_file(&args.file)?;
    let registry = category_ops::registry_from_entries(entries)?;
    let reassigned = category_ops::replace_categories(&mut session.basket, registry)?;
    session.save();
    println!("categories replaced ({} total)", session.basket.categories.len());
    if reassigned > 0 {
        println!("  {} items moved to the default category", reassigned);
    }
    Ok(())
}
