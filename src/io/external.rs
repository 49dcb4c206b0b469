use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::model::suggestion::DefaultItem;

/// Failures from outside collaborators. None of these touch saved state.
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("could not read clipboard: {0}")]
    Clipboard(#[source] io::Error),
    #[error("clipboard is empty")]
    EmptyClipboard,
    #[error("could not load default items from {path}: {reason}")]
    Defaults { path: PathBuf, reason: String },
}

/// Source of pasted text
pub trait Clipboard {
    fn read_text(&mut self) -> Result<String, ExternalError>;
}

/// Reads the "clipboard" from standard input, so `pbpaste | bk add --paste`
/// and friends work.
#[derive(Debug, Default)]
pub struct StdinClipboard;

impl Clipboard for StdinClipboard {
    fn read_text(&mut self) -> Result<String, ExternalError> {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(ExternalError::Clipboard)?;
        non_empty(text)
    }
}

/// Fixed text, for tests
#[derive(Debug, Default)]
pub struct StaticClipboard(pub String);

impl Clipboard for StaticClipboard {
    fn read_text(&mut self) -> Result<String, ExternalError> {
        non_empty(self.0.clone())
    }
}

fn non_empty(text: String) -> Result<String, ExternalError> {
    if text.trim().is_empty() {
        Err(ExternalError::EmptyClipboard)
    } else {
        Ok(text)
    }
}

/// Read the default-suggestions file: a JSON array of `{name, category}`.
/// A missing file is not an error. Records that do not fit are skipped.
pub fn load_defaults(path: &Path) -> Result<Vec<DefaultItem>, ExternalError> {
    let fail = |reason: String| ExternalError::Defaults {
        path: path.to_path_buf(),
        reason,
    };
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(fail(e.to_string())),
    };
    let records = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(records)) => records,
        Ok(_) => return Err(fail("expected a JSON array".to_string())),
        Err(e) => return Err(fail(e.to_string())),
    };

    let total = records.len();
    let items: Vec<DefaultItem> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value::<DefaultItem>(record).ok())
        .filter(|item| !item.name.trim().is_empty())
        .collect();
    if items.len() < total {
        tracing::warn!(
            path = %path.display(),
            skipped = total - items.len(),
            "skipped malformed default items"
        );
    }
    Ok(items)
}
