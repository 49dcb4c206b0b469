use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// A string key-value store. Keys are short identifiers, values are the
/// raw serialized snapshots.
pub trait KvStore {
    /// Raw value under `key`; `Ok(None)` when nothing is stored
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
    /// Keep a copy of an unreadable value next to the real one
    fn backup(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn backup_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.bak", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        atomic_write(&self.path_for(key), value.as_bytes())
    }

    fn backup(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.backup_path(key), value)
    }
}

/// Write via a temp file in the same directory, then rename over the target
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// In-process store for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    backups: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store whose `set` always fails, to exercise non-durable saves
    pub fn failing() -> Self {
        MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn backup_of(&self, key: &str) -> Option<&str> {
        self.backups.get(key).map(String::as_str)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("storage is read-only"));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backup(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.backups.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
