use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Config file path: `$BASKET_CONFIG`, else `$XDG_CONFIG_HOME/basket/config.toml`
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("BASKET_CONFIG") {
        return PathBuf::from(path);
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("basket").join("config.toml")
}

/// Default data directory, respecting XDG_DATA_HOME
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join("basket")
}

/// Read config from a specific path. A missing file gives the defaults.
pub fn read_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read config from the default location
pub fn read_config() -> Result<AppConfig, ConfigError> {
    read_config_from(&config_path())
}

/// Resolve the storage directory: explicit override, then config, then XDG
pub fn resolve_data_dir(override_dir: Option<&Path>, config: &AppConfig) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    match &config.storage.dir {
        Some(dir) => expand_home(dir),
        None => default_data_dir(),
    }
}

/// Resolve the default-suggestions file against the storage directory
pub fn resolve_defaults_file(data_dir: &Path, config: &AppConfig) -> PathBuf {
    let file = expand_home(&config.suggestions.defaults_file);
    if file.is_absolute() {
        file
    } else {
        data_dir.join(file)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn read_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[suggestions]\nlimit = 3\n\n[ui]\ncolor = false\n").unwrap();
        let config = read_config_from(&path).unwrap();
        assert_eq!(config.suggestions.limit, 3);
        assert!(!config.ui.color);
    }

    #[test]
    fn bad_config_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[suggestions]\nlimit = \"lots\"\n").unwrap();
        assert!(matches!(
            read_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn data_dir_precedence() {
        let mut config = AppConfig::default();
        config.storage.dir = Some("/srv/basket".into());
        assert_eq!(
            resolve_data_dir(Some(Path::new("/tmp/override")), &config),
            PathBuf::from("/tmp/override")
        );
        assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/srv/basket"));
    }

    #[test]
    fn defaults_file_relative_to_data_dir() {
        let mut config = AppConfig::default();
        let dir = Path::new("/data");
        assert_eq!(
            resolve_defaults_file(dir, &config),
            PathBuf::from("/data/defaultItems.json")
        );
        config.suggestions.defaults_file = "/etc/basket/items.json".into();
        assert_eq!(
            resolve_defaults_file(dir, &config),
            PathBuf::from("/etc/basket/items.json")
        );
    }
}
