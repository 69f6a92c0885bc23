use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::ParleyConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["parley.toml", "parley.yaml", "parley.yml", "parley.json"];

static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);
static DATA_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Use `dir` instead of `~/.config/parley/` for the rest of the process.
pub fn set_config_dir(dir: PathBuf) {
    if let Ok(mut slot) = CONFIG_DIR_OVERRIDE.write() {
        *slot = Some(dir);
    }
}

/// Use `dir` instead of the platform data dir for the rest of the process.
pub fn set_data_dir(dir: PathBuf) {
    if let Ok(mut slot) = DATA_DIR_OVERRIDE.write() {
        *slot = Some(dir);
    }
}

fn read_override(slot: &RwLock<Option<PathBuf>>) -> Option<PathBuf> {
    slot.read().ok().and_then(|guard| guard.clone())
}

/// Returns the user-global config directory (`~/.config/parley/`), or the override.
pub fn config_dir() -> Option<PathBuf> {
    read_override(&CONFIG_DIR_OVERRIDE).or_else(|| {
        directories::ProjectDirs::from("", "", "parley").map(|d| d.config_dir().to_path_buf())
    })
}

/// Returns the data directory holding `parley.db`, or the override.
pub fn data_dir() -> PathBuf {
    read_override(&DATA_DIR_OVERRIDE)
        .or_else(|| {
            directories::ProjectDirs::from("", "", "parley").map(|d| d.data_dir().to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from(".parley"))
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<ParleyConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./parley.{toml,yaml,yml,json}` (project-local)
/// 2. `<config dir>/parley.{toml,yaml,yml,json}` (user-global)
///
/// Returns `ParleyConfig::default()` if no config file is found or it fails
/// to parse. Environment overrides are applied in both cases.
pub fn discover_and_load() -> ParleyConfig {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                ParleyConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            ParleyConfig::default()
        },
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

/// Apply `PARLEY_BIND`, `PARLEY_PORT` and `PARLEY_DB_PATH` on top of a loaded config.
///
/// Unparseable values are ignored with a warning.
pub fn apply_env_overrides(config: &mut ParleyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(bind) = lookup("PARLEY_BIND") {
        config.server.bind = bind;
    }
    if let Some(port) = lookup("PARLEY_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!(value = %port, error = %e, "ignoring invalid PARLEY_PORT"),
        }
    }
    if let Some(path) = lookup("PARLEY_DB_PATH") {
        config.database.path = Some(PathBuf::from(path));
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    find_config_file().unwrap_or_else(|| {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley.toml")
    })
}

fn parse_config(raw: &str, path: &Path) -> Result<ParleyConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::wrap("invalid TOML config", e)),
        "yaml" | "yml" => {
            serde_yaml::from_str(raw).map_err(|e| Error::wrap("invalid YAML config", e))
        },
        "json" => serde_json::from_str(raw).map_err(|e| Error::wrap("invalid JSON config", e)),
        _ => Err(Error::message(format!("unsupported config format: .{ext}"))),
    }
}
