//! Configuration loading and env substitution.
//!
//! Config files: `parley.toml`, `parley.yaml`, `parley.yml` or `parley.json`.
//! Searched in `./` then `~/.config/parley/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, data_dir, discover_and_load, find_or_default_config_path,
        load_config, set_config_dir, set_data_dir,
    },
    schema::{AuthConfig, DatabaseConfig, ParleyConfig, ServerConfig},
};
