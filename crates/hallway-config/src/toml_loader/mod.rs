//! Locating, reading and first-run creation of `config.toml`.

mod loader;
mod paths;
mod template;


pub use loader::{load_default, load_from_path, parse};
pub use paths::{create_default_config, default_config_path, CONFIG_ENV};
