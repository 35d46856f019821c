//! Configuration: types, default paths, XML loading and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    default_config_path, default_log_path, effective_config_path, explicit_config_path,
    path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel};
pub use validate::validate_and_normalize;
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DUPE_SWEEP_CONFIG";
pub const DEFAULT_REPORT_FILE: &str = "duplicates.json";
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_PAUSE_MS: u64 = 100;
