//! Configuration file loading for chatline
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `CHATLINE_<SECTION>__<KEY>` (e.g. `CHATLINE_BACKEND__BASE_URL`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatline.toml` or `./.chatline.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/chatline/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBackendConfig, FileChatConfig, FileConfig, FileLoggingConfig,
};
pub use loader::ConfigLoader;
