//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

/// Options that change how lines are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Drop damage events whose opponent carries a bot identifier.
    ///
    /// Dropped events never reach the rounds, the player table or the
    /// global damage totals.
    pub ignore_bots: bool,
}

impl ResolvedConfig {
    /// Parser options carried by this configuration.
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            ignore_bots: self.ignore_bots,
        }
    }
}
