use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::UnionKeys;

/// CLI arguments for the shapeck binary.
#[derive(Parser, Debug)]
#[command(
    name = "shapeck",
    version,
    about = "Declare structural shapes and check keys and values against them"
)]
pub struct CliArgs {
    /// Declaration file (JSON) to load.
    pub file: PathBuf,

    /// Which keys of a union are accessible. Overrides `options.unionKeys`.
    #[arg(long = "union-keys", alias = "unionKeys", value_enum, ignore_case = true)]
    pub union_keys: Option<UnionKeys>,

    /// Output format.
    #[arg(long, value_enum, ignore_case = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Force colored output.
    #[arg(long, overrides_with = "no_color")]
    pub color: bool,

    /// Disable colored output.
    #[arg(long = "no-color", overrides_with = "color")]
    pub no_color: bool,

    /// Print the keys of a declared shape. May be repeated.
    #[arg(long = "keys", value_name = "NAME")]
    pub keys: Vec<String>,
}

impl CliArgs {
    /// Color unless disabled; without a flag, only when stdout is a terminal.
    pub fn use_color(&self, is_terminal: bool) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            is_terminal
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
