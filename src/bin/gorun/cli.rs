//! CLI definitions using clap.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

const EXAMPLES: &str = "\
Examples:
  gorun golang.org/x/tools/cmd/stringer@v0.11.0 -type=MyType
  gorun --tags netgo,sqlite3 example.com/cmd/tool@latest --help";

/// gorun - build and run a Go program at a pinned version
#[derive(Parser)]
#[command(name = "gorun")]
#[command(version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Comma-separated Go build tags
    #[arg(long, value_name = "TAGS", default_value = "")]
    pub tags: String,

    /// gorun home directory (cache and config.toml)
    #[arg(long, value_name = "DIR", env = "GORUN_HOME")]
    pub home: Option<PathBuf>,

    /// Package to run, then the arguments passed to it verbatim
    #[arg(
        value_name = "PACKAGE@VERSION [ARGS]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}
