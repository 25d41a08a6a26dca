use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal todo-list manager.
/// Tasks live in ./tasks.json unless --file, TODO_FILE or the config file say otherwise.
#[derive(Parser)]
#[command(name = "todo", version, about = "Terminal todo-list manager")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, short, global = true)]
    pub file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
