use std::fs::{self, File};

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use todo_list::cli::Cli;
use todo_list::cmd::*;
use todo_list::config::{self, CliOverrides, ResolvedConfig};
use todo_list::menu::MenuOptions;
use todo_list::store::TaskStore;

/// Log to a file; the terminal belongs to the UI.
fn init_logging(config: &ResolvedConfig) {
    let Some(path) = config.log_file.as_ref() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::options().create(true).append(true).open(path) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

fn main() {
    let cli = Cli::parse();

    let file_config = config::load_config().unwrap_or_else(|e| fatal("Failed to load config", e));
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            tasks_file: cli.file.clone(),
            verbose: cli.verbose,
        },
    );
    init_logging(&resolved);
    log::info!("todo starting with task file {}", resolved.tasks_file.display());

    let load_store = || {
        TaskStore::load(&resolved.tasks_file, resolved.seed_defaults)
            .unwrap_or_else(|e| fatal("Failed to load tasks", e))
    };

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(&mut load_store(), resolved.autosave),
        Commands::Menu => cmd_menu(
            &mut load_store(),
            MenuOptions {
                clear_screen: resolved.clear_screen,
                confirm_delete: resolved.confirm_delete,
            },
        ),
        Commands::List { pending, done } => {
            cmd_list(&load_store(), ListFilter::from_flags(pending, done))
        }
        Commands::Add { name } => cmd_add(&mut load_store(), name),
        Commands::Done { number } => cmd_done(&mut load_store(), number),
        Commands::Edit { number, name } => cmd_edit(&mut load_store(), number, name),
        Commands::Delete { number } => cmd_delete(&mut load_store(), number),
        // These never touch the task list.
        Commands::Backup => cmd_backup(&resolved.tasks_file),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
