//! Command implementations for the CLI interface.
//!
//! Each `cmd_*` function runs one subcommand against an already loaded
//! [`TaskStore`]. Failures are fatal here: the error is logged, printed to
//! stderr and the process exits with status 1.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::{error, info};

use crate::banner::COMPLETION_BANNER;
use crate::error::StoreError;
use crate::menu::{Menu, MenuOptions};
use crate::store::{TaskStore, Toggle};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the full-screen interface (default).
    Ui,

    /// Launch the numbered line menu.
    Menu,

    /// Print the task list.
    List {
        /// Only show open tasks.
        #[arg(long, conflicts_with = "done")]
        pending: bool,
        /// Only show finished tasks.
        #[arg(long)]
        done: bool,
    },

    /// Add a new task.
    Add {
        /// Task name. Several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Toggle whether a task is done.
    Done {
        /// Task number as shown by `list`.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
    },

    /// Rename a task.
    Edit {
        /// Task number as shown by `list`.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
        /// New name. Several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Delete a task.
    Delete {
        /// Task number as shown by `list`.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
    },

    /// Copy the task file into a timestamped backup.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which tasks `list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Pending,
    Done,
}

impl ListFilter {
    pub fn from_flags(pending: bool, done: bool) -> Self {
        match (pending, done) {
            (true, _) => ListFilter::Pending,
            (false, true) => ListFilter::Done,
            (false, false) => ListFilter::All,
        }
    }
}

/// Log and print a fatal error, then exit.
pub fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    error!("{context}: {err}");
    eprintln!("{context}: {err}");
    std::process::exit(1);
}

/// Convert a 1-based task number into an index.
fn to_index(number: u64) -> usize {
    usize::try_from(number.saturating_sub(1)).unwrap_or(usize::MAX)
}

/// Launch the terminal user interface.
pub fn cmd_ui(store: &mut TaskStore, autosave: bool) {
    if let Err(e) = run_tui(store, autosave) {
        fatal("UI error", e);
    }
}

/// Run the numbered menu on stdin/stdout.
pub fn cmd_menu(store: &mut TaskStore, options: MenuOptions) {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(store, stdin.lock(), stdout.lock(), options);
    if let Err(e) = menu.run() {
        fatal("Menu error", e);
    }
}

/// Format the task list as `N. [x] name` lines, with a `*` on selected tasks.
pub fn format_task_list(store: &TaskStore, filter: ListFilter) -> Vec<String> {
    store
        .tasks()
        .iter()
        .enumerate()
        .filter(|(_, t)| match filter {
            ListFilter::All => true,
            ListFilter::Pending => !t.is_done,
            ListFilter::Done => t.is_done,
        })
        .map(|(i, t)| {
            let mark = if store.is_selected(i) { " *" } else { "" };
            format!("{}. {} {}{}", i + 1, t.checkbox(), t.name, mark)
        })
        .collect()
}

/// Print tasks.
pub fn cmd_list(store: &TaskStore, filter: ListFilter) {
    if store.is_empty() {
        println!("Todo list is empty!");
        return;
    }
    let lines = format_task_list(store, filter);
    if lines.is_empty() {
        println!("No matching tasks.");
    }
    for line in lines {
        println!("{line}");
    }
    println!("{}/{} done", store.done_count(), store.len());
}

/// Add a task and save. Returns the message to print.
pub fn add_task(store: &mut TaskStore, name: &[String]) -> Result<String, StoreError> {
    let index = store.add(&name.join(" "))?;
    store.save()?;
    info!("Added task {}", index + 1);
    Ok(format!("Added task {}: {}", index + 1, store.tasks()[index].name))
}

/// Toggle a task's done flag and save. The message carries the completion
/// banner when the toggle finished the list.
pub fn mark_task(store: &mut TaskStore, number: u64) -> Result<String, StoreError> {
    let index = to_index(number);
    let outcome = store.toggle_done(index)?;
    store.save()?;
    let name = &store.tasks()[index].name;
    Ok(match outcome {
        Toggle::Reopened => format!("Marked task {number} as incomplete: {name}"),
        Toggle::Completed => format!("Marked task {number} as complete: {name}"),
        Toggle::AllDone => {
            format!("Marked task {number} as complete: {name}\n{COMPLETION_BANNER}")
        }
    })
}

/// Rename a task and save.
pub fn rename_task(
    store: &mut TaskStore,
    number: u64,
    name: &[String],
) -> Result<String, StoreError> {
    let index = to_index(number);
    store.rename(index, &name.join(" "))?;
    store.save()?;
    Ok(format!("Renamed task {}: {}", number, store.tasks()[index].name))
}

/// Delete a task and save.
pub fn delete_task(store: &mut TaskStore, number: u64) -> Result<String, StoreError> {
    let task = store.remove(to_index(number))?;
    store.save()?;
    Ok(format!("Deleted task {}: {}", number, task.name))
}

pub fn cmd_add(store: &mut TaskStore, name: Vec<String>) {
    match add_task(store, &name) {
        Ok(msg) => println!("{msg}"),
        Err(e) => fatal("Failed to add task", e),
    }
}

pub fn cmd_done(store: &mut TaskStore, number: u64) {
    match mark_task(store, number) {
        Ok(msg) => println!("{msg}"),
        Err(e) => fatal("Failed to update task", e),
    }
}

pub fn cmd_edit(store: &mut TaskStore, number: u64, name: Vec<String>) {
    match rename_task(store, number, &name) {
        Ok(msg) => println!("{msg}"),
        Err(e) => fatal("Failed to rename task", e),
    }
}

pub fn cmd_delete(store: &mut TaskStore, number: u64) {
    match delete_task(store, number) {
        Ok(msg) => println!("{msg}"),
        Err(e) => fatal("Failed to delete task", e),
    }
}

/// Copy the task file to `backup/<timestamp>_<file name>` beside it.
pub fn create_backup(task_file: &Path) -> Result<PathBuf, StoreError> {
    if !task_file.exists() {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", task_file.display()),
        )));
    }

    let parent_dir = match task_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = task_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("tasks.json");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));

    fs::copy(task_file, &backup_path)?;
    info!("Backed up {} to {}", task_file.display(), backup_path.display());
    Ok(backup_path)
}

/// Create a backup of the task file.
pub fn cmd_backup(task_file: &Path) {
    match create_backup(task_file) {
        Ok(path) => println!("Backup created: {}", path.display()),
        Err(e) => fatal("Failed to create backup", e),
    }
}

/// Generate shell completions on stdout.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    let mut stdout = io::stdout();
    generate(shell, &mut app, app_name, &mut stdout);
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use std::collections::BTreeSet;

    fn sample_store(path: PathBuf) -> TaskStore {
        TaskStore::from_parts(
            path,
            vec![
                Task { name: "Meditate".into(), is_done: true },
                Task::new("Wash dishes"),
                Task::new("Drink tea"),
            ],
            [2].into_iter().collect::<BTreeSet<_>>(),
        )
    }

    #[test]
    fn test_format_task_list() {
        let store = sample_store("tasks.json".into());
        assert_eq!(
            format_task_list(&store, ListFilter::All),
            vec!["1. [x] Meditate", "2. [ ] Wash dishes", "3. [ ] Drink tea *"]
        );
        assert_eq!(format_task_list(&store, ListFilter::Done), vec!["1. [x] Meditate"]);
        assert_eq!(format_task_list(&store, ListFilter::Pending).len(), 2);
    }

    #[test]
    fn test_list_filter_flags() {
        assert_eq!(ListFilter::from_flags(false, false), ListFilter::All);
        assert_eq!(ListFilter::from_flags(true, false), ListFilter::Pending);
        assert_eq!(ListFilter::from_flags(false, true), ListFilter::Done);
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_add_edit_delete_save_each_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut store = sample_store(path.clone());

        let msg = add_task(&mut store, &words("Go for a walk")).unwrap();
        assert_eq!(msg, "Added task 4: Go for a walk");
        assert_eq!(TaskStore::load(&path, false).unwrap().len(), 4);

        let msg = rename_task(&mut store, 2, &words("Dry dishes")).unwrap();
        assert_eq!(msg, "Renamed task 2: Dry dishes");
        assert_eq!(TaskStore::load(&path, false).unwrap().tasks()[1].name, "Dry dishes");

        let msg = delete_task(&mut store, 1).unwrap();
        assert_eq!(msg, "Deleted task 1: Meditate");
        let reloaded = TaskStore::load(&path, false).unwrap();
        assert_eq!(reloaded.len(), 3);
        // "Drink tea" keeps its mark after shifting down.
        assert!(reloaded.is_selected(1));

        assert!(matches!(delete_task(&mut store, 9), Err(StoreError::OutOfRange { .. })));
        assert!(matches!(add_task(&mut store, &[]), Err(StoreError::EmptyName)));
    }

    #[test]
    fn test_mark_task_prints_banner_when_all_done() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = sample_store(dir.path().join("tasks.json"));

        let msg = mark_task(&mut store, 2).unwrap();
        assert_eq!(msg, "Marked task 2 as complete: Wash dishes");

        let msg = mark_task(&mut store, 3).unwrap();
        assert!(msg.starts_with("Marked task 3 as complete: Drink tea\n"));
        assert!(msg.contains("Yayy you've finished"));

        let msg = mark_task(&mut store, 1).unwrap();
        assert_eq!(msg, "Marked task 1 as incomplete: Meditate");
        assert!(!msg.contains("Yayy"));
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1), 0);
        assert_eq!(to_index(3), 2);
    }

    #[test]
    fn test_create_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let store = sample_store(path.clone());
        store.save().unwrap();

        let backup = create_backup(&path).unwrap();
        assert!(backup.starts_with(dir.path().join("backup")));
        assert!(backup.to_string_lossy().ends_with("_tasks.json"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_backup_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_backup(&dir.path().join("tasks.json")).is_err());
    }
}
