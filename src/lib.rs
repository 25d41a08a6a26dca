//! # todo - Terminal Todo List
//!
//! A small todo-list manager for the terminal. One ordered list of named
//! tasks, each either open or done, saved to a local JSON file.
//!
//! ## Interfaces
//!
//! - **Full-screen UI** (`todo` or `todo ui`): move with `j`/`k`, mark tasks
//!   with space, add with `o`, rename with `e`, delete with `d`, finish with
//!   `x`, quit with `q`. The list is saved on quit.
//! - **Numbered menu** (`todo menu`): the classic line-based loop of
//!   list/add/edit/delete/exit. Every change is saved immediately.
//! - **One-shot commands** for scripts: `todo list`, `todo add "Drink tea"`,
//!   `todo done 2`, `todo edit 2 "Wash cups"`, `todo delete 2`, `todo backup`.
//!
//! ## Quick Start
//!
//! ```bash
//! todo add Meditate
//! todo add Wash dishes
//! todo list
//! todo
//! ```
//!
//! Tasks are stored in `./tasks.json` by default. Use `--file`, the
//! `TODO_FILE` environment variable or `~/.todo/config.toml` to point
//! somewhere else.

pub mod banner;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod menu;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

pub use error::StoreError;
pub use store::{TaskStore, Toggle};
pub use task::Task;
