//! Task data structure.
//!
//! A task is deliberately small: a display name and a completion flag. Field
//! names on disk follow the `tasks.json` format written by earlier releases
//! (`name`, `isDone`).

use serde::{Deserialize, Serialize};

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
}

impl Task {
    /// Create an open task with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            is_done: false,
        }
    }

    /// Checkbox marker used by both the menu and the one-shot `list` command.
    pub fn checkbox(&self) -> &'static str {
        if self.is_done {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

/// Normalise a user-supplied task name. Returns `None` when nothing is left
/// after trimming.
pub fn normalise_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
