//! Enumerations for TUI state management.

/// Interaction mode of the task screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Browsing the list, moving the cursor and marking tasks.
    Navigating,
    /// Typing the name of a new task.
    AddingTask,
    /// Changing the name of the task under the cursor.
    EditingTask,
}

impl Mode {
    /// Label shown in the status bar.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Navigating => "NORMAL",
            Mode::AddingTask => "ADD",
            Mode::EditingTask => "EDIT",
        }
    }

    /// Label shown before the input line.
    pub fn prompt(self) -> Option<&'static str> {
        match self {
            Mode::Navigating => None,
            Mode::AddingTask => Some("New task"),
            Mode::EditingTask => Some("Rename"),
        }
    }
}
