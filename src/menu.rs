//! Numbered line menu.
//!
//! The menu reads whole lines from any `BufRead` and writes to any `Write`,
//! so the same loop drives the real terminal and the tests. Every mutation is
//! saved before the menu is shown again.

use std::io::{BufRead, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use log::debug;

use crate::banner::COMPLETION_BANNER;
use crate::error::StoreError;
use crate::store::{TaskStore, Toggle};

/// Entries of the main menu, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    List,
    Add,
    Edit,
    Delete,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 5] = [
        MenuChoice::List,
        MenuChoice::Add,
        MenuChoice::Edit,
        MenuChoice::Delete,
        MenuChoice::Exit,
    ];

    /// Parse the number typed at the menu prompt.
    pub fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
    }

    fn label(self) -> &'static str {
        match self {
            MenuChoice::List => "List out all tasks",
            MenuChoice::Add => "Add new task",
            MenuChoice::Edit => "Edit a task",
            MenuChoice::Delete => "Delete a task",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Behaviour switches taken from the resolved config.
#[derive(Debug, Clone, Copy)]
pub struct MenuOptions {
    pub clear_screen: bool,
    pub confirm_delete: bool,
}

impl Default for MenuOptions {
    fn default() -> Self {
        MenuOptions {
            clear_screen: true,
            confirm_delete: true,
        }
    }
}

/// The blocking read-eval menu loop.
pub struct Menu<'a, R, W> {
    store: &'a mut TaskStore,
    input: R,
    output: W,
    options: MenuOptions,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a mut TaskStore, input: R, output: W, options: MenuOptions) -> Self {
        Menu {
            store,
            input,
            output,
            options,
        }
    }

    /// Run until the user picks Exit or the input ends.
    pub fn run(&mut self) -> Result<(), StoreError> {
        writeln!(self.output, "Welcome to Terminal Todo List!")?;
        while let Some(choice) = self.prompt_choice()? {
            debug!("Menu choice: {:?}", choice);
            match choice {
                MenuChoice::List => self.list_and_toggle()?,
                MenuChoice::Add => self.add_task()?,
                MenuChoice::Edit => self.edit_task()?,
                MenuChoice::Delete => self.delete_task()?,
                MenuChoice::Exit => {
                    writeln!(self.output, "Bye byeee!")?;
                    break;
                }
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Read one line. `None` at end of input. Bytes that are not UTF-8 are
    /// replaced so the caller rejects the line like any other bad answer.
    fn read_line(&mut self) -> Result<Option<String>, StoreError> {
        self.output.flush()?;
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.options.clear_screen {
            queue!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    /// Show the menu until a valid option is entered.
    fn prompt_choice(&mut self) -> Result<Option<MenuChoice>, StoreError> {
        loop {
            for (i, choice) in MenuChoice::ALL.iter().enumerate() {
                writeln!(self.output, "({}) {}", i + 1, choice.label())?;
            }
            write!(self.output, "What do you want to do: ")?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            self.clear()?;
            match MenuChoice::parse(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(
                    self.output,
                    "You must enter option from 1-{}!",
                    MenuChoice::ALL.len()
                )?,
            }
        }
    }

    /// Ask for a 1-based task number, 0 to go back. Returns the 0-based index.
    fn prompt_task(&mut self, prompt: &str) -> Result<Option<usize>, StoreError> {
        let len = self.store.len();
        loop {
            write!(self.output, "{} (1-{}) or 0 to quit: ", prompt, len)?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.trim().parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= len => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "You must enter a number from 0-{}!", len)?,
            }
        }
    }

    fn print_tasks(&mut self) -> Result<(), StoreError> {
        writeln!(self.output, "Todo List")?;
        for (i, task) in self.store.tasks().iter().enumerate() {
            writeln!(self.output, "{}. {} {}", i + 1, task.checkbox(), task.name)?;
        }
        Ok(())
    }

    /// Returns false (after telling the user) when there is nothing to pick from.
    fn require_tasks(&mut self) -> Result<bool, StoreError> {
        if self.store.is_empty() {
            writeln!(self.output, "Todo list is empty!")?;
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(true)
    }

    fn list_and_toggle(&mut self) -> Result<(), StoreError> {
        if !self.require_tasks()? {
            return Ok(());
        }
        self.print_tasks()?;
        let Some(index) = self.prompt_task("Choose a task to perform action")? else {
            self.clear()?;
            return Ok(());
        };

        let outcome = self.store.toggle_done(index)?;
        self.clear()?;
        match outcome {
            Toggle::Reopened => writeln!(self.output, "Mark task as incomplete")?,
            Toggle::Completed => writeln!(self.output, "Mark task as complete")?,
            Toggle::AllDone => {
                writeln!(self.output, "Mark task as complete")?;
                writeln!(self.output, "{}", COMPLETION_BANNER)?;
            }
        }
        writeln!(self.output)?;
        self.store.save()
    }

    fn add_task(&mut self) -> Result<(), StoreError> {
        write!(self.output, "Enter task name: ")?;
        let Some(name) = self.read_line()? else {
            return Ok(());
        };
        let result = self.store.add(&name);
        self.clear()?;
        match result {
            Ok(_) => {
                writeln!(self.output, "Added task successfully!")?;
                writeln!(self.output)?;
                self.store.save()
            }
            Err(StoreError::EmptyName) => {
                writeln!(self.output, "Task name cannot be empty!")?;
                writeln!(self.output)?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn edit_task(&mut self) -> Result<(), StoreError> {
        if !self.require_tasks()? {
            return Ok(());
        }
        self.print_tasks()?;
        let Some(index) = self.prompt_task("Choose a task to update")? else {
            self.clear()?;
            return Ok(());
        };

        write!(self.output, "Enter new name: ")?;
        let Some(name) = self.read_line()? else {
            return Ok(());
        };
        let result = self.store.rename(index, &name);
        self.clear()?;
        match result {
            Ok(()) => {
                writeln!(self.output, "Change the name successfully!")?;
                self.store.save()
            }
            Err(StoreError::EmptyName) => {
                writeln!(self.output, "Task name cannot be empty!")?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn delete_task(&mut self) -> Result<(), StoreError> {
        if !self.require_tasks()? {
            return Ok(());
        }
        self.print_tasks()?;
        let Some(index) = self.prompt_task("Choose a task to delete")? else {
            self.clear()?;
            return Ok(());
        };

        if self.options.confirm_delete {
            write!(self.output, "Are you sure? (y/n): ")?;
            let answer = self.read_line()?.unwrap_or_default();
            if !answer.trim().to_lowercase().starts_with('y') {
                self.clear()?;
                return Ok(());
            }
        }

        self.store.remove(index)?;
        self.clear()?;
        writeln!(self.output, "Delete the task successfully!")?;
        self.store.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use std::collections::BTreeSet;
    use tempfile::{tempdir, TempDir};

    const QUIET: MenuOptions = MenuOptions {
        clear_screen: false,
        confirm_delete: true,
    };

    fn store_in(dir: &TempDir, tasks: &[(&str, bool)]) -> TaskStore {
        let tasks = tasks
            .iter()
            .map(|(name, done)| Task { name: name.to_string(), is_done: *done })
            .collect();
        TaskStore::from_parts(dir.path().join("tasks.json"), tasks, BTreeSet::new())
    }

    fn run_menu(store: &mut TaskStore, script: &str) -> String {
        let mut out = Vec::new();
        Menu::new(store, script.as_bytes(), &mut out, QUIET).run().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::List));
        assert_eq!(MenuChoice::parse(" 5\n"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("0"), None);
        assert_eq!(MenuChoice::parse("6"), None);
        assert_eq!(MenuChoice::parse("list"), None);
    }

    #[test]
    fn test_invalid_choice_reprompts() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[]);
        let out = run_menu(&mut store, "9\nabc\n5\n");
        assert_eq!(out.matches("You must enter option from 1-5!").count(), 2);
        assert!(out.ends_with("Bye byeee!\n"));
    }

    #[test]
    fn test_invalid_utf8_choice_reprompts() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[]);
        let mut out = Vec::new();
        Menu::new(&mut store, &b"\xff\n5\n"[..], &mut out, QUIET).run().unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("You must enter option from 1-5!").count(), 1);
        assert!(out.ends_with("Bye byeee!\n"));
    }

    #[test]
    fn test_end_of_input_exits() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[]);
        let out = run_menu(&mut store, "");
        assert!(out.starts_with("Welcome to Terminal Todo List!"));
    }

    #[test]
    fn test_add_saves() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[("Meditate", false)]);
        let out = run_menu(&mut store, "2\nDrink tea\n5\n");
        assert!(out.contains("Added task successfully!"));

        let loaded = TaskStore::load(store.path(), false).unwrap();
        assert_eq!(loaded.tasks().last().unwrap().name, "Drink tea");
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_add_empty_name_is_rejected() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[]);
        let out = run_menu(&mut store, "2\n   \n5\n");
        assert!(out.contains("Task name cannot be empty!"));
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_list_on_empty() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[]);
        let out = run_menu(&mut store, "1\n5\n");
        assert!(out.contains("Todo list is empty!"));
    }

    #[test]
    fn test_toggle_and_banner_once() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[("Meditate", true), ("Wash dishes", false)]);
        // Complete the last open task, reopen it, then leave.
        let out = run_menu(&mut store, "1\n2\n1\n2\n5\n");
        assert!(out.contains("1. [x] Meditate\n2. [ ] Wash dishes"));
        assert!(out.contains("2. [x] Wash dishes"));
        assert_eq!(out.matches("Yayy you've finished").count(), 1);
        assert!(out.contains("Mark task as incomplete"));
        assert!(!store.tasks()[1].is_done);
    }

    #[test]
    fn test_toggle_out_of_range_reprompts() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[("Meditate", false)]);
        let out = run_menu(&mut store, "1\n7\n0\n5\n");
        assert!(out.contains("You must enter a number from 0-1!"));
        assert!(!store.tasks()[0].is_done);
    }

    #[test]
    fn test_edit() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[("Meditate", false)]);
        let out = run_menu(&mut store, "3\n1\nStretch\n5\n");
        assert!(out.contains("Change the name successfully!"));
        let loaded = TaskStore::load(store.path(), false).unwrap();
        assert_eq!(loaded.tasks()[0].name, "Stretch");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[("Meditate", false), ("Wash dishes", false)]);
        run_menu(&mut store, "4\n1\nn\n5\n");
        assert_eq!(store.len(), 2);

        let out = run_menu(&mut store, "4\n1\ny\n5\n");
        assert!(out.contains("Delete the task successfully!"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].name, "Wash dishes");
    }

    #[test]
    fn test_clear_screen_emits_escape_codes() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, &[]);
        let mut out = Vec::new();
        Menu::new(&mut store, "5\n".as_bytes(), &mut out, MenuOptions::default())
            .run()
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\u{1b}[2J"));
    }
}
