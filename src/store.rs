//! Task storage: the in-memory list, the selection marks and the JSON file
//! behind them.
//!
//! `TaskStore` is the only owner of the task list. The menu, the TUI and the
//! one-shot commands all borrow it mutably and call `save` when they want the
//! current state on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;
use crate::task::{normalise_name, Task};

/// Tasks created when no task file exists yet and seeding is enabled.
pub const DEFAULT_TASKS: [&str; 2] = ["Meditate", "Wash dishes"];

/// Result of flipping a task's completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The task is now done but others are still open.
    Completed,
    /// The task went back to open.
    Reopened,
    /// The task is now done and so is every other task.
    AllDone,
}

/// Document written to disk.
#[derive(Serialize)]
struct DocumentOut<'a> {
    #[serde(rename = "taskList")]
    task_list: &'a [Task],
    selected: &'a BTreeSet<usize>,
}

/// Every shape the task file has had over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentIn {
    Tasks {
        #[serde(rename = "taskList", deserialize_with = "deserialize_task_list")]
        task_list: Vec<Task>,
        #[serde(default, deserialize_with = "deserialize_selected")]
        selected: BTreeSet<usize>,
    },
    Names {
        #[serde(rename = "taskList")]
        task_list: Vec<String>,
        #[serde(default, deserialize_with = "deserialize_selected")]
        selected: BTreeSet<usize>,
    },
    Flat(Vec<Task>),
}

/// `taskList` must be present, but may be `null`.
fn deserialize_task_list<'de, D>(deserializer: D) -> Result<Vec<Task>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Task>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept the selection as a list of indices, as an object keyed by index
/// (`{"0": {}}`), or as `null`.
fn deserialize_selected<'de, D>(deserializer: D) -> Result<BTreeSet<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<usize>),
        Keys(BTreeMap<String, IgnoredAny>),
        Null(()),
    }

    match Repr::deserialize(deserializer)? {
        Repr::List(indices) => Ok(indices.into_iter().collect()),
        Repr::Keys(map) => map
            .keys()
            .map(|k| k.trim().parse::<usize>().map_err(<D::Error as de::Error>::custom))
            .collect(),
        Repr::Null(()) => Ok(BTreeSet::new()),
    }
}

/// The ordered task list, its selection marks and the file they persist to.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    selected: BTreeSet<usize>,
}

impl TaskStore {
    /// Create an empty store bound to `path` without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TaskStore {
            path: path.into(),
            tasks: Vec::new(),
            selected: BTreeSet::new(),
        }
    }

    /// Create a store from already materialised state.
    ///
    /// Selected indices that do not point at a task are discarded.
    pub fn from_parts(path: impl Into<PathBuf>, tasks: Vec<Task>, selected: BTreeSet<usize>) -> Self {
        let mut store = TaskStore {
            path: path.into(),
            tasks,
            selected,
        };
        store.prune_selection();
        store
    }

    /// Load the store from `path`.
    ///
    /// A missing file gives an empty list, or the default tasks when
    /// `seed_defaults` is set. A file holding only whitespace gives an empty
    /// list. Anything else must parse, otherwise `StoreError::Parse` is
    /// returned and nothing is recovered.
    pub fn load(path: &Path, seed_defaults: bool) -> Result<Self, StoreError> {
        if !path.exists() {
            let mut store = TaskStore::new(path);
            if seed_defaults {
                store.tasks = DEFAULT_TASKS.iter().map(|name| Task::new(*name)).collect();
            }
            info!(
                "No task file at {}, starting with {} task(s)",
                path.display(),
                store.tasks.len()
            );
            return Ok(store);
        }

        let buf = fs::read_to_string(path)?;
        if buf.trim().is_empty() {
            info!("Task file {} is empty", path.display());
            return Ok(TaskStore::new(path));
        }

        let doc: DocumentIn = serde_json::from_str(&buf).map_err(StoreError::Parse)?;
        let (tasks, selected) = match doc {
            DocumentIn::Tasks { task_list, selected } => (task_list, selected),
            DocumentIn::Names { task_list, selected } => {
                (task_list.into_iter().map(Task::new).collect(), selected)
            }
            DocumentIn::Flat(tasks) => (tasks, BTreeSet::new()),
        };

        let store = TaskStore::from_parts(path, tasks, selected);
        info!(
            "Loaded {} task(s), {} selected, from {}",
            store.tasks.len(),
            store.selected.len(),
            path.display()
        );
        Ok(store)
    }

    /// Write the full state to disk using a temp file and a rename.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let doc = DocumentOut {
            task_list: &self.tasks,
            selected: &self.selected,
        };
        let data = serde_json::to_string_pretty(&doc).map_err(StoreError::Serialize)?;

        let tmp = self.temp_path();
        if let Err(e) = Self::write_replace(&tmp, &self.path, data.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("Saved {} task(s) to {}", self.tasks.len(), self.path.display());
        Ok(())
    }

    fn write_replace(tmp: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut f = File::create(tmp)?;
        f.write_all(data)?;
        f.flush()?;
        f.sync_all()?;
        fs::rename(tmp, path)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tasks.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_done).count()
    }

    /// True when the list is non-empty and every task is done.
    pub fn all_done(&self) -> bool {
        !self.tasks.is_empty() && self.done_count() == self.tasks.len()
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.tasks.len() {
            Ok(())
        } else {
            Err(StoreError::OutOfRange {
                index,
                len: self.tasks.len(),
            })
        }
    }

    /// Append a new open task. Returns its index.
    pub fn add(&mut self, name: &str) -> Result<usize, StoreError> {
        let name = normalise_name(name).ok_or(StoreError::EmptyName)?;
        debug!("Adding task {:?}", name);
        self.tasks.push(Task::new(name));
        Ok(self.tasks.len() - 1)
    }

    /// Replace the name of the task at `index`.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), StoreError> {
        self.check_index(index)?;
        let name = normalise_name(name).ok_or(StoreError::EmptyName)?;
        debug!("Renaming task {} to {:?}", index, name);
        self.tasks[index].name = name;
        Ok(())
    }

    /// Remove the task at `index`.
    ///
    /// The selection follows the remaining tasks: the removed index is
    /// unmarked and every marked index after it moves down by one.
    pub fn remove(&mut self, index: usize) -> Result<Task, StoreError> {
        self.check_index(index)?;
        let task = self.tasks.remove(index);
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        debug!("Removed task {} ({:?})", index, task.name);
        Ok(task)
    }

    /// Flip the completion flag of the task at `index`.
    pub fn toggle_done(&mut self, index: usize) -> Result<Toggle, StoreError> {
        self.check_index(index)?;
        let task = &mut self.tasks[index];
        task.is_done = !task.is_done;
        let outcome = if !task.is_done {
            Toggle::Reopened
        } else if self.all_done() {
            Toggle::AllDone
        } else {
            Toggle::Completed
        };
        debug!("Toggled task {}: {:?}", index, outcome);
        Ok(outcome)
    }

    /// Flip the selection mark of the task at `index`. Returns whether the
    /// task is selected afterwards.
    pub fn toggle_selected(&mut self, index: usize) -> Result<bool, StoreError> {
        self.check_index(index)?;
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    fn prune_selection(&mut self) {
        let len = self.tasks.len();
        let before = self.selected.len();
        self.selected.retain(|&i| i < len);
        let dropped = before - self.selected.len();
        if dropped > 0 {
            warn!("Dropped {} selected index(es) beyond the {} task(s)", dropped, len);
        }
    }
}
