//! Error types for task storage.

use std::fmt;
use std::io;

/// Everything that can go wrong while loading, mutating or saving the task list.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
    EmptyName,
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "task file I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "task file is not valid: {e}"),
            StoreError::Serialize(e) => write!(f, "could not serialize tasks: {e}"),
            StoreError::EmptyName => write!(f, "task name cannot be empty"),
            StoreError::OutOfRange { index, len } => {
                if *len == 0 {
                    write!(f, "task {} does not exist, the list is empty", index + 1)
                } else {
                    write!(f, "task {} does not exist, choose from 1-{}", index + 1, len)
                }
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Parse(e) | StoreError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<StoreError> for io::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
