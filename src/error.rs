use std::io;
use thiserror::Error;

/// Errors surfaced by the service and repository.
#[derive(Error, Debug)]
pub enum TodoError {
    /// Missing or soft-deleted list
    #[error("TodoList {0} not found")]
    TodoListNotFound(i64),

    /// Missing, soft-deleted, or belonging to another list
    #[error("Item {item_id} not found in TodoList {todolist_id}")]
    ItemNotFound { todolist_id: i64, item_id: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TodoError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TodoError::TodoListNotFound(_) | TodoError::ItemNotFound { .. }
        )
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        if self.is_not_found() {
            return 2;
        }
        match self {
            TodoError::Validation(_) => 3,
            _ => 1,
        }
    }
}

pub type TodoResult<T> = std::result::Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinct_from_validation() {
        let missing = TodoError::ItemNotFound {
            todolist_id: 1,
            item_id: 2,
        };
        let invalid = TodoError::Validation("name must not be empty".to_string());

        assert!(missing.is_not_found());
        assert!(!invalid.is_not_found());
        assert_ne!(missing.exit_code(), invalid.exit_code());
        assert_eq!(missing.to_string(), "Item 2 not found in TodoList 1");
    }
}
