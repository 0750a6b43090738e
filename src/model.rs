use chrono::{DateTime, Utc};
use serde::Serialize;
use std::vec::Vec;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub is_done: bool,
    pub todolist_id: i64,
    #[serde(skip_serializing)]
    #[allow(dead_code)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoList {
    pub id: i64,
    pub name: String,
    pub done_count: i64,
    pub total_count: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TodoList {
    pub fn progress(&self) -> f64 {
        progress(self.done_count, self.total_count)
    }
}

/// Response shape for a list: stored counters, computed progress and,
/// for single-list reads, the active items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoListView {
    pub id: i64,
    pub name: String,
    pub done_count: i64,
    pub total_count: i64,
    pub progress: f64,
    pub items: Vec<Item>,
}

impl From<TodoList> for TodoListView {
    fn from(list: TodoList) -> Self {
        TodoListView {
            progress: list.progress(),
            id: list.id,
            name: list.name,
            done_count: list.done_count,
            total_count: list.total_count,
            items: vec![],
        }
    }
}

/// Percentage of done items, `0.0` for an empty list.
pub fn progress(done_count: i64, total_count: i64) -> f64 {
    if total_count <= 0 {
        return 0.0;
    }
    done_count as f64 / total_count as f64 * 100.0
}
