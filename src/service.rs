//! Operations offered to the CLI and the terminal UI.
//!
//! Each mutating call loads a fresh aggregate, applies one change and saves
//! it before returning; nothing is cached between calls.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{TodoError, TodoResult};
use crate::model::{Item, TodoListView};
use crate::repository::TodoListRepository;

pub struct TodoService {
    repo: TodoListRepository,
}

impl TodoService {
    pub fn new(conn: Connection) -> Self {
        TodoService {
            repo: TodoListRepository::new(conn),
        }
    }

    pub fn create_todolist(&mut self, name: &str) -> TodoResult<TodoListView> {
        let name = required("todolist name", name)?;
        let todolist = self.repo.insert_todolist(name)?;
        info!(todolist_id = todolist.id, "created todolist");
        Ok(TodoListView::from(todolist))
    }

    /// Active lists with their stored counters; items are left out.
    pub fn list_todolists(&self) -> TodoResult<Vec<TodoListView>> {
        let lists = self.repo.list_todolists()?;
        Ok(lists.into_iter().map(TodoListView::from).collect())
    }

    pub fn get_todolist(&self, todolist_id: i64) -> TodoResult<TodoListView> {
        let aggregate = self
            .repo
            .get_aggregate(todolist_id)?
            .ok_or(TodoError::TodoListNotFound(todolist_id))?;
        Ok(aggregate.into_view())
    }

    pub fn create_item(&mut self, todolist_id: i64, name: &str, text: &str) -> TodoResult<Item> {
        let name = required("item name", name)?;
        let mut aggregate = self
            .repo
            .get_aggregate(todolist_id)?
            .ok_or(TodoError::TodoListNotFound(todolist_id))?;

        let item = self.repo.insert_item(todolist_id, name, text)?;
        aggregate.add_item(item.clone());
        self.repo.save(&mut aggregate)?;

        info!(todolist_id, item_id = item.id, "created item");
        Ok(item)
    }

    /// `is_done` of `None` keeps the stored flag.
    pub fn update_item(
        &mut self,
        todolist_id: i64,
        item_id: i64,
        name: &str,
        text: &str,
        is_done: Option<bool>,
    ) -> TodoResult<Item> {
        let name = required("item name", name)?;
        let mut aggregate = self
            .repo
            .get_aggregate(todolist_id)?
            .ok_or(TodoError::TodoListNotFound(todolist_id))?;
        let stored = self
            .repo
            .find_item(todolist_id, item_id)?
            .ok_or(TodoError::ItemNotFound {
                todolist_id,
                item_id,
            })?;

        let is_done = is_done.unwrap_or(stored.is_done);
        let item = aggregate
            .update_item(item_id, name.to_string(), text.to_string(), is_done)
            .cloned()
            .ok_or(TodoError::ItemNotFound {
                todolist_id,
                item_id,
            })?;
        self.repo.save(&mut aggregate)?;

        debug!(todolist_id, item_id, is_done, "updated item");
        Ok(item)
    }

    pub fn delete_item(&mut self, todolist_id: i64, item_id: i64) -> TodoResult<()> {
        let mut aggregate = self
            .repo
            .get_aggregate(todolist_id)?
            .ok_or(TodoError::TodoListNotFound(todolist_id))?;
        if self.repo.find_item(todolist_id, item_id)?.is_none() {
            return Err(TodoError::ItemNotFound {
                todolist_id,
                item_id,
            });
        }

        self.repo.soft_delete_item(item_id)?;
        aggregate.soft_delete_item(item_id);
        self.repo.save(&mut aggregate)?;

        info!(todolist_id, item_id, "soft deleted item");
        Ok(())
    }

    /// No existence check: deleting an unknown or already deleted list
    /// succeeds without touching storage.
    pub fn delete_todolist(&mut self, todolist_id: i64) -> TodoResult<()> {
        if self.repo.soft_delete_todolist(todolist_id)? {
            info!(todolist_id, "soft deleted todolist");
            return Ok(());
        }
        match self.repo.find_todolist_row(todolist_id)? {
            Some(row) => debug!(todolist_id, deleted_at = ?row.deleted_at, "todolist already deleted"),
            None => debug!(todolist_id, "todolist does not exist"),
        }
        Ok(())
    }
}

fn required<'a>(field: &str, value: &'a str) -> TodoResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TodoError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}
