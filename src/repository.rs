use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, warn};

use crate::aggregate::TodoListAggregate;
use crate::error::TodoResult;
use crate::model::{Item, TodoList};

const TODOLIST_COLUMNS: &str = "id, name, done_count, total_count, deleted_at";
const ITEM_COLUMNS: &str = "id, name, text, is_done, todolist_id, deleted_at";

/// Persists todo-lists and their items in SQLite.
///
/// Rows are never removed; deletion stamps `deleted_at` and every read
/// through the aggregate path filters those rows out.
pub struct TodoListRepository {
    conn: Connection,
}

impl TodoListRepository {
    pub fn new(conn: Connection) -> Self {
        TodoListRepository { conn }
    }

    /// Loads an active list together with its active items. `None` when the
    /// list does not exist or is soft-deleted.
    pub fn get_aggregate(&self, todolist_id: i64) -> TodoResult<Option<TodoListAggregate>> {
        let todolist = self
            .conn
            .query_row(
                &format!(
                    "SELECT {TODOLIST_COLUMNS} FROM todolists WHERE id = ?1 AND deleted_at IS NULL"
                ),
                params![todolist_id],
                todolist_from_row,
            )
            .optional()?;

        let todolist = match todolist {
            Some(todolist) => todolist,
            None => {
                debug!(todolist_id, "todolist not found");
                return Ok(None);
            }
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE todolist_id = ?1 AND deleted_at IS NULL
             ORDER BY id"
        ))?;
        let items = stmt
            .query_map(params![todolist_id], item_from_row)?
            .collect::<rusqlite::Result<Vec<Item>>>()?;

        Ok(Some(TodoListAggregate::new(
            todolist.id,
            todolist.name,
            todolist.done_count,
            todolist.total_count,
            items,
        )))
    }

    /// Writes the aggregate back in one transaction.
    ///
    /// The list row is inserted or updated and its `deleted_at` cleared.
    /// Every in-memory item is upserted, also clearing `deleted_at`. Stored
    /// items missing from the aggregate are left alone. The counters are
    /// recomputed from the active item rows and copied into the aggregate.
    pub fn save(&mut self, aggregate: &mut TodoListAggregate) -> TodoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let list_exists = tx
            .query_row(
                "SELECT 1 FROM todolists WHERE id = ?1",
                params![aggregate.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        if list_exists {
            tx.execute(
                "UPDATE todolists SET name = ?2, deleted_at = NULL WHERE id = ?1",
                params![aggregate.id, aggregate.name],
            )?;
        } else {
            debug!(todolist_id = aggregate.id, "inserting todolist on save");
            tx.execute(
                "INSERT INTO todolists (id, name, done_count, total_count, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, NULL)",
                params![
                    aggregate.id,
                    aggregate.name,
                    aggregate.done_count,
                    aggregate.total_count
                ],
            )?;
        }

        {
            let mut stmt = tx.prepare("SELECT id FROM items WHERE todolist_id = ?1")?;
            let existing = stmt
                .query_map(params![aggregate.id], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<HashSet<i64>>>()?;

            for item in aggregate.items() {
                if existing.contains(&item.id) {
                    tx.execute(
                        "UPDATE items SET name = ?2, text = ?3, is_done = ?4, deleted_at = NULL
                         WHERE id = ?1",
                        params![item.id, item.name, item.text, item.is_done],
                    )?;
                } else {
                    tx.execute(
                        "INSERT INTO items (id, name, text, is_done, todolist_id, deleted_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
                        params![item.id, item.name, item.text, item.is_done, aggregate.id],
                    )?;
                }
            }
        }

        let (done_count, total_count): (i64, i64) = tx.query_row(
            "SELECT COALESCE(SUM(is_done), 0), COUNT(*) FROM items
             WHERE todolist_id = ?1 AND deleted_at IS NULL",
            params![aggregate.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        tx.execute(
            "UPDATE todolists SET done_count = ?2, total_count = ?3 WHERE id = ?1",
            params![aggregate.id, done_count, total_count],
        )?;

        tx.commit()?;

        if (done_count, total_count) != (aggregate.done_count, aggregate.total_count) {
            warn!(
                todolist_id = aggregate.id,
                expected_done = aggregate.done_count,
                expected_total = aggregate.total_count,
                done_count,
                total_count,
                "counters drifted from stored items, using stored values"
            );
        }
        aggregate.set_counts(done_count, total_count);

        debug!(
            todolist_id = aggregate.id,
            done_count, total_count, "saved todolist"
        );
        Ok(())
    }

    /// Returns whether an active list was stamped.
    pub fn soft_delete_todolist(&self, todolist_id: i64) -> TodoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE todolists SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![todolist_id, now()],
        )?;
        debug!(todolist_id, changed, "soft delete todolist");
        Ok(changed > 0)
    }

    /// Returns whether an active item was stamped.
    pub fn soft_delete_item(&self, item_id: i64) -> TodoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE items SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![item_id, now()],
        )?;
        debug!(item_id, changed, "soft delete item");
        Ok(changed > 0)
    }

    pub fn insert_todolist(&self, name: &str) -> TodoResult<TodoList> {
        self.conn.execute(
            "INSERT INTO todolists (name, done_count, total_count, deleted_at)
             VALUES (?1, 0, 0, NULL)",
            params![name],
        )?;
        Ok(TodoList {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            done_count: 0,
            total_count: 0,
            deleted_at: None,
        })
    }

    pub fn insert_item(&self, todolist_id: i64, name: &str, text: &str) -> TodoResult<Item> {
        self.conn.execute(
            "INSERT INTO items (name, text, is_done, todolist_id, deleted_at)
             VALUES (?1, ?2, 0, ?3, NULL)",
            params![name, text, todolist_id],
        )?;
        Ok(Item {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            text: text.to_string(),
            is_done: false,
            todolist_id,
            deleted_at: None,
        })
    }

    /// Active item scoped to its list.
    pub fn find_item(&self, todolist_id: i64, item_id: i64) -> TodoResult<Option<Item>> {
        let item = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM items
                     WHERE id = ?1 AND todolist_id = ?2 AND deleted_at IS NULL"
                ),
                params![item_id, todolist_id],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    pub fn list_todolists(&self) -> TodoResult<Vec<TodoList>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TODOLIST_COLUMNS} FROM todolists WHERE deleted_at IS NULL ORDER BY id"
        ))?;
        let lists = stmt
            .query_map(params![], todolist_from_row)?
            .collect::<rusqlite::Result<Vec<TodoList>>>()?;
        Ok(lists)
    }

    /// Raw row lookup that also sees soft-deleted lists.
    pub fn find_todolist_row(&self, todolist_id: i64) -> TodoResult<Option<TodoList>> {
        let todolist = self
            .conn
            .query_row(
                &format!("SELECT {TODOLIST_COLUMNS} FROM todolists WHERE id = ?1"),
                params![todolist_id],
                todolist_from_row,
            )
            .optional()?;
        Ok(todolist)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|d| d.with_timezone(&Utc))
}

fn todolist_from_row(row: &Row) -> rusqlite::Result<TodoList> {
    Ok(TodoList {
        id: row.get(0)?,
        name: row.get(1)?,
        done_count: row.get(2)?,
        total_count: row.get(3)?,
        deleted_at: parse_timestamp(row.get(4)?),
    })
}

fn item_from_row(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        text: row.get(2)?,
        is_done: row.get(3)?,
        todolist_id: row.get(4)?,
        deleted_at: parse_timestamp(row.get(5)?),
    })
}
