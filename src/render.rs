use serde::Serialize;

use crate::model::{Item, TodoListView};

#[derive(Debug, Serialize)]
pub struct Ack {
    pub detail: &'static str,
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn list_line(list: &TodoListView) -> String {
    format!(
        "#{} {}  {}/{} done ({:.0}%)",
        list.id, list.name, list.done_count, list.total_count, list.progress
    )
}

pub fn item_line(item: &Item) -> String {
    let check = match item.is_done {
        true => "[x]",
        false => "[ ]",
    };
    if item.text.is_empty() {
        format!("{} #{} {}", check, item.id, item.name)
    } else {
        format!("{} #{} {}: {}", check, item.id, item.name, item.text)
    }
}

pub fn render_lists(lists: &[TodoListView]) -> String {
    if lists.is_empty() {
        return "No lists".to_string();
    }
    lists.iter().map(list_line).collect::<Vec<_>>().join("\n")
}

pub fn render_todolist(list: &TodoListView) -> String {
    let mut lines = vec![list_line(list)];
    lines.extend(list.items.iter().map(|item| format!("  {}", item_line(item))));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eggs(is_done: bool, text: &str) -> Item {
        Item {
            id: 2,
            name: "Eggs".to_string(),
            text: text.to_string(),
            is_done,
            todolist_id: 1,
            deleted_at: None,
        }
    }

    #[test]
    fn renders_list_with_items() {
        let view = TodoListView {
            id: 1,
            name: "Groceries".to_string(),
            done_count: 1,
            total_count: 2,
            progress: 50.0,
            items: vec![eggs(true, "free range")],
        };
        assert_eq!(
            render_todolist(&view),
            "#1 Groceries  1/2 done (50%)\n  [x] #2 Eggs: free range"
        );
    }

    #[test]
    fn item_without_text() {
        assert_eq!(item_line(&eggs(false, "")), "[ ] #2 Eggs");
    }

    #[test]
    fn empty_lists() {
        assert_eq!(render_lists(&[]), "No lists");
    }

    #[test]
    fn ack_json() {
        let json = to_json(&Ack {
            detail: "Item soft deleted",
        })
        .unwrap();
        assert!(json.contains("\"detail\": \"Item soft deleted\""));
    }
}
