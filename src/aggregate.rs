//! In-memory view of one todo-list and its active items.
//!
//! The aggregate owns the `done_count` / `total_count` bookkeeping. It is
//! built by the repository for a single operation and handed back to
//! `TodoListRepository::save` once mutated.

use crate::model::{progress, Item, TodoListView};

#[derive(Debug, Clone, PartialEq)]
pub struct TodoListAggregate {
    pub id: i64,
    pub name: String,
    pub done_count: i64,
    pub total_count: i64,
    items: Vec<Item>,
}

impl TodoListAggregate {
    pub fn new(id: i64, name: String, done_count: i64, total_count: i64, items: Vec<Item>) -> Self {
        TodoListAggregate {
            id,
            name,
            done_count,
            total_count,
            items,
        }
    }

    pub fn progress(&self) -> f64 {
        progress(self.done_count, self.total_count)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Appends an item that already has a storage id.
    pub fn add_item(&mut self, item: Item) {
        self.total_count += 1;
        if item.is_done {
            self.done_count += 1;
        }
        self.items.push(item);
    }

    /// Overwrites the first item with `item_id`. Returns `None` and leaves
    /// the aggregate untouched if there is no such item.
    pub fn update_item(
        &mut self,
        item_id: i64,
        name: String,
        text: String,
        is_done: bool,
    ) -> Option<&Item> {
        let item = self.items.iter_mut().find(|item| item.id == item_id)?;
        match (item.is_done, is_done) {
            (false, true) => self.done_count += 1,
            (true, false) => self.done_count -= 1,
            _ => {}
        }
        item.name = name;
        item.text = text;
        item.is_done = is_done;
        Some(item)
    }

    /// Removes the first item with `item_id` and returns it.
    pub fn soft_delete_item(&mut self, item_id: i64) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        let item = self.items.remove(index);
        if item.is_done {
            self.done_count -= 1;
        }
        self.total_count -= 1;
        Some(item)
    }

    pub fn into_view(self) -> TodoListView {
        TodoListView {
            progress: self.progress(),
            id: self.id,
            name: self.name,
            done_count: self.done_count,
            total_count: self.total_count,
            items: self.items,
        }
    }

    pub(crate) fn set_counts(&mut self, done_count: i64, total_count: i64) {
        self.done_count = done_count;
        self.total_count = total_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(id: i64, name: &str, is_done: bool) -> Item {
        Item {
            id,
            name: name.to_string(),
            text: String::new(),
            is_done,
            todolist_id: 1,
            deleted_at: None,
        }
    }

    fn empty() -> TodoListAggregate {
        TodoListAggregate::new(1, "Groceries".to_string(), 0, 0, vec![])
    }

    fn assert_counts_match_items(aggregate: &TodoListAggregate) {
        let done = aggregate.items().iter().filter(|item| item.is_done).count() as i64;
        assert_eq!(aggregate.done_count, done);
        assert_eq!(aggregate.total_count, aggregate.items().len() as i64);
    }

    #[test]
    fn groceries_scenario() {
        let mut groceries = empty();
        assert_eq!(groceries.total_count, 0);
        assert_eq!(groceries.progress(), 0.0);

        groceries.add_item(item(1, "Milk", false));
        assert_eq!((groceries.done_count, groceries.total_count), (0, 1));

        groceries.add_item(item(2, "Eggs", true));
        assert_eq!((groceries.done_count, groceries.total_count), (1, 2));
        assert_eq!(groceries.progress(), 50.0);

        let removed = groceries.soft_delete_item(1).unwrap();
        assert_eq!(removed.name, "Milk");
        assert_eq!((groceries.done_count, groceries.total_count), (1, 1));
        assert_eq!(groceries.progress(), 100.0);
    }

    #[test]
    fn add_then_delete_done_item_restores_counts() {
        let mut aggregate = empty();
        aggregate.add_item(item(1, "Bread", false));
        let before = (aggregate.done_count, aggregate.total_count);

        aggregate.add_item(item(2, "Eggs", true));
        aggregate.soft_delete_item(2);

        assert_eq!((aggregate.done_count, aggregate.total_count), before);
    }

    #[test]
    fn toggling_twice_keeps_done_count() {
        let mut aggregate = empty();
        aggregate.add_item(item(1, "Milk", false));

        aggregate.update_item(1, "Milk".into(), String::new(), true);
        assert_eq!(aggregate.done_count, 1);
        aggregate.update_item(1, "Milk".into(), String::new(), false);
        assert_eq!(aggregate.done_count, 0);
    }

    #[test]
    fn update_overwrites_fields() {
        let mut aggregate = empty();
        aggregate.add_item(item(4, "Milk", false));

        let updated = aggregate
            .update_item(4, "Oat milk".into(), "barista".into(), false)
            .unwrap();
        assert_eq!(updated.name, "Oat milk");
        assert_eq!(updated.text, "barista");
        assert_eq!(aggregate.done_count, 0);
    }

    #[test]
    fn update_of_unknown_item_changes_nothing() {
        let mut aggregate = empty();
        aggregate.add_item(item(1, "Milk", true));
        let before = aggregate.clone();

        assert!(aggregate
            .update_item(99, "Ghost".into(), "boo".into(), false)
            .is_none());
        assert_eq!(aggregate, before);
    }

    #[test]
    fn delete_of_unknown_item_changes_nothing() {
        let mut aggregate = empty();
        aggregate.add_item(item(1, "Milk", true));
        let before = aggregate.clone();

        assert!(aggregate.soft_delete_item(99).is_none());
        assert_eq!(aggregate, before);
    }

    #[test]
    fn into_view_keeps_items() {
        let mut aggregate = empty();
        aggregate.add_item(item(1, "Milk", true));
        let view = aggregate.into_view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.progress, 100.0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(bool),
        Update(usize, bool),
        Delete(usize),
        UpdateMissing(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Add),
            (any::<usize>(), any::<bool>()).prop_map(|(i, d)| Op::Update(i, d)),
            any::<usize>().prop_map(Op::Delete),
            any::<bool>().prop_map(Op::UpdateMissing),
        ]
    }

    proptest! {
        /// Property: counters always agree with the item set
        #[test]
        fn prop_counts_track_items(ops in prop::collection::vec(op(), 0..64)) {
            let mut aggregate = empty();
            let mut next_id = 1;

            for op in ops {
                match op {
                    Op::Add(done) => {
                        aggregate.add_item(item(next_id, "x", done));
                        next_id += 1;
                    }
                    Op::Update(pick, done) => {
                        if !aggregate.items().is_empty() {
                            let id = aggregate.items()[pick % aggregate.items().len()].id;
                            prop_assert!(aggregate.update_item(id, "y".into(), String::new(), done).is_some());
                        }
                    }
                    Op::Delete(pick) => {
                        if !aggregate.items().is_empty() {
                            let id = aggregate.items()[pick % aggregate.items().len()].id;
                            prop_assert!(aggregate.soft_delete_item(id).is_some());
                        }
                    }
                    Op::UpdateMissing(done) => {
                        prop_assert!(aggregate.update_item(-1, "z".into(), String::new(), done).is_none());
                    }
                }

                assert_counts_match_items(&aggregate);
                prop_assert!(aggregate.done_count <= aggregate.total_count);
                let progress = aggregate.progress();
                prop_assert!((0.0..=100.0).contains(&progress));
                if aggregate.total_count == 0 {
                    prop_assert_eq!(progress, 0.0);
                }
            }
        }
    }
}
