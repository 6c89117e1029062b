use std::collections::BTreeSet;

use crate::model::{Task, TaskId};

/// Ids of tasks taking part in a bulk operation. Only drives loading
/// indicators; it never guards access to anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusySet {
    ids: BTreeSet<TaskId>,
}

impl BusySet {
    pub fn contains(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.ids.iter().copied()
    }

    /// Add every id of `other`; overlapping bulk operations share one set.
    pub(crate) fn absorb(&mut self, other: &BusySet) {
        self.ids.extend(other.iter());
    }

    /// Drop the ids of `other` once its operation settles.
    pub(crate) fn release(&mut self, other: &BusySet) {
        self.ids.retain(|id| !other.contains(*id));
    }
}

/// Busy set covering every task in `tasks`.
pub fn busy_set(tasks: &[Task]) -> BusySet {
    BusySet {
        ids: tasks.iter().map(|task| task.id).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: TaskId) -> Task {
        Task {
            id,
            user_id: 1,
            title: format!("task {id}"),
            completed: false,
        }
    }

    #[test]
    fn contains_every_input_id() {
        let set = busy_set(&[task(4), task(2), task(9)]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 4, 9]);
        assert!(set.contains(9));
        assert!(!set.contains(3));
    }

    #[test]
    fn is_idempotent_for_the_same_input() {
        let tasks = vec![task(1), task(1), task(5)];
        assert_eq!(busy_set(&tasks), busy_set(&tasks));
        assert_eq!(busy_set(&tasks).len(), 2);
    }

    #[test]
    fn release_keeps_ids_of_other_operations() {
        let mut shared = BusySet::default();
        let toggle = busy_set(&[task(1), task(2)]);
        let clear = busy_set(&[task(2), task(3)]);
        shared.absorb(&toggle);
        shared.absorb(&clear);

        shared.release(&clear);
        assert_eq!(shared.iter().collect::<Vec<_>>(), vec![1]);
        shared.release(&toggle);
        assert!(shared.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_set() {
        assert!(busy_set(&[]).is_empty());
    }
}
