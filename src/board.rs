//! In-memory task board
//!
//! Holds the task collection and the transient search/tab state. Dashboard
//! stats and the visible list are derived on every call, never cached.

use chrono::Utc;
use log::debug;

use crate::models::{Priority, TabFilter, TaskId, TaskItem};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub done: usize,
    pub pending: usize,
    pub completion_percent: f64,
}

impl DashboardStats {
    /// Completion rate truncated to a whole percent, as shown on the dashboard
    pub fn whole_percent(&self) -> u32 {
        self.completion_percent as u32
    }
}

#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<TaskItem>,
    search_query: String,
    filter: TabFilter,
    last_id: TaskId,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are seeded from the wall clock and strictly increase.
    fn fresh_id(&mut self) -> TaskId {
        let now = Utc::now().timestamp_millis().max(0) as TaskId;
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Append a task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str, priority: Priority) -> Option<TaskId> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.fresh_id();
        self.tasks.push(TaskItem {
            id,
            text: text.to_string(),
            is_done: false,
            priority,
        });
        debug!("added task {} ({:?})", id, priority);
        Some(id)
    }

    pub fn toggle_done(&mut self, id: TaskId) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.is_done = !task.is_done;
            debug!("task {} done={}", id, task.is_done);
        }
    }

    pub fn remove(&mut self, id: TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            debug!("removed task {}", id);
        }
    }

    pub fn set_search_query(&mut self, text: &str) {
        self.search_query = text.to_string();
    }

    pub fn set_filter(&mut self, tab: TabFilter) {
        self.filter = tab;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn filter(&self) -> TabFilter {
        self.filter
    }

    pub fn tasks(&self) -> &[TaskItem] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskItem> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn stats(&self) -> DashboardStats {
        let total = self.tasks.len();
        let done = self.tasks.iter().filter(|t| t.is_done).count();
        let completion_percent = if total > 0 {
            done as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        DashboardStats {
            total,
            done,
            pending: total - done,
            completion_percent,
        }
    }

    /// Tasks matching the search query and tab, pending first, then by priority.
    pub fn visible_list(&self) -> Vec<&TaskItem> {
        let query = self.search_query.to_lowercase();
        let mut visible: Vec<&TaskItem> = self
            .tasks
            .iter()
            .filter(|t| t.text.to_lowercase().contains(&query))
            .filter(|t| self.filter.matches(t))
            .collect();
        visible.sort_by_key(|t| (t.is_done, t.priority.rank()));
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(items: &[(&str, bool, Priority)]) -> TaskBoard {
        let mut board = TaskBoard::new();
        for (text, done, priority) in items {
            let id = board.add(text, *priority).unwrap();
            if *done {
                board.toggle_done(id);
            }
        }
        board
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let mut board = TaskBoard::new();
        assert_eq!(board.add("", Priority::High), None);
        assert_eq!(board.add("   ", Priority::High), None);
        assert_eq!(board.add("\t\n", Priority::Low), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_add_appends_pending_item() {
        let mut board = TaskBoard::new();
        let id = board.add("Buy milk", Priority::High).unwrap();
        assert_eq!(board.len(), 1);

        let task = board.get(id).unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.is_done);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut board = TaskBoard::new();
        let ids: Vec<TaskId> = (0..50).filter_map(|i| board.add(&format!("task {i}"), Priority::Low)).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_toggle_flips_and_unknown_id_is_noop() {
        let mut board = TaskBoard::new();
        let id = board.add("Walk dog", Priority::Medium).unwrap();

        board.toggle_done(id);
        assert!(board.get(id).unwrap().is_done);
        board.toggle_done(id);
        assert!(!board.get(id).unwrap().is_done);

        let snapshot = board.tasks().to_vec();
        board.toggle_done(id + 1000);
        assert_eq!(board.tasks(), snapshot.as_slice());
    }

    #[test]
    fn test_remove_and_unknown_id_is_noop() {
        let mut board = board_with(&[("a", false, Priority::Low), ("b", false, Priority::Low)]);
        let first = board.tasks()[0].id;

        let snapshot = board.tasks().to_vec();
        board.remove(first + 1000);
        assert_eq!(board.tasks(), snapshot.as_slice());

        board.remove(first);
        assert_eq!(board.len(), 1);
        assert_eq!(board.tasks()[0].text, "b");
    }

    #[test]
    fn test_stats_empty_board() {
        let stats = TaskBoard::new().stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.done, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.completion_percent, 0.0);
    }

    #[test]
    fn test_stats_half_done() {
        let board = board_with(&[
            ("a", true, Priority::Low),
            ("b", true, Priority::Low),
            ("c", false, Priority::Low),
            ("d", false, Priority::Low),
        ]);
        let stats = board.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.pending + stats.done, stats.total);
        assert_eq!(stats.completion_percent, 50.0);
        assert_eq!(stats.whole_percent(), 50);
    }

    #[test]
    fn test_stats_percent_is_truncated_for_display() {
        let board = board_with(&[
            ("a", true, Priority::Low),
            ("b", true, Priority::Low),
            ("c", false, Priority::Low),
        ]);
        assert_eq!(board.stats().whole_percent(), 66);
    }

    #[test]
    fn test_visible_sort_pending_first_then_priority() {
        let board = board_with(&[
            ("low", false, Priority::Low),
            ("high", false, Priority::High),
            ("high done", true, Priority::High),
        ]);
        let order: Vec<&str> = board.visible_list().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(order, vec!["high", "low", "high done"]);
    }

    #[test]
    fn test_visible_sort_is_stable() {
        let board = board_with(&[
            ("first", false, Priority::Medium),
            ("second", false, Priority::Medium),
            ("urgent", false, Priority::High),
            ("third", false, Priority::Medium),
        ]);
        let order: Vec<&str> = board.visible_list().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(order, vec!["urgent", "first", "second", "third"]);
    }

    #[test]
    fn test_pending_filter_with_search() {
        let mut board = board_with(&[
            ("Buy milk", false, Priority::Low),
            ("Buy milk", true, Priority::Low),
            ("Walk dog", false, Priority::Low),
        ]);
        let first = board.tasks()[0].id;

        board.set_filter(TabFilter::Pending);
        board.set_search_query("milk");
        let visible = board.visible_list();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, first);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut board = board_with(&[("Buy MILK", false, Priority::Low), ("Walk dog", true, Priority::Low)]);
        board.set_search_query("mIlK");
        assert_eq!(board.visible_list().len(), 1);

        board.set_search_query("");
        assert_eq!(board.visible_list().len(), 2);
    }

    #[test]
    fn test_done_filter() {
        let mut board = board_with(&[("a", false, Priority::Low), ("b", true, Priority::High)]);
        board.set_filter(TabFilter::Done);
        let visible = board.visible_list();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "b");
        assert_eq!(board.filter(), TabFilter::Done);
    }

    #[test]
    fn test_view_state_does_not_touch_collection() {
        let mut board = board_with(&[("a", false, Priority::Low)]);
        board.set_filter(TabFilter::Done);
        board.set_search_query("zzz");
        assert!(board.visible_list().is_empty());
        assert_eq!(board.stats().total, 1);
        assert_eq!(board.search_query(), "zzz");
    }
}
