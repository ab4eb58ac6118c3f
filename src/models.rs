use std::fmt;

/// Current authentication state, observed by the host screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Authenticated,
    Unauthenticated,
    Error(String),
}

impl AuthStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AuthStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Idle => write!(f, "idle"),
            AuthStatus::Loading => write!(f, "loading"),
            AuthStatus::Authenticated => write!(f, "authenticated"),
            AuthStatus::Unauthenticated => write!(f, "unauthenticated"),
            AuthStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank; lower ranks are listed first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Priority::High => Priority::Low,
            Priority::Medium => Priority::High,
            Priority::Low => Priority::Medium,
        }
    }
}

pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: TaskId,
    pub text: String,
    pub is_done: bool,
    pub priority: Priority,
}

/// Which slice of the board the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabFilter {
    #[default]
    All,
    Pending,
    Done,
}

impl TabFilter {
    pub const ALL: [TabFilter; 3] = [TabFilter::All, TabFilter::Pending, TabFilter::Done];

    pub fn matches(self, item: &TaskItem) -> bool {
        match self {
            TabFilter::All => true,
            TabFilter::Pending => !item.is_done,
            TabFilter::Done => item.is_done,
        }
    }

    pub fn index(self) -> usize {
        match self {
            TabFilter::All => 0,
            TabFilter::Pending => 1,
            TabFilter::Done => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            TabFilter::All => TabFilter::Pending,
            TabFilter::Pending => TabFilter::Done,
            TabFilter::Done => TabFilter::All,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            TabFilter::All => TabFilter::Done,
            TabFilter::Pending => TabFilter::All,
            TabFilter::Done => TabFilter::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TabFilter::All => "All",
            TabFilter::Pending => "Pending",
            TabFilter::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    Home,
}

/// Which widget receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Email,
    Password,
    Normal,
    Search,
    AddTask,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(is_done: bool) -> TaskItem {
        TaskItem {
            id: 1,
            text: "x".to_string(),
            is_done,
            priority: Priority::Low,
        }
    }

    #[test]
    fn test_priority_rank_orders_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Low);
    }

    #[test]
    fn test_priority_cycle() {
        for p in Priority::ALL {
            assert_eq!(p.next().previous(), p);
        }
        assert_eq!(Priority::Low.next(), Priority::High);
    }

    #[test]
    fn test_tab_filter_predicates() {
        assert!(TabFilter::All.matches(&item(true)));
        assert!(TabFilter::All.matches(&item(false)));
        assert!(TabFilter::Pending.matches(&item(false)));
        assert!(!TabFilter::Pending.matches(&item(true)));
        assert!(TabFilter::Done.matches(&item(true)));
        assert!(!TabFilter::Done.matches(&item(false)));
    }

    #[test]
    fn test_tab_filter_cycle_matches_index() {
        for (i, tab) in TabFilter::ALL.iter().enumerate() {
            assert_eq!(tab.index(), i);
            assert_eq!(tab.next().previous(), *tab);
        }
    }

    #[test]
    fn test_auth_status_error_message() {
        assert_eq!(AuthStatus::Error("boom".into()).error_message(), Some("boom"));
        assert_eq!(AuthStatus::Loading.error_message(), None);
        assert!(AuthStatus::Loading.is_loading());
        assert_eq!(AuthStatus::default(), AuthStatus::Idle);
    }
}
