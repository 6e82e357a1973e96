use std::fmt;
use std::str::FromStr;

use super::error::DomainError;
use super::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub const CYCLE: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(TaskStatus::Todo),
        StatusFilter::Only(TaskStatus::InProgress),
        StatusFilter::Only(TaskStatus::Completed),
    ];

    pub fn cycle(self) -> Self {
        let position = Self::CYCLE.iter().position(|f| *f == self).unwrap_or(0);
        Self::CYCLE[(position + 1) % Self::CYCLE.len()]
    }

    /// Value for the `status` query parameter; `All` is never sent.
    pub fn as_query_value(self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status.as_str()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn accepts(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Search text plus status selection applied to the in-memory task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub search_query: String,
    pub status: StatusFilter,
}

impl TaskFilter {
    pub fn new(search_query: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search_query: search_query.into(),
            status,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.accepts(task.status) {
            return false;
        }

        let query = self.search_query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        task.title.to_lowercase().contains(&query)
            || task
                .description
                .as_ref()
                .is_some_and(|desc| desc.to_lowercase().contains(&query))
    }

    /// Visible subset of `tasks`, in their existing order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|task| self.matches(task)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, title: &str, description: Option<&str>, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: title.to_string(),
            description: description.map(str::to_string),
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", "Buy milk", None, TaskStatus::Todo),
            task("2", "Write report", None, TaskStatus::Completed),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_all_with_empty_search_returns_everything() {
        let tasks = sample();
        let visible = TaskFilter::default().apply(&tasks);
        assert_eq!(visible, tasks);
    }

    #[test]
    fn test_status_filter_keeps_only_matching() {
        let filter = TaskFilter::new("", StatusFilter::Only(TaskStatus::Completed));
        assert_eq!(ids(&filter.apply(&sample())), vec!["2"]);
    }

    #[test]
    fn test_search_matches_title_case_insensitively() {
        let filter = TaskFilter::new("milk", StatusFilter::All);
        assert_eq!(ids(&filter.apply(&sample())), vec!["1"]);

        let filter = TaskFilter::new("  MILK ", StatusFilter::All);
        assert_eq!(ids(&filter.apply(&sample())), vec!["1"]);
    }

    #[test]
    fn test_search_matches_description() {
        let tasks = vec![
            task("1", "Groceries", Some("Oat milk and bread"), TaskStatus::Todo),
            task("2", "Report", None, TaskStatus::Todo),
        ];
        let filter = TaskFilter::new("bread", StatusFilter::All);
        assert_eq!(ids(&filter.apply(&tasks)), vec!["1"]);
    }

    #[test]
    fn test_search_and_status_combine() {
        let tasks = vec![
            task("1", "Fix login", None, TaskStatus::Todo),
            task("2", "Fix logout", None, TaskStatus::InProgress),
            task("3", "Fix signup", None, TaskStatus::InProgress),
            task("4", "Docs", None, TaskStatus::InProgress),
        ];
        let filter = TaskFilter::new("fix", StatusFilter::Only(TaskStatus::InProgress));
        assert_eq!(ids(&filter.apply(&tasks)), vec!["2", "3"]);
    }

    #[test]
    fn test_filtered_output_honours_both_predicates() {
        let tasks: Vec<Task> = (0..30)
            .map(|i| {
                let title = if i % 2 == 0 { format!("Alpha {i}") } else { format!("Beta {i}") };
                task(&i.to_string(), &title, None, TaskStatus::ALL[i % 3])
            })
            .collect();

        for status in StatusFilter::CYCLE {
            let filter = TaskFilter::new("alpha", status);
            for t in filter.apply(&tasks) {
                assert!(status.accepts(t.status));
                assert!(t.title.to_lowercase().contains("alpha"));
            }
        }
    }

    #[test]
    fn test_concrete_filter_skips_unrecognized_status() {
        let tasks = vec![task("1", "odd", None, TaskStatus::Unrecognized)];
        let filter = TaskFilter::new("", StatusFilter::Only(TaskStatus::Todo));
        assert!(filter.apply(&tasks).is_empty());
        assert_eq!(TaskFilter::default().apply(&tasks).len(), 1);
    }

    #[test]
    fn test_status_filter_parse_and_cycle() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "in-progress".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(TaskStatus::InProgress)
        );
        assert!("done".parse::<StatusFilter>().is_err());

        let mut filter = StatusFilter::All;
        for _ in 0..StatusFilter::CYCLE.len() {
            filter = filter.cycle();
        }
        assert_eq!(filter, StatusFilter::All);
        assert_eq!(StatusFilter::All.as_query_value(), None);
        assert_eq!(
            StatusFilter::Only(TaskStatus::Completed).as_query_value(),
            Some("completed")
        );
    }
}
