// Query filtering over a task collection

use crate::models::{Task, TaskPriority, TaskStatus};

/// Filter for listing tasks. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title or description
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let matches_search = match &self.search {
            Some(query) => {
                let query = query.to_lowercase();
                task.title.to_lowercase().contains(&query) || task.description.to_lowercase().contains(&query)
            }
            None => true,
        };
        let matches_status = self.status.is_none_or(|status| task.status == status);
        let matches_priority = self.priority.is_none_or(|priority| task.priority == priority);

        matches_search && matches_status && matches_priority
    }

    /// Matching tasks, keeping their order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.status.is_none() && self.priority.is_none()
    }

    /// Hint shown when a listing comes back empty. Only a status filter
    /// counts as filtering here; search and priority narrow within it.
    pub fn empty_message(&self) -> &'static str {
        if self.status.is_none() {
            "You don't have any tasks yet. Create your first task to get started!"
        } else {
            "No tasks match the current filter. Try changing your filter or create a new task."
        }
    }
}

/// Task counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::now;
    use crate::models::NewTask;

    fn task(id: &str, title: &str, description: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task::from_new(
            NewTask {
                title: title.to_string(),
                description: description.to_string(),
                priority,
                status,
                due_date: None,
            },
            id.to_string(),
            now(),
        )
    }

    fn tasks() -> Vec<Task> {
        vec![
            task("1", "Write Report", "quarterly numbers", TaskStatus::Todo, TaskPriority::High),
            task("2", "Groceries", "milk, eggs", TaskStatus::Completed, TaskPriority::Low),
            task("3", "Review PR", "check the REPORT generator", TaskStatus::InProgress, TaskPriority::High),
        ]
    }

    fn ids(matched: Vec<&Task>) -> Vec<&str> {
        matched.into_iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let tasks = tasks();
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(filter.apply(&tasks)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_description() {
        let tasks = tasks();
        let filter = TaskFilter {
            search: Some("report".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&tasks)), vec!["1", "3"]);
    }

    #[test]
    fn test_status_and_priority_combine() {
        let tasks = tasks();
        let filter = TaskFilter {
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&tasks)), vec!["3"]);

        let filter = TaskFilter {
            search: Some("milk".to_string()),
            priority: Some(TaskPriority::High),
            ..Default::default()
        };
        assert!(filter.apply(&tasks).is_empty());
    }

    #[test]
    fn test_empty_message_follows_status_filter() {
        let no_tasks_yet = TaskFilter::default().empty_message();
        assert!(no_tasks_yet.starts_with("You don't have any tasks yet"));

        let search_only = TaskFilter {
            search: Some("nothing like this".to_string()),
            priority: Some(TaskPriority::Low),
            ..Default::default()
        };
        assert_eq!(search_only.empty_message(), no_tasks_yet);

        let by_status = TaskFilter {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert!(by_status.empty_message().starts_with("No tasks match the current filter"));
    }

    #[test]
    fn test_stats() {
        let stats = TaskStats::from_tasks(&tasks());
        assert_eq!(
            stats,
            TaskStats {
                total: 3,
                todo: 1,
                in_progress: 1,
                completed: 1,
            }
        );
        assert_eq!(TaskStats::from_tasks(&[]), TaskStats::default());
    }
}
