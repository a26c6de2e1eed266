//! Normalized issue records and the entities they reference
//!
//! Records are built once by the provider (see [`crate::gitlab`]) and never
//! mutated afterwards. Collections share them through `Arc`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Type of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Issue,
    Incident,
    TestCase,
    Task,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Issue => "issue",
            IssueType::Incident => "incident",
            IssueType::TestCase => "test_case",
            IssueType::Task => "task",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Opened,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Opened => "opened",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a reference entity whose identity is its numeric id.
///
/// Two values with the same id compare equal even if their names differ.
macro_rules! entity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            pub id: u64,
            pub name: String,
        }

        impl $name {
            pub fn new(id: u64, name: impl Into<String>) -> Self {
                Self {
                    id,
                    name: name.into(),
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.id.cmp(&other.id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name)
            }
        }
    };
}

entity!(
    /// A GitLab user (author or assignee)
    User
);

entity!(
    /// A GitLab group (namespace of kind `group`)
    Group
);

entity!(
    /// A GitLab project
    Project
);

/// A normalized GitLab issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub state: IssueState,

    pub author: User,
    pub assignees: Vec<User>,
    pub labels: Vec<String>,

    /// `None` for projects living in a personal namespace
    pub group: Option<Group>,
    pub project: Project,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
}

impl Issue {
    /// Whether the issue missed its due date.
    ///
    /// Open issues are compared with `now`, issues with a closing date with
    /// the day they were closed. Both comparisons are strict and done on
    /// calendar dates, so an issue due today is not overdue yet.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        let Some(due_date) = self.due_date else {
            return false;
        };

        let late_while_open = self.state == IssueState::Opened && due_date < now.date_naive();
        let closed_late = self
            .closed_at
            .is_some_and(|closed_at| due_date < closed_at.date_naive());

        late_while_open || closed_late
    }

    /// Number of whole days the issue is (or was) late, if it is late at all.
    pub fn delay_days(&self, now: DateTime<Utc>) -> Option<i64> {
        let due_date = self.due_date?;

        let reference = match (self.state, self.closed_at) {
            (IssueState::Closed, Some(closed_at)) => closed_at.date_naive(),
            (IssueState::Closed, None) => return None,
            (IssueState::Opened, _) => now.date_naive(),
        };

        let days = (reference - due_date).num_days();
        (days > 0).then_some(days)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_entities_compare_by_id_only() {
        let a = User::new(7, "Alice");
        let renamed = User::new(7, "Alice Liddell");
        let other = User::new(8, "Alice");

        assert_eq!(a, renamed);
        assert_ne!(a, other);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&renamed));
    }

    #[test]
    fn test_entity_display_uses_name() {
        assert_eq!(Group::new(3, "platform").to_string(), "platform");
        assert_eq!(IssueType::TestCase.to_string(), "test_case");
        assert_eq!(IssueState::Opened.to_string(), "opened");
    }

    #[test]
    fn test_open_issue_past_due_is_overdue() {
        let mut issue = issue();
        issue.due_date = Some(date(2024, 6, 14));

        assert!(issue.is_overdue(now()));
        assert_eq!(issue.delay_days(now()), Some(1));
    }

    #[test]
    fn test_open_issue_due_today_is_not_overdue() {
        let mut issue = issue();
        issue.due_date = Some(now().date_naive());

        assert!(!issue.is_overdue(now()));
        assert_eq!(issue.delay_days(now()), None);
    }

    #[test]
    fn test_closed_issue_compares_with_closing_date() {
        let mut late = issue();
        late.due_date = Some(date(2024, 5, 1));
        let late = closed(late, at(2024, 5, 4));

        let mut on_time = issue();
        on_time.due_date = Some(date(2024, 5, 4));
        let on_time = closed(on_time, at(2024, 5, 4));

        assert!(late.is_overdue(now()));
        assert_eq!(late.delay_days(now()), Some(3));
        assert!(!on_time.is_overdue(now()));
        assert_eq!(on_time.delay_days(now()), None);
    }

    #[test]
    fn test_issue_without_due_date_is_never_late() {
        assert!(!issue().is_overdue(now()));
        assert_eq!(issue().delay_days(now()), None);
    }
}
