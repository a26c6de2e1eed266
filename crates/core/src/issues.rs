//! In-memory issue collection
//!
//! [`Issues`] wraps a flat list of normalized records and offers the two
//! operations the report tree is built from: [`Issues::filter`] and
//! [`Issues::group_by`]. Both return new collections and never touch the
//! records they were derived from.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::issue::{Group, Issue, IssueState, IssueType, Project, User};

/// Dimension used to partition a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Group,
    Project,
    Author,
    Assignee,
    Label,
    Type,
    State,
}

/// Key of one partition produced by [`Issues::group_by`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Issues without a value for a multi-valued or optional key
    None,
    Group(Group),
    Project(Project),
    User(User),
    Label(String),
    Type(IssueType),
    State(IssueState),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::None => f.write_str("None"),
            GroupKey::Group(group) => write!(f, "{group}"),
            GroupKey::Project(project) => write!(f, "{project}"),
            GroupKey::User(user) => write!(f, "{user}"),
            GroupKey::Label(label) => f.write_str(label),
            GroupKey::Type(issue_type) => f.write_str(issue_type.as_str()),
            GroupKey::State(state) => f.write_str(state.as_str()),
        }
    }
}

/// Keys an issue is filed under for the given dimension.
///
/// Scalar dimensions yield exactly one key. Assignees and labels yield one key
/// per value, or [`GroupKey::None`] when the issue has none.
fn keys_of(group_by: GroupBy, issue: &Issue) -> Vec<GroupKey> {
    match group_by {
        GroupBy::Group => vec![issue
            .group
            .clone()
            .map_or(GroupKey::None, GroupKey::Group)],
        GroupBy::Project => vec![GroupKey::Project(issue.project.clone())],
        GroupBy::Author => vec![GroupKey::User(issue.author.clone())],
        GroupBy::Assignee if issue.assignees.is_empty() => vec![GroupKey::None],
        GroupBy::Assignee => issue.assignees.iter().cloned().map(GroupKey::User).collect(),
        GroupBy::Label if issue.labels.is_empty() => vec![GroupKey::None],
        GroupBy::Label => issue.labels.iter().cloned().map(GroupKey::Label).collect(),
        GroupBy::Type => vec![GroupKey::Type(issue.issue_type)],
        GroupBy::State => vec![GroupKey::State(issue.state)],
    }
}

type Pass = fn(&Filter, &Issue, DateTime<Utc>) -> bool;

/// Narrowing passes applied by [`Issues::filter`], in order
const PASSES: [Pass; 8] = [
    by_type,
    by_state,
    by_author,
    by_assignee,
    by_label,
    by_group,
    by_project,
    by_overdue,
];

fn by_type(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter.issue_type.matches(&issue.issue_type)
}

fn by_state(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter.state.matches(&issue.state)
}

fn by_author(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter.author.matches(&issue.author.id)
}

fn by_assignee(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter
        .assignee
        .matches_any_of(issue.assignees.iter().map(|assignee| &assignee.id))
}

fn by_label(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter.label.matches_any_of(&issue.labels)
}

fn by_group(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter
        .group
        .matches_optional(issue.group.as_ref().map(|group| &group.id))
}

fn by_project(filter: &Filter, issue: &Issue, _: DateTime<Utc>) -> bool {
    filter.project.matches(&issue.project.id)
}

fn by_overdue(filter: &Filter, issue: &Issue, now: DateTime<Utc>) -> bool {
    filter
        .overdue
        .map_or(true, |overdue| issue.is_overdue(now) == overdue)
}

/// Collection of issues evaluated against a fixed reference instant
///
/// The instant is used by the `overdue` filter and is inherited by every
/// collection derived from this one, so a whole report is computed against
/// the same "now".
#[derive(Debug, Clone)]
pub struct Issues {
    issues: Vec<Arc<Issue>>,
    now: DateTime<Utc>,
}

impl Issues {
    pub fn new(issues: Vec<Issue>, now: DateTime<Utc>) -> Self {
        Self {
            issues: issues.into_iter().map(Arc::new).collect(),
            now,
        }
    }

    fn derive(&self, issues: Vec<Arc<Issue>>) -> Self {
        Self {
            issues,
            now: self.now,
        }
    }

    /// Reference instant of the collection
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Count the number of issues
    pub fn total(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().map(Arc::as_ref)
    }

    /// Keep the issues matching every field of `filter`
    pub fn filter(&self, filter: &Filter) -> Issues {
        let mut issues = self.issues.clone();
        if !filter.is_identity() {
            for pass in PASSES {
                issues.retain(|issue| pass(filter, issue, self.now));
            }
        }
        self.derive(issues)
    }

    /// Partition the issues by the given dimension
    ///
    /// Partitions are returned in order of first encounter. For assignees and
    /// labels an issue is copied into one partition per value, so partitions
    /// may overlap.
    pub fn group_by(&self, group_by: GroupBy) -> Vec<(GroupKey, Issues)> {
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut partitions: Vec<(GroupKey, Vec<Arc<Issue>>)> = Vec::new();

        for issue in &self.issues {
            for key in keys_of(group_by, issue) {
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    partitions.push((key, Vec::new()));
                    partitions.len() - 1
                });
                partitions[slot].1.push(Arc::clone(issue));
            }
        }

        partitions
            .into_iter()
            .map(|(key, issues)| (key, self.derive(issues)))
            .collect()
    }
}
