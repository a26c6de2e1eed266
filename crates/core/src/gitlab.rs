//! Transformation functions for GitLab REST v4 responses

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::{Group, Issue, IssueState, IssueType, Project, User};
use crate::summary::GroupNode;

/// User reference embedded in issue responses
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Issue returned by `GET /issues`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabIssue {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    #[serde(default)]
    pub title: String,
    pub issue_type: String,
    pub state: String,
    pub author: GitLabUser,
    #[serde(default)]
    pub assignees: Vec<GitLabUser>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Namespace a project lives in; `kind` is `"group"` or `"user"`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabNamespace {
    pub id: u64,
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub full_path: Option<String>,
}

/// Project returned by `GET /projects/:id` and `GET /groups/:id/projects`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabProject {
    pub id: u64,
    pub name: String,
    pub namespace: GitLabNamespace,
}

/// Group returned by `GET /groups`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Error type for payloads that cannot become an [`Issue`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("issue {issue}: unsupported issue type `{value}`")]
    UnknownIssueType { issue: u64, value: String },

    #[error("issue {issue}: unsupported state `{value}`")]
    UnknownState { issue: u64, value: String },

    #[error("issue {issue}: project {project} was not resolved")]
    MissingProject { issue: u64, project: u64 },
}

fn parse_issue_type(value: &str) -> Option<IssueType> {
    match value {
        "issue" => Some(IssueType::Issue),
        "incident" => Some(IssueType::Incident),
        "test_case" => Some(IssueType::TestCase),
        "task" => Some(IssueType::Task),
        _ => None,
    }
}

fn parse_state(value: &str) -> Option<IssueState> {
    match value {
        "opened" => Some(IssueState::Opened),
        "closed" => Some(IssueState::Closed),
        _ => None,
    }
}

fn user(raw: GitLabUser) -> User {
    User::new(raw.id, raw.username)
}

/// Labels form a set; keep the first occurrence of each
fn distinct_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

/// Project and (for group namespaces) group of an issue
pub fn project_location(project: &GitLabProject) -> (Project, Option<Group>) {
    let group = (project.namespace.kind == "group")
        .then(|| Group::new(project.namespace.id, project.namespace.name.clone()));
    (Project::new(project.id, project.name.clone()), group)
}

/// Convert an API issue into a normalized record
pub fn normalize_issue(raw: GitLabIssue, project: &GitLabProject) -> Result<Issue, NormalizeError> {
    let issue_type =
        parse_issue_type(&raw.issue_type).ok_or_else(|| NormalizeError::UnknownIssueType {
            issue: raw.id,
            value: raw.issue_type.clone(),
        })?;
    let state = parse_state(&raw.state).ok_or_else(|| NormalizeError::UnknownState {
        issue: raw.id,
        value: raw.state.clone(),
    })?;
    let (project, group) = project_location(project);

    Ok(Issue {
        issue_type,
        state,
        author: user(raw.author),
        assignees: raw.assignees.into_iter().map(user).collect(),
        labels: distinct_labels(raw.labels),
        group,
        project,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        closed_at: raw.closed_at,
        due_date: raw.due_date,
    })
}

/// Normalize a batch of issues against the projects they reference
///
/// Issues that fail to normalize are returned separately so the caller can
/// report them; they never abort the batch.
pub fn normalize_issues(
    raw: Vec<GitLabIssue>,
    projects: &HashMap<u64, GitLabProject>,
) -> (Vec<Issue>, Vec<NormalizeError>) {
    let mut issues = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for issue in raw {
        let result = match projects.get(&issue.project_id) {
            Some(project) => normalize_issue(issue, project),
            None => Err(NormalizeError::MissingProject {
                issue: issue.id,
                project: issue.project_id,
            }),
        };
        match result {
            Ok(issue) => issues.push(issue),
            Err(e) => rejected.push(e),
        }
    }

    (issues, rejected)
}

/// Distinct project ids referenced by a batch, in first-seen order
pub fn referenced_projects(raw: &[GitLabIssue]) -> Vec<u64> {
    let mut ids: Vec<u64> = Vec::new();
    for issue in raw {
        if !ids.contains(&issue.project_id) {
            ids.push(issue.project_id);
        }
    }
    ids
}

/// Build a hierarchy node from a group and its projects
pub fn group_node(group: GitLabGroup, projects: Vec<GitLabProject>) -> GroupNode {
    let name = group.full_name.unwrap_or(group.name);
    GroupNode {
        group: Group::new(group.id, name),
        projects: projects
            .into_iter()
            .map(|project| Project::new(project.id, project.name))
            .collect(),
    }
}
