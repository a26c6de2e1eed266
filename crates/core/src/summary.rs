//! Per-group and per-project issue summaries
//!
//! Used by the group-driven workflow, which walks the group → project
//! hierarchy instead of a configured report.

use serde::Serialize;

use crate::filter::{FieldFilter, Filter};
use crate::issue::{Group, IssueState, IssueType, Project};
use crate::issues::Issues;

/// A group together with the projects it contains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub group: Group,
    pub projects: Vec<Project>,
}

/// Figures shared by project and group summaries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figures {
    pub issues: usize,
    pub incidents: usize,
    pub closed_issues: usize,
    pub closed_incidents: usize,
    /// Mean delay in days over late issues, 0 when none is late
    pub avg_delay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub figures: Figures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub figures: Figures,
    pub projects: Vec<ProjectSummary>,
}

/// Running totals; delays are kept as a sum so groups average over issues, not projects
#[derive(Default)]
struct Tally {
    issues: usize,
    incidents: usize,
    closed_issues: usize,
    closed_incidents: usize,
    delay_sum: i64,
    late: usize,
}

impl Tally {
    fn of(issues: &Issues) -> Self {
        let incidents = Filter {
            issue_type: FieldFilter::Exact(IssueType::Incident),
            ..Default::default()
        };
        let closed = Filter {
            state: FieldFilter::Exact(IssueState::Closed),
            ..Default::default()
        };
        let delays: Vec<i64> = issues
            .iter()
            .filter_map(|issue| issue.delay_days(issues.now()))
            .collect();

        Self {
            issues: issues.total(),
            incidents: issues.filter(&incidents).total(),
            closed_issues: issues.filter(&closed).total(),
            closed_incidents: issues.filter(&closed).filter(&incidents).total(),
            delay_sum: delays.iter().sum(),
            late: delays.len(),
        }
    }

    fn add(&mut self, other: &Tally) {
        self.issues += other.issues;
        self.incidents += other.incidents;
        self.closed_issues += other.closed_issues;
        self.closed_incidents += other.closed_incidents;
        self.delay_sum += other.delay_sum;
        self.late += other.late;
    }

    fn figures(&self) -> Figures {
        let avg_delay = if self.late == 0 {
            0.0
        } else {
            self.delay_sum as f64 / self.late as f64
        };
        Figures {
            issues: self.issues,
            incidents: self.incidents,
            closed_issues: self.closed_issues,
            closed_incidents: self.closed_incidents,
            avg_delay,
        }
    }
}

/// Summarize every group of the hierarchy against a flat issue collection
pub fn summarize_hierarchy(nodes: &[GroupNode], issues: &Issues) -> Vec<GroupSummary> {
    nodes
        .iter()
        .map(|node| {
            let mut group_tally = Tally::default();
            let projects = node
                .projects
                .iter()
                .map(|project| {
                    let scoped = issues.filter(&Filter {
                        project: FieldFilter::Exact(project.id),
                        ..Default::default()
                    });
                    let tally = Tally::of(&scoped);
                    group_tally.add(&tally);
                    ProjectSummary {
                        id: project.id,
                        name: project.name.clone(),
                        figures: tally.figures(),
                    }
                })
                .collect();

            GroupSummary {
                id: node.group.id,
                name: node.group.name.clone(),
                figures: group_tally.figures(),
                projects,
            }
        })
        .collect()
}
