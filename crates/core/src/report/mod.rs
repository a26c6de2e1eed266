//! Hierarchical report tree: Report → Section → Group → Column
//!
//! Nodes are built cheaply from configuration and computed by `load()`
//! against a parent [`Issues`] collection. Reading a node before it has been
//! loaded fails with [`ReportError::Unloaded`]. Calling `load()` again
//! recomputes the node from the new parent.

mod column;
mod group;
mod section;

pub use column::Column;
pub use group::Group;
pub use section::Section;

use chrono::{DateTime, Utc};

use crate::config::ReportConfig;
use crate::dump::ReportDump;
use crate::issues::Issues;

/// Error type for report tree access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("{node} data has not been loaded")]
    Unloaded { node: &'static str },
}

/// Lifecycle of a report node
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Unloaded,
    Loaded(T),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Unloaded
    }
}

impl<T> LoadState<T> {
    /// Borrow the loaded value, or fail naming the node kind
    pub fn get(&self, node: &'static str) -> Result<&T, ReportError> {
        match self {
            LoadState::Loaded(value) => Ok(value),
            LoadState::Unloaded => Err(ReportError::Unloaded { node }),
        }
    }
}

/// Root of the report tree
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    image: Option<String>,
    period_from: Option<DateTime<Utc>>,
    period_to: Option<DateTime<Utc>>,
    sections: Vec<Section>,
    issues: LoadState<Issues>,
}

impl Report {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            image: config.image.clone(),
            period_from: config.period_from,
            period_to: config.period_to,
            sections: config.sections.iter().cloned().map(Section::new).collect(),
            issues: LoadState::Unloaded,
        }
    }

    /// Compute every section against the full issue collection
    pub fn load(&mut self, issues: &Issues) {
        for section in &mut self.sections {
            section.load(issues);
        }
        self.issues = LoadState::Loaded(issues.clone());
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of issues the report was computed from
    pub fn total(&self) -> Result<usize, ReportError> {
        Ok(self.issues.get("report")?.total())
    }

    pub fn sections(&self) -> Result<&[Section], ReportError> {
        self.issues.get("report")?;
        Ok(&self.sections)
    }

    pub fn dump(&self) -> Result<ReportDump, ReportError> {
        let sections = self
            .sections()?
            .iter()
            .map(Section::dump)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReportDump {
            title: self.title.clone(),
            image: self.image.clone(),
            period_from: self.period_from,
            period_to: self.period_to,
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnConfig, GroupConfig, Grouping, SectionConfig};
    use crate::dump::{ColumnDump, GroupDump, SectionDump};
    use crate::filter::{FieldFilter, Filter};
    use crate::issue::fixtures::{self, at, closed, now};
    use crate::issue::{Group as GitLabGroup, Issue, IssueState, IssueType, User};
    use crate::issues::GroupBy;

    fn in_group(mut issue: Issue, id: u64, name: &str) -> Issue {
        issue.group = Some(GitLabGroup::new(id, name));
        issue
    }

    /// Two issues in G1 (one closed), three opened issues in G2 (one assigned)
    fn scenario() -> Issues {
        let mut assigned = in_group(fixtures::issue(), 2, "G2");
        assigned.assignees = vec![User::new(5, "dave")];

        Issues::new(
            vec![
                in_group(fixtures::issue(), 1, "G1"),
                closed(in_group(fixtures::issue(), 1, "G1"), at(2024, 6, 3)),
                in_group(fixtures::issue(), 2, "G2"),
                assigned,
                in_group(fixtures::issue(), 2, "G2"),
            ],
            now(),
        )
    }

    fn total_column() -> ColumnConfig {
        ColumnConfig::new("Total", Filter::default())
    }

    #[test]
    fn test_report_reads_fail_before_load() {
        let report = Report::new(&ReportConfig::default());

        assert_eq!(
            report.dump(),
            Err(ReportError::Unloaded { node: "report" })
        );
        assert!(report.total().is_err());
        assert_eq!(report.title(), "GitLab Report");
    }

    #[test]
    fn test_end_to_end_group_by_group() {
        // Arrange
        let mut section = SectionConfig::new("Per group", Grouping::Key(GroupBy::Group));
        section.columns = vec![total_column()];
        let config = ReportConfig {
            title: "Status".to_string(),
            sections: vec![section],
            ..Default::default()
        };
        let mut report = Report::new(&config);

        // Act
        report.load(&scenario());
        let dump = report.dump().unwrap();

        // Assert
        assert_eq!(report.total(), Ok(5));
        assert_eq!(
            dump.sections,
            vec![SectionDump {
                title: "Per group".to_string(),
                total: 5,
                groups: vec![
                    GroupDump {
                        title: "G2".to_string(),
                        total: 3,
                        columns: vec![ColumnDump {
                            title: "Total".to_string(),
                            total: 3,
                        }],
                    },
                    GroupDump {
                        title: "G1".to_string(),
                        total: 2,
                        columns: vec![ColumnDump {
                            title: "Total".to_string(),
                            total: 2,
                        }],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_every_section_sees_full_collection() {
        // Arrange: the first section's filter must not narrow the second one
        let mut opened = SectionConfig::new("Opened", Grouping::default());
        opened.filter.state = FieldFilter::Exact(IssueState::Opened);
        let everything = SectionConfig::new("Everything", Grouping::default());
        let config = ReportConfig {
            sections: vec![opened, everything],
            ..Default::default()
        };
        let mut report = Report::new(&config);

        // Act
        report.load(&scenario());

        // Assert
        let totals: Vec<usize> = report
            .sections()
            .unwrap()
            .iter()
            .map(|s| s.total().unwrap())
            .collect();
        assert_eq!(totals, vec![4, 5]);
    }

    #[test]
    fn test_dump_carries_metadata() {
        let config = ReportConfig {
            title: "Quarterly".to_string(),
            image: Some("logo.png".to_string()),
            period_from: crate::config::parse_datetime("2024-01-01"),
            sections: vec![SectionConfig::new(
                "Incidents",
                Grouping::Groups(vec![GroupConfig::new(
                    "All incidents",
                    Filter {
                        issue_type: FieldFilter::Exact(IssueType::Incident),
                        ..Default::default()
                    },
                )]),
            )],
            ..Default::default()
        };
        let mut report = Report::new(&config);
        report.load(&scenario());

        let dump = report.dump().unwrap();

        assert_eq!(dump.title, "Quarterly");
        assert_eq!(dump.image.as_deref(), Some("logo.png"));
        assert_eq!(dump.period_from, config.period_from);
        assert_eq!(dump.period_to, None);
        assert_eq!(dump.sections[0].groups[0].total, 0);
        assert!(dump.sections[0].groups[0].columns.is_empty());
    }

    #[test]
    fn test_reload_recomputes() {
        let config = ReportConfig {
            sections: vec![SectionConfig::new("All", Grouping::default())],
            ..Default::default()
        };
        let mut report = Report::new(&config);

        report.load(&scenario());
        report.load(&Issues::new(vec![fixtures::issue()], now()));

        assert_eq!(report.total(), Ok(1));
        assert_eq!(report.dump().unwrap().sections[0].total, 1);
    }
}
