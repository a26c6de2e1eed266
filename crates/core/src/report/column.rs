use super::{LoadState, ReportError};
use crate::config::ColumnConfig;
use crate::dump::ColumnDump;
use crate::filter::Filter;
use crate::issues::Issues;

/// Leaf of the report tree: a filtered count inside a group
#[derive(Debug, Clone)]
pub struct Column {
    title: String,
    filter: Filter,
    issues: LoadState<Issues>,
}

impl Column {
    pub fn new(config: ColumnConfig) -> Self {
        Self {
            title: config.title,
            filter: config.filter,
            issues: LoadState::Unloaded,
        }
    }

    /// Filter the group's issues
    pub fn load(&mut self, parent: &Issues) {
        self.issues = LoadState::Loaded(parent.filter(&self.filter));
    }

    pub fn title(&self) -> Result<&str, ReportError> {
        self.issues()?;
        Ok(&self.title)
    }

    pub fn issues(&self) -> Result<&Issues, ReportError> {
        self.issues.get("column")
    }

    pub fn total(&self) -> Result<usize, ReportError> {
        Ok(self.issues()?.total())
    }

    pub fn dump(&self) -> Result<ColumnDump, ReportError> {
        Ok(ColumnDump {
            title: self.title()?.to_string(),
            total: self.total()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldFilter;
    use crate::issue::fixtures::{self, at, closed, now};
    use crate::issue::IssueState;

    fn closed_column() -> Column {
        Column::new(ColumnConfig::new(
            "Closed",
            Filter {
                state: FieldFilter::Exact(IssueState::Closed),
                ..Default::default()
            },
        ))
    }

    #[test]
    fn test_unloaded_column_fails() {
        let column = closed_column();

        assert_eq!(column.total(), Err(ReportError::Unloaded { node: "column" }));
        assert_eq!(column.title(), Err(ReportError::Unloaded { node: "column" }));
        assert!(column.dump().is_err());
    }

    #[test]
    fn test_loaded_column_counts_matches() {
        let parent = Issues::new(
            vec![
                fixtures::issue(),
                closed(fixtures::issue(), at(2024, 6, 5)),
                closed(fixtures::issue(), at(2024, 6, 6)),
            ],
            now(),
        );
        let mut column = closed_column();

        column.load(&parent);

        assert_eq!(
            column.dump(),
            Ok(ColumnDump {
                title: "Closed".to_string(),
                total: 2,
            })
        );
    }

    #[test]
    fn test_column_over_empty_parent_counts_zero() {
        let mut column = closed_column();

        column.load(&Issues::new(vec![], now()));

        assert_eq!(column.title(), Ok("Closed"));
        assert_eq!(column.total(), Ok(0));
    }
}
