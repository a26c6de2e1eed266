use std::cmp::Ordering;

use super::{Column, LoadState, ReportError};
use crate::config::{ColumnConfig, GroupConfig};
use crate::dump::GroupDump;
use crate::filter::Filter;
use crate::issues::{GroupBy, GroupKey, Issues};

/// A row of a section: a filtered subset of the section's issues split into columns
#[derive(Debug, Clone)]
pub struct Group {
    title: String,
    filter: Filter,
    columns: Vec<Column>,
    issues: LoadState<Issues>,
}

impl Group {
    pub fn new(config: GroupConfig, columns: &[ColumnConfig]) -> Self {
        Self {
            title: config.title,
            filter: config.filter,
            columns: columns.iter().cloned().map(Column::new).collect(),
            issues: LoadState::Unloaded,
        }
    }

    /// Build one loaded group per partition of `issues`
    ///
    /// Each group is titled after its partition key and holds the partition
    /// as-is, so its filter is the identity.
    pub fn from_group_by(group_by: GroupBy, issues: &Issues, columns: &[ColumnConfig]) -> Vec<Self> {
        issues
            .group_by(group_by)
            .into_iter()
            .map(|(key, partition)| Self::derived(key, &partition, columns))
            .collect()
    }

    /// A group titled after `key` and loaded with its partition
    pub(crate) fn derived(key: GroupKey, partition: &Issues, columns: &[ColumnConfig]) -> Self {
        let mut group = Group::new(GroupConfig::new(key.to_string(), Filter::default()), columns);
        group.load(partition);
        group
    }

    /// Filter the parent and load every column against the result
    pub fn load(&mut self, parent: &Issues) {
        let issues = parent.filter(&self.filter);
        for column in &mut self.columns {
            column.load(&issues);
        }
        self.issues = LoadState::Loaded(issues);
    }

    pub fn title(&self) -> Result<&str, ReportError> {
        self.issues()?;
        Ok(&self.title)
    }

    pub fn issues(&self) -> Result<&Issues, ReportError> {
        self.issues.get("group")
    }

    pub fn total(&self) -> Result<usize, ReportError> {
        Ok(self.issues()?.total())
    }

    pub fn columns(&self) -> Result<&[Column], ReportError> {
        self.issues()?;
        Ok(&self.columns)
    }

    /// Order two groups by total; both must be loaded
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, ReportError> {
        Ok(self.total()?.cmp(&other.total()?))
    }

    pub fn dump(&self) -> Result<GroupDump, ReportError> {
        let columns = self
            .columns()?
            .iter()
            .map(Column::dump)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GroupDump {
            title: self.title()?.to_string(),
            total: self.total()?,
            columns,
        })
    }
}
