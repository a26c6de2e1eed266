use std::cmp::Reverse;
use std::num::NonZeroUsize;

use super::{Group, LoadState, ReportError};
use crate::config::{ColumnConfig, Grouping, SectionConfig};
use crate::dump::SectionDump;
use crate::filter::Filter;
use crate::issues::Issues;

/// Top-level node of a report
#[derive(Debug, Clone)]
pub struct Section {
    title: String,
    filter: Filter,
    grouping: Grouping,
    columns: Vec<ColumnConfig>,
    limit: Option<NonZeroUsize>,
    groups: Vec<Group>,
    issues: LoadState<Issues>,
}

impl Section {
    pub fn new(config: SectionConfig) -> Self {
        Self {
            title: config.title,
            filter: config.filter,
            grouping: config.group_by,
            columns: config.columns,
            limit: config.limit,
            groups: Vec::new(),
            issues: LoadState::Unloaded,
        }
    }

    /// Scope the parent by the section filter and build the groups
    ///
    /// Derived groups are sorted by descending total (ties keep partition
    /// order) and cut to the section limit. Explicit groups keep their
    /// configured order and all load against the same scoped collection.
    pub fn load(&mut self, parent: &Issues) {
        let issues = parent.filter(&self.filter);

        self.groups = match &self.grouping {
            Grouping::Key(group_by) => {
                let mut ranked: Vec<(usize, Group)> = issues
                    .group_by(*group_by)
                    .into_iter()
                    .map(|(key, partition)| {
                        let total = partition.total();
                        (total, Group::derived(key, &partition, &self.columns))
                    })
                    .collect();
                ranked.sort_by_key(|(total, _)| Reverse(*total));
                if let Some(limit) = self.limit {
                    ranked.truncate(limit.get());
                }
                ranked.into_iter().map(|(_, group)| group).collect()
            }
            Grouping::Groups(configs) => configs
                .iter()
                .cloned()
                .map(|config| {
                    let mut group = Group::new(config, &self.columns);
                    group.load(&issues);
                    group
                })
                .collect(),
        };
        self.issues = LoadState::Loaded(issues);
    }

    pub fn title(&self) -> Result<&str, ReportError> {
        self.issues()?;
        Ok(&self.title)
    }

    pub fn issues(&self) -> Result<&Issues, ReportError> {
        self.issues.get("section")
    }

    pub fn total(&self) -> Result<usize, ReportError> {
        Ok(self.issues()?.total())
    }

    pub fn groups(&self) -> Result<&[Group], ReportError> {
        self.issues()?;
        Ok(&self.groups)
    }

    pub fn dump(&self) -> Result<SectionDump, ReportError> {
        let groups = self
            .groups()?
            .iter()
            .map(Group::dump)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SectionDump {
            title: self.title()?.to_string(),
            total: self.total()?,
            groups,
        })
    }
}
