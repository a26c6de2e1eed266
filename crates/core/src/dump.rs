//! Export contract of a loaded report
//!
//! A dump is a plain nested structure with no behavior. Every exporter
//! (JSON, Markdown, HTML, PDF) consumes this tree and nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Share of `part` in `whole` as a truncated percentage, 0 when `whole` is 0
pub fn percent(part: usize, whole: usize) -> usize {
    if whole == 0 {
        0
    } else {
        part * 100 / whole
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDump {
    pub title: String,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDump {
    pub title: String,
    pub total: usize,
    pub columns: Vec<ColumnDump>,
}

impl GroupDump {
    /// Percentage of the group's issues matched by each column
    pub fn column_shares(&self) -> impl Iterator<Item = (&ColumnDump, usize)> {
        self.columns
            .iter()
            .map(move |column| (column, percent(column.total, self.total)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDump {
    pub title: String,
    pub total: usize,
    pub groups: Vec<GroupDump>,
}

impl SectionDump {
    /// Percentage of the section's issues falling in each group
    ///
    /// Shares may add up to more than 100 when groups overlap (assignee and
    /// label groupings, explicit groups).
    pub fn group_shares(&self) -> impl Iterator<Item = (&GroupDump, usize)> {
        self.groups
            .iter()
            .map(move |group| (group, percent(group.total, self.total)))
    }

    /// Column titles of the section, taken from its first group
    pub fn column_titles(&self) -> Vec<&str> {
        self.groups
            .first()
            .map(|group| group.columns.iter().map(|c| c.title.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDump {
    pub title: String,
    pub image: Option<String>,
    #[serde(with = "period_date")]
    pub period_from: Option<DateTime<Utc>>,
    #[serde(with = "period_date")]
    pub period_to: Option<DateTime<Utc>>,
    pub sections: Vec<SectionDump>,
}

/// Period bounds are exported as plain `YYYY-MM-DD` dates
mod period_date {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(datetime) => serializer.serialize_str(&datetime.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(value) => crate::config::parse_datetime(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {value}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(title: &str, total: usize, columns: &[(&str, usize)]) -> GroupDump {
        GroupDump {
            title: title.to_string(),
            total,
            columns: columns
                .iter()
                .map(|(title, total)| ColumnDump {
                    title: title.to_string(),
                    total: *total,
                })
                .collect(),
        }
    }

    #[test]
    fn test_percent_truncates_and_handles_zero() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 0), 0);
    }

    #[test]
    fn test_shares() {
        let section = SectionDump {
            title: "s".to_string(),
            total: 4,
            groups: vec![
                group("a", 3, &[("Open", 1), ("Closed", 2)]),
                group("b", 0, &[("Open", 0), ("Closed", 0)]),
            ],
        };

        let groups: Vec<_> = section.group_shares().map(|(g, p)| (g.title.as_str(), p)).collect();
        let columns: Vec<_> = section.groups[0].column_shares().map(|(_, p)| p).collect();
        let empty: Vec<_> = section.groups[1].column_shares().map(|(_, p)| p).collect();

        assert_eq!(groups, vec![("a", 75), ("b", 0)]);
        assert_eq!(columns, vec![33, 66]);
        assert_eq!(empty, vec![0, 0]);
        assert_eq!(section.column_titles(), vec!["Open", "Closed"]);
    }

    #[test]
    fn test_column_titles_of_empty_section() {
        let section = SectionDump {
            title: "s".to_string(),
            total: 0,
            groups: vec![],
        };

        assert!(section.column_titles().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        // Arrange
        let dump = ReportDump {
            title: "Report".to_string(),
            image: None,
            period_from: crate::config::parse_datetime("2024-01-01T10:00:00Z"),
            period_to: None,
            sections: vec![SectionDump {
                title: "s".to_string(),
                total: 2,
                groups: vec![group("g", 2, &[("Total", 2)])],
            }],
        };

        // Act
        let value = serde_json::to_value(&dump).unwrap();

        // Assert
        assert_eq!(
            value,
            serde_json::json!({
                "title": "Report",
                "image": null,
                "period_from": "2024-01-01",
                "period_to": null,
                "sections": [{
                    "title": "s",
                    "total": 2,
                    "groups": [{
                        "title": "g",
                        "total": 2,
                        "columns": [{"title": "Total", "total": 2}]
                    }]
                }]
            })
        );

        let back: ReportDump = serde_json::from_value(value).unwrap();
        assert_eq!(back.period_from, crate::config::parse_datetime("2024-01-01"));
    }
}
