//! Report configuration model
//!
//! Plain deserializable data plus validation. Reading the file is the job of
//! the binary crate; this module only turns text into a checked
//! [`ReportConfig`].

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::filter::Filter;
use crate::issues::GroupBy;

pub const DEFAULT_URL: &str = "https://gitlab.com";
pub const DEFAULT_TITLE: &str = "GitLab Report";
pub const DEFAULT_GROUP_TITLE: &str = "All Issues";

/// Error type for configuration parsing and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("either `private_token` or `oauth_token` must be set")]
    MissingCredentials,

    #[error("`period_from` ({from}) must be before `period_to` ({to})")]
    InvalidPeriod {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Configuration for a column of a group
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnConfig {
    pub title: String,
    #[serde(flatten)]
    pub filter: Filter,
}

impl ColumnConfig {
    pub fn new(title: impl Into<String>, filter: Filter) -> Self {
        Self {
            title: title.into(),
            filter,
        }
    }
}

/// Configuration for an explicit group of a section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupConfig {
    pub title: String,
    #[serde(flatten)]
    pub filter: Filter,
}

impl GroupConfig {
    pub fn new(title: impl Into<String>, filter: Filter) -> Self {
        Self {
            title: title.into(),
            filter,
        }
    }
}

/// How a section derives its groups
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Grouping {
    /// One group per partition of the section's issues
    Key(GroupBy),
    /// Fixed list of groups, each filtering the whole section
    Groups(Vec<GroupConfig>),
}

impl Default for Grouping {
    fn default() -> Self {
        Grouping::Groups(vec![GroupConfig::new(
            DEFAULT_GROUP_TITLE,
            Filter::default(),
        )])
    }
}

/// Configuration for a section of a report
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionConfig {
    pub title: String,
    #[serde(flatten)]
    pub filter: Filter,
    #[serde(default)]
    pub group_by: Grouping,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    /// Maximum number of derived groups; `None` keeps them all
    #[serde(default, deserialize_with = "limit")]
    pub limit: Option<NonZeroUsize>,
}

impl SectionConfig {
    pub fn new(title: impl Into<String>, group_by: Grouping) -> Self {
        Self {
            title: title.into(),
            filter: Filter::default(),
            group_by,
            columns: Vec::new(),
            limit: None,
        }
    }
}

/// Top-level report configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub private_token: Option<String>,
    #[serde(default)]
    pub oauth_token: Option<String>,

    /// Disable TLS certificate verification
    #[serde(default)]
    pub skip_ssl: bool,
    /// Additional PEM root certificate
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "optional_datetime")]
    pub period_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_datetime")]
    pub period_to: Option<DateTime<Utc>>,

    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            private_token: None,
            oauth_token: None,
            skip_ssl: false,
            ca_file: None,
            title: default_title(),
            image: None,
            period_from: None,
            period_to: None,
            sections: Vec::new(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl ReportConfig {
    /// Parse a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a TOML configuration document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Replace connection settings with values given on the command line
    pub fn with_overrides(
        mut self,
        url: Option<String>,
        private_token: Option<String>,
        oauth_token: Option<String>,
    ) -> Self {
        if let Some(url) = url {
            self.url = url;
        }
        if let Some(token) = private_token {
            self.private_token = Some(token);
        }
        if let Some(token) = oauth_token {
            self.oauth_token = Some(token);
        }
        self
    }

    /// Check the configuration before anything is fetched
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.private_token.is_none() && self.oauth_token.is_none() {
            return Err(ConfigError::MissingCredentials);
        }

        if let (Some(from), Some(to)) = (self.period_from, self.period_to) {
            if from > to {
                return Err(ConfigError::InvalidPeriod { from, to });
            }
        }

        Ok(())
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => parse_datetime(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date or datetime: {value}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(usize),
    Keyword(String),
}

/// Accept a positive integer, `null`, or `"unlimited"`
fn limit<'de, D>(deserializer: D) -> Result<Option<NonZeroUsize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LimitRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LimitRepr::Keyword(keyword)) if keyword == "unlimited" => Ok(None),
        Some(LimitRepr::Keyword(keyword)) => Err(D::Error::custom(format!(
            "invalid limit `{keyword}`, expected a positive integer or \"unlimited\""
        ))),
        Some(LimitRepr::Count(count)) => NonZeroUsize::new(count)
            .map(Some)
            .ok_or_else(|| D::Error::custom("limit must be a positive integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldFilter;
    use crate::issue::IssueType;

    const CONFIG: &str = r#"{
        "url": "https://gitlab.example.com",
        "private_token": "glpat-secret",
        "title": "Weekly status",
        "period_from": "2024-01-01",
        "period_to": "2024-03-31T23:59:59Z",
        "sections": [
            {
                "title": "By group",
                "state": "opened",
                "group_by": "group",
                "limit": 5,
                "columns": [
                    {"title": "Total"},
                    {"title": "Incidents", "type": "incident"},
                    {"title": "Unassigned", "assignee": "None"}
                ]
            },
            {
                "title": "By type",
                "group_by": [
                    {"title": "Bugs", "type": "issue"},
                    {"title": "Incidents", "type": "incident"}
                ],
                "limit": "unlimited"
            },
            {
                "title": "Everything"
            }
        ]
    }"#;

    #[test]
    fn test_parse_full_config() {
        // Act
        let config = ReportConfig::from_json(CONFIG).unwrap();

        // Assert
        assert_eq!(config.url, "https://gitlab.example.com");
        assert_eq!(config.title, "Weekly status");
        assert_eq!(config.image, None);
        assert_eq!(
            config.period_from,
            parse_datetime("2024-01-01T00:00:00Z")
        );
        assert_eq!(config.sections.len(), 3);

        let by_group = &config.sections[0];
        assert_eq!(by_group.group_by, Grouping::Key(GroupBy::Group));
        assert_eq!(by_group.limit, NonZeroUsize::new(5));
        assert_eq!(by_group.columns.len(), 3);
        assert!(by_group.columns[0].filter.is_identity());
        assert_eq!(
            by_group.columns[1].filter.issue_type,
            FieldFilter::Exact(IssueType::Incident)
        );
        assert_eq!(by_group.columns[2].filter.assignee, FieldFilter::Empty);

        let by_type = &config.sections[1];
        match &by_type.group_by {
            Grouping::Groups(groups) => {
                let titles: Vec<_> = groups.iter().map(|g| g.title.as_str()).collect();
                assert_eq!(titles, vec!["Bugs", "Incidents"]);
            }
            other => panic!("expected explicit groups, got {other:?}"),
        }
        assert_eq!(by_type.limit, None);
    }

    #[test]
    fn test_section_defaults() {
        let config = ReportConfig::from_json(CONFIG).unwrap();
        let everything = &config.sections[2];

        assert_eq!(everything.group_by, Grouping::default());
        assert!(everything.columns.is_empty());
        assert!(everything.filter.is_identity());
        assert_eq!(everything.limit, None);
    }

    #[test]
    fn test_report_defaults() {
        let config = ReportConfig::from_json(r#"{"oauth_token": "t"}"#).unwrap();

        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.title, DEFAULT_TITLE);
        assert!(config.sections.is_empty());
        assert!(!config.skip_ssl);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
            private_token = "secret"
            title = "Quarterly"

            [[sections]]
            title = "Per label"
            group_by = "label"
            label = ["bug", "security"]

            [[sections.columns]]
            title = "Overdue"
            overdue = true
        "#;

        let config = ReportConfig::from_toml(toml).unwrap();

        let section = &config.sections[0];
        assert_eq!(section.group_by, Grouping::Key(GroupBy::Label));
        assert_eq!(
            section.filter.label,
            FieldFilter::one_of(["bug".to_string(), "security".to_string()])
        );
        assert_eq!(section.columns[0].filter.overdue, Some(true));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = ReportConfig::default();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCredentials)
        ));

        let config = config.with_overrides(None, None, Some("oauth".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_reversed_period() {
        let config = ReportConfig {
            private_token: Some("t".to_string()),
            period_from: parse_datetime("2024-05-01"),
            period_to: parse_datetime("2024-04-01"),
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_invalid_limit_is_rejected() {
        let zero = r#"{"sections": [{"title": "s", "limit": 0}]}"#;
        let word = r#"{"sections": [{"title": "s", "limit": "lots"}]}"#;

        assert!(matches!(
            ReportConfig::from_json(zero),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ReportConfig::from_json(word),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_group_by_is_rejected() {
        let config = r#"{"sections": [{"title": "s", "group_by": "milestone"}]}"#;

        assert!(ReportConfig::from_json(config).is_err());
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2024-02-29").is_some());
        assert!(parse_datetime("2024-02-29T10:00:00+02:00").is_some());
        assert!(parse_datetime("29/02/2024").is_none());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = ReportConfig::from_json(CONFIG)
            .unwrap()
            .with_overrides(Some("https://other".to_string()), None, None);

        assert_eq!(config.url, "https://other");
        assert_eq!(config.private_token.as_deref(), Some("glpat-secret"));
    }
}
