//! Declarative issue filters
//!
//! A [`Filter`] is plain data: one optional constraint per issue field. It is
//! interpreted by [`Issues::filter`](crate::issues::Issues::filter), which
//! applies the fields as independent narrowing passes.

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::issue::{IssueState, IssueType};

/// Constraint on a single issue field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter<V: Ord> {
    /// No constraint
    Absent,
    /// The field equals (or, for multi-valued fields, contains) the value
    Exact(V),
    /// The field equals (or contains) at least one of the values
    OneOf(BTreeSet<V>),
    /// The field has a value (`"Any"` in configuration files)
    Any,
    /// The field has no value (`"None"` in configuration files)
    Empty,
}

impl<V: Ord> Default for FieldFilter<V> {
    fn default() -> Self {
        FieldFilter::Absent
    }
}

impl<V: Ord> FieldFilter<V> {
    pub fn one_of(values: impl IntoIterator<Item = V>) -> Self {
        let values: BTreeSet<V> = values.into_iter().collect();
        if values.is_empty() {
            FieldFilter::Absent
        } else {
            FieldFilter::OneOf(values)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldFilter::Absent)
    }

    /// Match a field that always holds exactly one value
    pub fn matches(&self, value: &V) -> bool {
        match self {
            FieldFilter::Absent | FieldFilter::Any => true,
            FieldFilter::Exact(expected) => value == expected,
            FieldFilter::OneOf(expected) => expected.contains(value),
            FieldFilter::Empty => false,
        }
    }

    /// Match a field that may be missing
    pub fn matches_optional(&self, value: Option<&V>) -> bool {
        match self {
            FieldFilter::Absent => true,
            FieldFilter::Exact(expected) => value == Some(expected),
            FieldFilter::OneOf(expected) => value.is_some_and(|v| expected.contains(v)),
            FieldFilter::Any => value.is_some(),
            FieldFilter::Empty => value.is_none(),
        }
    }

    /// Match a multi-valued field
    pub fn matches_any_of<'a>(&self, values: impl IntoIterator<Item = &'a V>) -> bool
    where
        V: 'a,
    {
        let mut values = values.into_iter().peekable();
        match self {
            FieldFilter::Absent => true,
            FieldFilter::Exact(expected) => values.any(|v| v == expected),
            FieldFilter::OneOf(expected) => values.any(|v| expected.contains(v)),
            FieldFilter::Any => values.peek().is_some(),
            FieldFilter::Empty => values.peek().is_none(),
        }
    }
}

#[derive(Deserialize)]
enum Keyword {
    Any,
    None,
}

/// Accepted spellings of a field constraint in configuration files
#[derive(Deserialize)]
#[serde(untagged)]
enum Repr<V> {
    Keyword(Keyword),
    One(V),
    Many(Vec<V>),
}

impl<V: Ord> From<Repr<V>> for FieldFilter<V> {
    fn from(repr: Repr<V>) -> Self {
        match repr {
            Repr::Keyword(Keyword::Any) => FieldFilter::Any,
            Repr::Keyword(Keyword::None) => FieldFilter::Empty,
            Repr::One(value) => FieldFilter::Exact(value),
            // An empty list puts no constraint on the field.
            Repr::Many(values) => FieldFilter::one_of(values),
        }
    }
}

impl<'de, V> Deserialize<'de> for FieldFilter<V>
where
    V: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Repr::<V>::deserialize(deserializer)?.into())
    }
}

/// Deserialize a field that does not accept the `Any` / `None` keywords
fn without_keywords<'de, D, V>(deserializer: D) -> Result<FieldFilter<V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Ord,
{
    match Repr::<V>::deserialize(deserializer)? {
        Repr::Keyword(_) => Err(D::Error::custom(
            "the `Any` and `None` keywords are only supported for assignee, label and group",
        )),
        repr => Ok(repr.into()),
    }
}

/// Filter over issue fields; every set field must match (AND semantics)
///
/// Entities are matched by id: `author`, `assignee`, `group` and `project`
/// take user, group and project ids.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Filter {
    #[serde(rename = "type", deserialize_with = "without_keywords")]
    pub issue_type: FieldFilter<IssueType>,
    #[serde(deserialize_with = "without_keywords")]
    pub state: FieldFilter<IssueState>,

    #[serde(deserialize_with = "without_keywords")]
    pub author: FieldFilter<u64>,
    pub assignee: FieldFilter<u64>,
    pub label: FieldFilter<String>,

    pub group: FieldFilter<u64>,
    #[serde(deserialize_with = "without_keywords")]
    pub project: FieldFilter<u64>,

    pub overdue: Option<bool>,
}

impl Filter {
    /// Whether the filter matches every issue
    pub fn is_identity(&self) -> bool {
        self.issue_type.is_absent()
            && self.state.is_absent()
            && self.author.is_absent()
            && self.assignee.is_absent()
            && self.label.is_absent()
            && self.group.is_absent()
            && self.project.is_absent()
            && self.overdue.is_none()
    }
}
