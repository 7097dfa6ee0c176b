//! Activation conditions and condition matching.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The requested condition that selects every plugin.
pub const WILDCARD: &str = "*";

/// When a plugin is eligible to run.
///
/// An empty tag or an empty list is the same as no condition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<RawCondition>", into = "Option<RawCondition>")]
pub enum Condition {
    /// No condition set; only the default query selects the plugin.
    #[default]
    None,
    /// A single tag.
    Single(String),
    /// Any of several tags.
    Many(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCondition {
    One(String),
    Many(Vec<String>),
}

impl From<Option<RawCondition>> for Condition {
    fn from(raw: Option<RawCondition>) -> Self {
        match raw {
            None => Self::None,
            Some(RawCondition::One(tag)) => Self::single(tag),
            Some(RawCondition::Many(tags)) => Self::many(tags),
        }
    }
}

impl From<Condition> for Option<RawCondition> {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::None => None,
            Condition::Single(tag) => Some(RawCondition::One(tag)),
            Condition::Many(tags) => Some(RawCondition::Many(tags)),
        }
    }
}

impl Condition {
    /// A single-tag condition.
    pub fn single(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag.is_empty() {
            Self::None
        } else {
            Self::Single(tag)
        }
    }

    /// A multi-tag condition.
    pub fn many<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            Self::None
        } else {
            Self::Many(tags)
        }
    }

    /// Whether no condition is set.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether this condition names `tag`.
    pub fn matches(&self, tag: &str, mode: MatchMode) -> bool {
        match (self, mode) {
            (Self::None, _) => false,
            (Self::Single(own), MatchMode::Exact) => own == tag,
            (Self::Single(own), MatchMode::Substring) => own.contains(tag),
            (Self::Many(own), MatchMode::Exact) => own.iter().any(|c| c == tag),
            (Self::Many(own), MatchMode::Substring) => own.iter().any(|c| c.contains(tag)),
        }
    }
}

impl From<&str> for Condition {
    fn from(tag: &str) -> Self {
        Self::single(tag)
    }
}

impl From<String> for Condition {
    fn from(tag: String) -> Self {
        Self::single(tag)
    }
}

impl From<Vec<&str>> for Condition {
    fn from(tags: Vec<&str>) -> Self {
        Self::many(tags)
    }
}

impl From<Vec<String>> for Condition {
    fn from(tags: Vec<String>) -> Self {
        Self::many(tags)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "-"),
            Self::Single(tag) => write!(f, "{tag}"),
            Self::Many(tags) => write!(f, "{}", tags.join(", ")),
        }
    }
}

/// How a requested tag is compared with a plugin's condition tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Tags must be equal.
    #[default]
    Exact,
    /// A plugin tag matches when it contains the requested tag
    /// (`happy_days` matches a request for `happy`).
    Substring,
}

/// Which plugins a caller asks for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConditionQuery {
    /// No condition given: only plugins without a condition.
    #[default]
    Default,
    /// The wildcard: every plugin.
    Any,
    /// Plugins whose condition names this tag.
    Named(String),
}

impl ConditionQuery {
    /// Query for a tag; the wildcard tag becomes [`ConditionQuery::Any`].
    pub fn named(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag == WILDCARD {
            Self::Any
        } else {
            Self::Named(tag)
        }
    }

    /// Whether a plugin with `condition` is selected.
    pub fn selects(&self, condition: &Condition, mode: MatchMode) -> bool {
        match self {
            Self::Any => true,
            Self::Default => condition.is_unset(),
            Self::Named(tag) => condition.matches(tag, mode),
        }
    }
}

impl From<&str> for ConditionQuery {
    fn from(tag: &str) -> Self {
        Self::named(tag)
    }
}

impl From<String> for ConditionQuery {
    fn from(tag: String) -> Self {
        Self::named(tag)
    }
}

impl From<Option<&str>> for ConditionQuery {
    fn from(tag: Option<&str>) -> Self {
        tag.map_or(Self::Default, Self::named)
    }
}

impl From<Option<String>> for ConditionQuery {
    fn from(tag: Option<String>) -> Self {
        tag.map_or(Self::Default, Self::named)
    }
}
