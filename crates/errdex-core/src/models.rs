use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured header block of one corpus entry. Unrecognized fields pass
/// through untouched via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_icon: Option<String>,
    #[serde(default)]
    pub solved: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_norway::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub slug: String,
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Derived per-provider rollup. Rebuilt from the full article set, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderAggregate {
    pub key: String,
    pub display_name: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParseFailure {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Two entries resolved to the same slug; the later one wins.
    DuplicateSlug {
        slug: String,
        kept_file: String,
        shadowed_file: String,
    },
    /// Article is excluded from provider aggregation but stays searchable.
    EmptyProvider { slug: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusLoad {
    pub articles: Vec<ArticleRecord>,
    pub failures: Vec<ParseFailure>,
    pub warnings: Vec<DataQualityWarning>,
    pub loaded_at: DateTime<Utc>,
}

impl CorpusLoad {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}
