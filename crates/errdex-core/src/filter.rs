use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::ArticleRecord;
use crate::score::relevance;

pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.1;
pub const DEFAULT_TITLE_WEIGHT: f32 = 0.8;
pub const DEFAULT_PROVIDER_WEIGHT: f32 = 0.2;

const ENV_SCORE_THRESHOLD: &str = "ERRDEX_SCORE_THRESHOLD";
const ENV_TITLE_WEIGHT: &str = "ERRDEX_TITLE_WEIGHT";
const ENV_PROVIDER_WEIGHT: &str = "ERRDEX_PROVIDER_WEIGHT";

/// Ranking constants. The defaults are load-bearing for behavioral
/// compatibility; the env surface exists so deployments can tune them
/// without a call-site change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchTuning {
    pub score_threshold: f32,
    pub title_weight: f32,
    pub provider_weight: f32,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            title_weight: DEFAULT_TITLE_WEIGHT,
            provider_weight: DEFAULT_PROVIDER_WEIGHT,
        }
    }
}

impl SearchTuning {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            score_threshold: read_env_f32(ENV_SCORE_THRESHOLD)
                .unwrap_or(defaults.score_threshold),
            title_weight: read_env_f32(ENV_TITLE_WEIGHT).unwrap_or(defaults.title_weight),
            provider_weight: read_env_f32(ENV_PROVIDER_WEIGHT)
                .unwrap_or(defaults.provider_weight),
        }
    }
}

#[must_use]
fn read_env_f32(name: &str) -> Option<f32> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<f32>().ok())
        .filter(|value| value.is_finite())
}

/// Per-query pairing of an article with its combined score. Ephemeral:
/// produced, sorted, discarded.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch<'a> {
    pub article: &'a ArticleRecord,
    pub score: f32,
}

/// Scores and filters the article set for one query/provider-selection
/// pair. Empty query: provider-equality filter only, original order, all
/// scores neutral. Non-empty query: combined title/provider score above the
/// threshold, stable descending sort (equal scores keep input order).
#[must_use]
pub fn search_articles<'a>(
    articles: &'a [ArticleRecord],
    query: &str,
    selected_provider: Option<&str>,
    tuning: &SearchTuning,
) -> Vec<ScoredMatch<'a>> {
    search_indices(articles, query, selected_provider, tuning)
        .into_iter()
        .map(|(index, score)| ScoredMatch {
            article: &articles[index],
            score,
        })
        .collect()
}

fn search_indices(
    articles: &[ArticleRecord],
    query: &str,
    selected_provider: Option<&str>,
    tuning: &SearchTuning,
) -> Vec<(usize, f32)> {
    if query.trim().is_empty() {
        return articles
            .iter()
            .enumerate()
            .filter(|&(_, article)| provider_matches(article, selected_provider))
            .map(|(index, _)| (index, 1.0))
            .collect();
    }

    let mut scored: Vec<(usize, f32)> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| (index, combined_score(article, query, tuning)))
        .collect();
    scored.retain(|&(index, score)| {
        provider_matches(&articles[index], selected_provider) && score > tuning.score_threshold
    });
    scored.sort_by(score_ordering);
    scored
}

/// The visible result list: [`search_articles`] with scores dropped.
#[must_use]
pub fn filter_articles<'a>(
    articles: &'a [ArticleRecord],
    query: &str,
    selected_provider: Option<&str>,
    tuning: &SearchTuning,
) -> Vec<&'a ArticleRecord> {
    search_articles(articles, query, selected_provider, tuning)
        .into_iter()
        .map(|hit| hit.article)
        .collect()
}

fn combined_score(article: &ArticleRecord, query: &str, tuning: &SearchTuning) -> f32 {
    let title_score = relevance(query, &article.frontmatter.title);
    let provider_score = relevance(query, &article.frontmatter.provider);
    tuning
        .title_weight
        .mul_add(title_score, tuning.provider_weight * provider_score)
}

fn provider_matches(article: &ArticleRecord, selected_provider: Option<&str>) -> bool {
    selected_provider.is_none_or(|wanted| {
        article.frontmatter.provider.to_lowercase() == wanted.to_lowercase()
    })
}

// No secondary key: equal scores must keep input order.
fn score_ordering(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal)
}

/// Recompute-only-on-change wrapper around [`search_articles`]. The key is
/// (query, provider selection, corpus revision); the caller bumps the
/// revision whenever the article set itself changes.
#[derive(Debug, Default)]
pub struct FilterMemo {
    key: Option<MemoKey>,
    hits: Vec<(usize, f32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    query: String,
    provider: Option<String>,
    revision: u64,
}

impl FilterMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filtered<'a>(
        &mut self,
        articles: &'a [ArticleRecord],
        revision: u64,
        query: &str,
        selected_provider: Option<&str>,
        tuning: &SearchTuning,
    ) -> Vec<ScoredMatch<'a>> {
        let key = MemoKey {
            query: query.to_string(),
            provider: selected_provider.map(str::to_string),
            revision,
        };
        if self.key.as_ref() != Some(&key) {
            self.hits = search_indices(articles, query, selected_provider, tuning);
            self.key = Some(key);
        }
        self.hits
            .iter()
            .map(|&(index, score)| ScoredMatch {
                article: &articles[index],
                score,
            })
            .collect()
    }

    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.key.is_some()
    }
}
