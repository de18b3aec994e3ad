use std::collections::HashMap;

use crate::catalog::ProviderCatalog;
use crate::models::{ArticleRecord, ProviderAggregate};

/// Normalized grouping key: lowercased, trimmed provider identifier.
#[must_use]
pub fn provider_key(provider: &str) -> String {
    provider.trim().to_lowercase()
}

/// Rebuilds the provider rollup from the full article set. Articles with an
/// empty provider are excluded. Sorted by display name, case-insensitive,
/// ties in first-encounter order.
#[must_use]
pub fn build_providers(
    articles: &[ArticleRecord],
    catalog: &dyn ProviderCatalog,
) -> Vec<ProviderAggregate> {
    let mut encounter_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, ProviderAggregate> = HashMap::new();

    for article in articles {
        let key = provider_key(&article.frontmatter.provider);
        if key.is_empty() {
            continue;
        }
        if let Some(aggregate) = groups.get_mut(&key) {
            aggregate.count += 1;
            continue;
        }
        let display_name = catalog
            .display_name(&key)
            .unwrap_or_else(|| article.frontmatter.provider.clone());
        // Canonical logo wins over the author-supplied icon.
        let icon = catalog
            .logo_path(&key)
            .or_else(|| article.frontmatter.provider_icon.clone());
        encounter_order.push(key.clone());
        groups.insert(
            key.clone(),
            ProviderAggregate {
                key,
                display_name,
                count: 1,
                icon,
            },
        );
    }

    let mut aggregates: Vec<ProviderAggregate> = encounter_order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect();
    aggregates.sort_by_key(|aggregate| aggregate.display_name.to_lowercase());
    aggregates
}

/// Case-insensitive per-provider listing, original order preserved.
#[must_use]
pub fn articles_for_provider<'a>(
    articles: &'a [ArticleRecord],
    provider: &str,
) -> Vec<&'a ArticleRecord> {
    let wanted = provider_key(provider);
    articles
        .iter()
        .filter(|article| provider_key(&article.frontmatter.provider) == wanted)
        .collect()
}

/// Canonical route for one article: `/provider/{key}/issue/{slug}`.
#[must_use]
pub fn article_path(article: &ArticleRecord) -> String {
    format!(
        "/provider/{}/issue/{}",
        provider_key(&article.frontmatter.provider),
        article.slug
    )
}
