use std::path::Path;

use anyhow::{Context, Result, bail};
use errdex_core::catalog::{BuiltinCatalog, display_name_or_raw};
use errdex_core::corpus::{CorpusOptions, load_article, load_corpus};
use errdex_core::filter::{SearchTuning, search_articles};
use errdex_core::headings::extract_headings;
use errdex_core::models::{ArticleRecord, CorpusLoad};
use errdex_core::providers::{article_path, articles_for_provider, build_providers};
use errdex_core::render::render_article_html;
use serde::Serialize;

use crate::cli::Commands;

#[derive(Debug, Serialize)]
struct ArticleSummary {
    slug: String,
    title: String,
    provider: String,
    provider_display: String,
    solved: bool,
    path: String,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    slug: String,
    title: String,
    provider: String,
    score: f32,
}

pub(crate) fn run(content: &Path, command: Commands) -> Result<()> {
    let options = CorpusOptions::default();
    match command {
        Commands::List(args) => {
            let load = load_corpus_report_failures(content, &options)?;
            let selected: Vec<&ArticleRecord> = match args.provider.as_deref() {
                Some(provider) => articles_for_provider(&load.articles, provider),
                None => load.articles.iter().collect(),
            };
            let summaries: Vec<ArticleSummary> =
                selected.into_iter().map(summarize).collect();
            print_json(&summaries)?;
        }
        Commands::Providers => {
            let load = load_corpus_report_failures(content, &options)?;
            let aggregates = build_providers(&load.articles, &BuiltinCatalog);
            print_json(&aggregates)?;
        }
        Commands::Search(args) => {
            let load = load_corpus_report_failures(content, &options)?;
            let tuning = SearchTuning::from_env();
            let hits: Vec<SearchHit> = search_articles(
                &load.articles,
                &args.query,
                args.provider.as_deref(),
                &tuning,
            )
            .into_iter()
            .map(|hit| SearchHit {
                slug: hit.article.slug.clone(),
                title: hit.article.frontmatter.title.clone(),
                provider: hit.article.frontmatter.provider.clone(),
                score: hit.score,
            })
            .collect();
            print_json(&hits)?;
        }
        Commands::Show(args) => {
            let record = load_article(content, &args.slug, &options)?;
            if args.html {
                let rendered = render_article_html(&record.body);
                println!("{}", rendered.html);
            } else {
                print_json(&record)?;
            }
        }
        Commands::Outline(args) => {
            let record = load_article(content, &args.slug, &options)?;
            print_json(&extract_headings(&record.body))?;
        }
        Commands::Validate => {
            let load = load_corpus(content, &options).context("failed to load corpus")?;
            for failure in &load.failures {
                eprintln!("[FAIL] {}: {}", failure.file, failure.reason);
            }
            for warning in &load.warnings {
                eprintln!(
                    "[WARN] {}",
                    serde_json::to_string(warning).context("serialize warning")?
                );
            }
            if !load.failures.is_empty() {
                bail!(
                    "{} corpus entr{} failed to parse",
                    load.failures.len(),
                    if load.failures.len() == 1 { "y" } else { "ies" }
                );
            }
            println!(
                "OK: {} article(s) parsed successfully.",
                load.articles.len()
            );
        }
    }
    Ok(())
}

fn load_corpus_report_failures(content: &Path, options: &CorpusOptions) -> Result<CorpusLoad> {
    let load = load_corpus(content, options).context("failed to load corpus")?;
    for failure in &load.failures {
        eprintln!("skipping {}: {}", failure.file, failure.reason);
    }
    Ok(load)
}

fn summarize(article: &ArticleRecord) -> ArticleSummary {
    ArticleSummary {
        slug: article.slug.clone(),
        title: article.frontmatter.title.clone(),
        provider: article.frontmatter.provider.clone(),
        provider_display: display_name_or_raw(&BuiltinCatalog, &article.frontmatter.provider),
        solved: article.frontmatter.solved,
        path: article_path(article),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("serialize output")?
    );
    Ok(())
}
