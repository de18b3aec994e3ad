use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{ErrdexError, Result};
use crate::models::{ArticleRecord, CorpusLoad, DataQualityWarning, Frontmatter, ParseFailure};

const FRONTMATTER_FENCE: &str = "---";
const DEFAULT_EXTENSIONS: [&str; 2] = ["md", "mdx"];

#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Accepted file extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
    /// File-name glob patterns to skip.
    pub exclude: Vec<String>,
    pub include_hidden: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            exclude: Vec::new(),
            include_hidden: false,
        }
    }
}

#[derive(Debug)]
struct EntryFilter {
    extensions: Vec<String>,
    exclude: Option<GlobSet>,
    include_hidden: bool,
}

impl EntryFilter {
    fn new(options: &CorpusOptions) -> Result<Self> {
        let exclude = if options.exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &options.exclude {
                let glob = Glob::new(pattern).map_err(|err| {
                    ErrdexError::Validation(format!("invalid exclude pattern {pattern}: {err}"))
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|err| {
                ErrdexError::Validation(format!("invalid exclude set: {err}"))
            })?)
        };
        Ok(Self {
            extensions: options.extensions.clone(),
            exclude,
            include_hidden: options.include_hidden,
        })
    }

    fn accepts(&self, file_name: &str) -> bool {
        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }
        if !self.matches_extension(file_name) {
            return false;
        }
        self.exclude
            .as_ref()
            .is_none_or(|set| !set.is_match(file_name))
    }

    fn matches_extension(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.extensions.iter().any(|wanted| *wanted == ext)
    }
}

/// One-shot batch read of the whole corpus. A malformed entry fails in
/// isolation and lands in `failures`; the rest of the corpus still loads.
pub fn load_corpus(root: &Path, options: &CorpusOptions) -> Result<CorpusLoad> {
    if !root.is_dir() {
        return Err(ErrdexError::NotFound(format!(
            "content directory {}",
            root.display()
        )));
    }
    let filter = EntryFilter::new(options)?;

    let mut articles: Vec<ArticleRecord> = Vec::new();
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    let mut slug_positions: HashMap<String, usize> = HashMap::new();
    let mut slug_files: HashMap<String, String> = HashMap::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| ErrdexError::Validation(err.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !filter.accepts(&file_name) {
            continue;
        }

        let slug = slug_from_file_name(&file_name);
        let raw = match fs::read_to_string(entry.path()) {
            Ok(raw) => raw,
            Err(err) => {
                failures.push(ParseFailure {
                    file: file_name,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        match parse_entry(&file_name, &raw) {
            Ok((frontmatter, body)) => {
                if frontmatter.provider.trim().is_empty() {
                    warnings.push(DataQualityWarning::EmptyProvider { slug: slug.clone() });
                }
                let record = ArticleRecord {
                    slug: slug.clone(),
                    frontmatter,
                    body,
                };
                if let Some(position) = slug_positions.get(&slug) {
                    let shadowed = slug_files
                        .insert(slug.clone(), file_name.clone())
                        .unwrap_or_default();
                    warnings.push(DataQualityWarning::DuplicateSlug {
                        slug: slug.clone(),
                        kept_file: file_name,
                        shadowed_file: shadowed,
                    });
                    articles[*position] = record;
                } else {
                    slug_positions.insert(slug.clone(), articles.len());
                    slug_files.insert(slug, file_name);
                    articles.push(record);
                }
            }
            Err(err) => {
                let reason = match err {
                    ErrdexError::Frontmatter { reason, .. } => reason,
                    other => other.to_string(),
                };
                failures.push(ParseFailure {
                    file: file_name,
                    reason,
                });
            }
        }
    }

    Ok(CorpusLoad {
        articles,
        failures,
        warnings,
        loaded_at: Utc::now(),
    })
}

/// Single-slug lookup. A missing entry is `NotFound`; a corrupt entry
/// surfaces its parse failure instead of being folded into `NotFound`.
pub fn load_article(root: &Path, slug: &str, options: &CorpusOptions) -> Result<ArticleRecord> {
    if slug.is_empty() || slug.contains(['/', '\\']) || slug.contains("..") {
        return Err(ErrdexError::Validation(format!(
            "slug must be a bare file stem: {slug}"
        )));
    }
    for ext in &options.extensions {
        let file_name = format!("{slug}.{ext}");
        let path = root.join(&file_name);
        if !path.is_file() {
            continue;
        }
        let raw = fs::read_to_string(&path)?;
        let (frontmatter, body) = parse_entry(&file_name, &raw)?;
        return Ok(ArticleRecord {
            slug: slug.to_string(),
            frontmatter,
            body,
        });
    }
    Err(ErrdexError::NotFound(format!("article {slug}")))
}

fn slug_from_file_name(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
        .to_string()
}

fn parse_entry(file: &str, raw: &str) -> Result<(Frontmatter, String)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some((header, body)) = split_frontmatter(raw) else {
        return Err(ErrdexError::Frontmatter {
            file: file.to_string(),
            reason: "missing frontmatter block".to_string(),
        });
    };
    let frontmatter: Frontmatter =
        serde_norway::from_str(header).map_err(|err| ErrdexError::Frontmatter {
            file: file.to_string(),
            reason: err.to_string(),
        })?;
    Ok((frontmatter, body.to_string()))
}

/// Splits `---\n<yaml>\n---\n<body>`. Returns `None` when the opening or
/// closing fence is absent.
fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix(FRONTMATTER_FENCE)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut search = 0;
    while let Some(found) = rest[search..].find("\n---") {
        let fence_start = search + found;
        let after = &rest[fence_start + 4..];
        if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
            let header = rest[..fence_start].trim_end_matches('\r');
            let body = after
                .strip_prefix("\r\n")
                .or_else(|| after.strip_prefix('\n'))
                .unwrap_or(after);
            return Some((header, body));
        }
        search = fence_start + 1;
    }
    None
}
