// Public fallible APIs in this crate share one concrete error contract (`ErrdexError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod catalog;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod headings;
pub mod models;
pub mod providers;
pub mod render;
pub mod score;
pub mod toc;

pub use error::{ErrdexError, Result};
pub use models::{ArticleRecord, CorpusLoad, Frontmatter, Heading, ProviderAggregate};
