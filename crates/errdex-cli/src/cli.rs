use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "errdex")]
#[command(about = "Error-article index toolkit", version)]
pub struct Cli {
    /// Corpus directory holding the article entries.
    #[arg(long, default_value = "content")]
    pub content: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List article summaries, optionally for one provider.
    List(ListArgs),
    /// Print the provider rollup.
    Providers,
    /// Score and rank articles against a query.
    Search(SearchArgs),
    /// Print one article record, or its rendered HTML.
    Show(ShowArgs),
    /// Print the heading sequence of one article.
    Outline(SlugArg),
    /// Parse the whole corpus and report every failure and warning.
    Validate,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Provider key (case-insensitive).
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(allow_hyphen_values = true)]
    pub query: String,
    /// Restrict results to one provider (case-insensitive).
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub slug: String,
    /// Render the article body to HTML instead of printing the record.
    #[arg(long, default_value_t = false)]
    pub html: bool,
}

#[derive(Debug, Args)]
pub struct SlugArg {
    pub slug: String,
}
