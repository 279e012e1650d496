use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "captx",
    about = "Caption transcript fetcher",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Video URLs or IDs (read from stdin, one per line, if omitted)
    pub videos: Vec<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Caption language [default: en, or `lang` from the config file]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Maximum number of words kept from caption transcripts
    #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub word_limit: Option<usize>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't fall back to the alternate transcript api
    #[arg(long)]
    pub no_fallback: bool,

    /// Show transcript source and metadata
    #[arg(short, long)]
    pub verbose: bool,
}
