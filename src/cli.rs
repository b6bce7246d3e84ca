use clap::Parser;
use std::path::PathBuf;

use ytsum::ThumbnailQuality;
use ytsum::summarize::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize YouTube videos from their captions",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL (reads one URL per line from stdin if omitted)
    pub url: Option<String>,

    /// Caption languages in priority order, e.g. en,hi,mr or mr,hi,en
    #[arg(short, long, value_delimiter = ',')]
    pub lang: Vec<String>,

    /// Output format: markdown (default), text, json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Include the full transcript in the output
    #[arg(short = 't', long)]
    pub show_transcript: bool,

    /// Completion provider
    #[arg(long, value_enum, env = "YTSUM_PROVIDER")]
    pub provider: Option<Provider>,

    /// LLM model for summarization
    #[arg(long, env = "YTSUM_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Cap on generated tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Retries on transient completion failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Thumbnail size in the rendered output
    #[arg(long, value_enum)]
    pub thumbnail: Option<ThumbnailQuality>,

    /// Keep a copy of each summary and transcript on disk
    #[arg(short, long)]
    pub save: bool,

    /// Directory for saved summaries
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Number of saved summary/transcript pairs to keep
    #[arg(long, value_parser = parse_keep)]
    pub keep: Option<usize>,

    /// Also write video_summary.md and transcript.txt into this directory
    #[arg(short, long)]
    pub download: Option<PathBuf>,

    /// Show extraction and generation metadata
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_keep(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must keep at least one pair".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
