use std::io::{self, BufRead};
use std::path::PathBuf;

use eyre::{Result, bail};
use log::{debug, info};

mod cli;
mod presenter;

use cli::{Cli, OutputFormat};
use presenter::Presenter;
use ytsum::config::Config;
use ytsum::pipeline::{Pipeline, PipelineOptions};
use ytsum::store::{self, RetentionStore};
use ytsum::summarize::{CompletionClient, CompletionSettings, DEFAULT_INSTRUCTION};
use ytsum::youtube::YoutubeClient;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = |var: &str| {
        if std::env::var(var).is_ok() {
            format!("  \x1b[32m✅\x1b[0m {var}")
        } else {
            format!("  \x1b[31m❌\x1b[0m {var}  (not set)")
        }
    };

    format!(
        "\nAPI KEYS:\n{}\n{}\n{}\n\nConfig: {}\nLogs are written to: {}",
        key_line("GROQ_API_KEY"),
        key_line("OPENAI_API_KEY"),
        key_line("ANTHROPIC_API_KEY"),
        ytsum::config::config_path().display(),
        log_dir().join("ytsum.log").display()
    )
}

fn completion_settings(cli: &Cli, config: &Config) -> CompletionSettings {
    let defaults = CompletionSettings::default();
    let provider = cli.provider.or(config.provider).unwrap_or(defaults.provider);
    let model = cli
        .model
        .clone()
        .or_else(|| config.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());

    CompletionSettings {
        provider,
        model,
        temperature: cli.temperature.or(config.temperature).unwrap_or(defaults.temperature),
        max_tokens: cli.max_tokens.or(config.max_tokens).unwrap_or(defaults.max_tokens),
        max_retries: cli.max_retries.or(config.max_retries).unwrap_or(defaults.max_retries),
    }
}

fn pipeline_options(cli: &Cli, config: &Config) -> PipelineOptions {
    let languages = if cli.lang.is_empty() { config.languages() } else { cli.lang.clone() };

    PipelineOptions {
        languages,
        instruction: config.prompt.clone().unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string()),
        thumbnail: cli.thumbnail.or(config.thumbnail).unwrap_or_default(),
    }
}

fn retention_store(cli: &Cli, config: &Config) -> Result<Option<RetentionStore>> {
    if !(cli.save || config.save.unwrap_or(false)) {
        return Ok(None);
    }
    let dir = cli
        .save_dir
        .clone()
        .or_else(|| config.save_dir.clone())
        .unwrap_or_else(|| PathBuf::from(store::DEFAULT_DIR));
    let cap = cli.keep.or(config.retention_cap).unwrap_or(store::DEFAULT_CAP);
    if cap == 0 {
        bail!("retention_cap must be at least 1 (config: {})", ytsum::config::config_path().display());
    }
    Ok(Some(RetentionStore::new(dir, cap)))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    // .env is optional; the key may already be in the environment
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    if cli.verbose {
        let config_path = ytsum::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.iter().all(|u| u.trim().is_empty()) {
        bail!("no URL provided\n\nUsage: ytsum <URL>\n       echo <URL> | ytsum");
    }

    let client = reqwest::Client::new();
    let settings = completion_settings(&cli, &config);
    let summarizer = CompletionClient::from_env(client.clone(), settings)?;
    let options = pipeline_options(&cli, &config);

    let mut pipeline = Pipeline::new(YoutubeClient::new(client), summarizer, options);
    if let Some(store) = retention_store(&cli, &config)? {
        debug!("Saving to {} (keeping {})", store.dir().display(), store.cap());
        pipeline = pipeline.with_store(store);
    }

    let per_video_downloads = urls.iter().filter(|u| !u.trim().is_empty()).count() > 1;
    let mut failures = 0;
    for url_input in &urls {
        let url_input = url_input.trim();
        if url_input.is_empty() {
            continue;
        }

        let mut presenter = Presenter::new();
        let result = pipeline
            .run_with_progress(url_input, |stage| presenter.progress(stage.message()))
            .await;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                debug!("Pipeline failed for {url_input}: {e}");
                presenter.error(&e.user_message(&pipeline.options().languages));
                if cli.verbose {
                    eprintln!("Cause: {e}");
                }
                failures += 1;
                continue;
            }
        };
        presenter.finish();

        if let Some(ref err) = report.persist_error {
            presenter.warn(err);
        }

        if cli.verbose {
            eprintln!(
                "Video: {}\nThumbnail: {}\nLanguage: {}\nSegments: {}",
                report.video.watch_url(),
                report.thumbnail_url,
                report.transcript.language,
                report.transcript.segments.len(),
            );
            if let Some(ref saved) = report.saved {
                eprintln!("Saved: {}", saved.summary_path.display());
            }
        }

        let rendered = match cli.format {
            OutputFormat::Markdown => ytsum::output::render_markdown(&report, cli.show_transcript),
            OutputFormat::Text => ytsum::output::render_text(&report, cli.show_transcript),
            OutputFormat::Json => ytsum::output::render_json(&report),
        };
        println!("{rendered}");

        if let Some(ref base) = cli.download {
            let dir = ytsum::output::download_dir(base, &report, per_video_downloads);
            match ytsum::output::write_downloads(&report, &dir) {
                Ok((summary_path, transcript_path)) => {
                    if cli.verbose {
                        eprintln!(
                            "Downloads: {}, {}",
                            summary_path.display(),
                            transcript_path.display()
                        );
                    }
                }
                Err(e) => {
                    presenter.warn(&format!("Could not write downloads to {}: {e}", dir.display()));
                    failures += 1;
                }
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }

    Ok(())
}
