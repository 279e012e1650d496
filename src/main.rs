use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::Command;

use eyre::{Result, bail};
use log::{debug, info, warn};

mod cli;

use captx::{Failure, FailureKind, TranscriptResult};
use captx::config::Config;
use captx::pipeline::TranscriptPipeline;
use cli::{Cli, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("captx.log");

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
        .join("captx")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help(config: &Config) -> String {
    let yt_dlp = config.yt_dlp.display().to_string();

    let yt_dlp_line = match tool_version(&yt_dlp) {
        Some(v) => format!("  \x1b[32m✅\x1b[0m yt-dlp     {v}"),
        None => "  \x1b[31m❌\x1b[0m yt-dlp     (not found — needed to list caption tracks)".to_string(),
    };

    format!(
        "\nREQUIRED TOOLS:\n{yt_dlp_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        captx::config::config_path().display(),
        log_dir().join("captx.log").display()
    )
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring invalid config file: {e}");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let mut config = load_config();

    let after_help = build_after_help(&config);
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // CLI flags take priority over the config file
    if let Some(lang) = cli.lang.clone() {
        config.lang = lang;
    }
    if let Some(word_limit) = cli.word_limit {
        config.word_limit = word_limit;
    }
    if cli.no_fallback {
        config.fallback = false;
    }
    debug!("Effective config: {config:?}");

    if cli.verbose {
        let config_path = captx::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let inputs = if cli.videos.is_empty() {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        cli.videos.clone()
    };

    let inputs: Vec<String> = inputs
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if inputs.is_empty() {
        bail!("no video URL or ID provided\n\nUsage: captx <VIDEO>...\n       echo <VIDEO> | captx");
    }

    let pipeline = TranscriptPipeline::from_config(&config)?;

    let mut results = Vec::new();

    for input in &inputs {
        let Some(video_id) = captx::extract_video_id(input) else {
            let primary = Failure::new(
                FailureKind::Resolution,
                format!("could not extract video ID from: {input}"),
            );
            results.push((input.clone(), TranscriptResult::Failure { primary, alternate: None }));
            continue;
        };

        let result = pipeline.get_transcript(&video_id).await;

        if cli.verbose {
            match &result {
                TranscriptResult::Success(t) => eprintln!(
                    "Video: {} ({})\nSource: {}\nWords: {}{}",
                    t.title.as_deref().unwrap_or("Unknown"),
                    t.video_id,
                    t.source,
                    t.transcript.word_count(),
                    if t.transcript.truncated { " (truncated)" } else { "" },
                ),
                TranscriptResult::Failure { primary, alternate } => {
                    eprintln!("Video: {video_id}\nCaptions: {} ({})", primary, primary.kind);
                    if let Some(alt) = alternate {
                        eprintln!("Alternate: {alt}");
                    }
                }
            }
        }

        results.push((video_id, result));
    }

    let failed = results.iter().filter(|(_, r)| !r.is_success()).count();

    let rendered = match cli.format {
        OutputFormat::Text => results
            .iter()
            .map(|(_, r)| captx::output::render_text(r))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Json => captx::output::render_json(&results)?,
    };

    if let Some(ref path) = cli.output {
        std::fs::write(path, &rendered)?;
        if cli.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }

    if failed > 0 {
        info!("{failed} of {} videos had no transcript", inputs.len());
        std::process::exit(1);
    }

    Ok(())
}
