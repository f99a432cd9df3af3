//! CLI parsing and orchestration. Parses args, resolves config, runs the download, writes Markdown or JSON.
//! Maps errors to exit codes.

use crate::config;
use crate::formats::{FileSink, OutputFormat};
use crate::spider::index::resolve_book_index;
use crate::spider::{download_to, DownloadOptions, HttpClient, PageFetcher, Source, SpiderError};
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Spider(#[from] SpiderError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Spider(SpiderError::EmptyChapterRange { .. }) => 1,
            CliRunError::Spider(SpiderError::Output(_)) => 3,
            CliRunError::Spider(_) => 2,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "novelspider")]
#[command(about = "Download a serialized novel from book.qq.com or shuhaige.net into a single Markdown file")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, timeout_secs, max_pages, source, format) are read from ./novelspider.toml or ~/.config/novelspider/config.toml. CLI flags override config."
)]
pub struct Args {
    /// Book id as it appears in the source's book URL (e.g. 12345 in https://www.shuhaige.net/12345/).
    #[arg(value_parser = parse_book_id)]
    pub book_id: u64,

    /// Book source: qq or shuhaige. Default: config `source`, else shuhaige.
    #[arg(short, long, value_parser = parse_source)]
    pub source: Option<Source>,

    /// Directory the book file is written to (overrides config; default .).
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Exact output file, instead of {output-dir}/{book title}.{ext}.
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Output format: markdown or json (overrides config; default markdown).
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Download only chapters at these positions (1-based inclusive, ascending chapter order), e.g. 1-10.
    #[arg(long, value_parser = parse_chapter_range)]
    pub chapters: Option<(u32, u32)>,

    /// Stop following "next page" after this many pages of one chapter (overrides config; default unlimited).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Resolve the book index only; print title, chapter count and output path without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output (warnings and errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging (every fetched URL) and verbose error chain.
    #[arg(long)]
    pub verbose: bool,

    /// Plain log output without ANSI colors.
    #[arg(long)]
    pub no_color: bool,
}

fn parse_book_id(s: &str) -> Result<u64, String> {
    let s = s.trim();
    s.parse::<u64>()
        .map_err(|_| format!("Invalid book id: '{}' is not a number", s))
}

fn parse_chapter_range(s: &str) -> Result<(u32, u32), String> {
    let s = s.trim();
    let (from_str, to_str) = s.split_once('-').ok_or_else(|| {
        format!(
            "Invalid --chapters: expected 'from-to' (e.g. 1-10), got '{}'",
            s
        )
    })?;
    let from_str = from_str.trim();
    let to_str = to_str.trim();
    let from: u32 = from_str.parse().map_err(|_| {
        format!(
            "Invalid --chapters: '{}' is not a valid start chapter number",
            from_str
        )
    })?;
    let to: u32 = to_str.parse().map_err(|_| {
        format!(
            "Invalid --chapters: '{}' is not a valid end chapter number",
            to_str
        )
    })?;
    if from == 0 {
        return Err("Invalid --chapters: positions start at 1".to_string());
    }
    if from > to {
        return Err(format!(
            "Invalid --chapters: start ({}) must be <= end ({})",
            from, to
        ));
    }
    Ok((from, to))
}

fn parse_source(s: &str) -> Result<Source, String> {
    Source::from_name(s)
        .ok_or_else(|| format!("Invalid --source value: '{}'. Use 'qq' or 'shuhaige'.", s))
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid --format value: '{}'. Use markdown or json.",
            s
        )),
    }
}

/// Check that the output location exists before spending time on the download.
fn validate_output_target(output: Option<&Path>, output_dir: &Path) -> Result<(), CliRunError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(CliRunError::InvalidInput(format!(
                        "Cannot write output: {}: parent directory does not exist.",
                        path.display()
                    )));
                }
            }
        }
        None => {
            if !output_dir.is_dir() {
                return Err(CliRunError::InvalidInput(format!(
                    "Cannot write output: {}: output directory does not exist.",
                    output_dir.display()
                )));
            }
        }
    }
    Ok(())
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;

    let source = match args.source {
        Some(s) => s,
        None => match config.as_ref().and_then(|c| c.source.as_deref()) {
            Some(name) => parse_source(name).map_err(|e| {
                CliRunError::InvalidInput(format!("Invalid config source: {}", e))
            })?,
            None => Source::Shuhaige,
        },
    };
    let format = match args.format {
        Some(f) => f,
        None => match config.as_ref().and_then(|c| c.format.as_deref()) {
            Some(name) => parse_format(name).map_err(|e| {
                CliRunError::InvalidInput(format!("Invalid config format: {}", e))
            })?,
            None => OutputFormat::Markdown,
        },
    };
    let output_dir: PathBuf = args
        .output_dir
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    let timeout_secs = args
        .timeout
        .or_else(|| config.as_ref().and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let max_pages = args
        .max_pages
        .or_else(|| config.as_ref().and_then(|c| c.max_pages));
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.user_agent.clone()));

    let mut builder = HttpClient::builder().timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let spider = source.spider();
    let mut sink = FileSink::new(&output_dir, format);
    if let Some(ref p) = args.output_file {
        sink = sink.with_path(p);
    }

    if args.dry_run {
        let mut fetcher = PageFetcher::new(&mut client, spider.profile().retry_status);
        let index = resolve_book_index(spider.as_ref(), &mut fetcher, args.book_id)?;
        eprintln!("Title: {}", index.title);
        eprintln!("Chapters: {}", index.sorted_ids().len());
        eprintln!(
            "Output: {}",
            sink.path_for(args.book_id, &index.title).display()
        );
        return Ok(());
    }

    validate_output_target(args.output_file.as_deref(), &output_dir)?;

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |n: u32, total: u32| {
        if total == 0 {
            return;
        }
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            bar.set_style(
                indicatif::ProgressStyle::default_bar()
                    .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
                    .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                    .progress_chars("█▉▊▋▌▍▎▏ "),
            );
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n as u64);
        pb.set_message(format!("Chapter {}/{}", n, total));
    };
    let progress: Option<&dyn Fn(u32, u32)> = if args.quiet { None } else { Some(&progress_cb) };

    let options = DownloadOptions {
        progress,
        cancel_check: None,
        chapter_range: args.chapters,
        max_pages,
    };
    let result = download_to(
        spider.as_ref(),
        &mut client,
        args.book_id,
        &options,
        &mut sink,
    );

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }

    result?;
    Ok(())
}
