//! Tracing subscriber setup: one fmt layer on stderr, level from RUST_LOG or the CLI flags.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("subscriber init failed: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Clone, Copy, Debug)]
pub struct LogOptions {
    /// Debug level: every fetched URL and per-page details.
    pub verbose: bool,
    /// Warnings and errors only.
    pub quiet: bool,
    pub use_color: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            use_color: true,
        }
    }
}

/// Default level when RUST_LOG is unset. `verbose` wins over `quiet`.
pub fn default_level(options: LogOptions) -> LevelFilter {
    if options.verbose {
        LevelFilter::DEBUG
    } else if options.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(options: LogOptions) -> Result<(), LogError> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(options).into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(options.use_color)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()?;
    Ok(())
}
