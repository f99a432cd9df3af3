//! Optional config file loading. Search order: ./novelspider.toml, then
//! $XDG_CONFIG_HOME/novelspider/config.toml (or ~/.config/novelspider/config.toml).

use serde::Deserialize;
use std::path::PathBuf;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Directory the book file is written to when -o is not set. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Upper bound on pages fetched per chapter. Unset follows the next-page marker without limit.
    pub max_pages: Option<u32>,
    /// Default source when --source is not given: qq or shuhaige.
    pub source: Option<String>,
    /// Default output format: markdown or json.
    pub format: Option<String>,
}

/// Search order: (1) ./novelspider.toml, (2) $XDG_CONFIG_HOME/novelspider/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("novelspider.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("novelspider").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(Some(config));
        }
    }
    Ok(None)
}
