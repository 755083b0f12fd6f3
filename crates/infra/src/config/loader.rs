//! Configuration loader
//!
//! Builds the service [`Config`] from an optional file plus environment
//! overrides.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file (JSON or TOML)
//! 2. Fall back to built-in defaults when no file exists
//! 3. Apply `COSTCLOSE_*` environment overrides on top
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `COSTCLOSE_DB_PATH`: Database file path
//! - `COSTCLOSE_DB_POOL_SIZE`: Connection pool size
//! - `COSTCLOSE_SERVER_HOST`: HTTP listener host
//! - `COSTCLOSE_SERVER_PORT`: HTTP listener port
//! - `COSTCLOSE_LOG_LEVEL`: Default tracing filter (`RUST_LOG` still wins)
//! - `COSTCLOSE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes, in order:
//! 1. `./config.{json,toml}` and `./costclose.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use costclose_domain::{Config, CostCloseError, Result};

/// Load configuration: file (or defaults), then env overrides, then
/// validation.
///
/// # Errors
/// Returns `CostCloseError::Config` when a probed file cannot be parsed,
/// an override has an invalid value, or the final config is invalid.
pub fn load() -> Result<Config> {
    let config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, starting from defaults");
            Config::default()
        }
    };

    let config = apply_env_overrides(config)?;
    config.validate()?;
    Ok(config)
}

/// Defaults plus environment overrides, without probing for files.
///
/// # Errors
/// Returns `CostCloseError::Config` if an override has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let config = apply_env_overrides(Config::default())?;
    config.validate()?;
    Ok(config)
}

/// Overlay every `COSTCLOSE_*` variable that is set onto `config`.
///
/// # Errors
/// Returns `CostCloseError::Config` if a numeric variable does not parse.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Some(path) = env_var("COSTCLOSE_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_var("COSTCLOSE_DB_POOL_SIZE") {
        config.database.pool_size = size
            .parse::<u32>()
            .map_err(|e| CostCloseError::Config(format!("Invalid pool size: {}", e)))?;
    }
    if let Some(host) = env_var("COSTCLOSE_SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = env_var("COSTCLOSE_SERVER_PORT") {
        config.server.port = port
            .parse::<u16>()
            .map_err(|e| CostCloseError::Config(format!("Invalid server port: {}", e)))?;
    }
    if let Some(level) = env_var("COSTCLOSE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("COSTCLOSE_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// extension.
///
/// # Errors
/// Returns `CostCloseError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CostCloseError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CostCloseError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CostCloseError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CostCloseError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CostCloseError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CostCloseError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_names(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_names(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_names(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("costclose.json"),
        dir.join("costclose.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
/// (case-insensitive). Returns `default` when unset.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
